use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use sqlx::{PgTransaction, QueryBuilder};
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    access::{can_assign_role, can_grant_view_all, Capability},
    auth,
    extractors::Principal,
    handlers::auth_handler::load_user_with_assignments,
    models::{CreateUserInput, SuccessResponse, UpdateUserInput, User, UserRole, UserWithAssignments},
    AppError, AppResult, AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct GetUsersQuery {
    pub role: Option<UserRole>,
    pub location_id: Option<Uuid>,
    /// Defaults to active users only.
    pub include_inactive: Option<bool>,
}

/// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    params(GetUsersQuery),
    responses(
        (status = 200, description = "Users visible to the caller", body = Vec<User>)
    ),
    tag = "users"
)]
pub async fn get_users(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Query(query): Query<GetUsersQuery>,
) -> AppResult<Json<Vec<User>>> {
    let mut builder = QueryBuilder::new(
        "SELECT DISTINCT u.* FROM users u
         LEFT JOIN user_locations ul ON ul.user_id = u.id
         WHERE u.company_id = ",
    );
    builder.push_bind(principal.company_id);

    if let Some(ids) = principal.scope().as_filter() {
        builder.push(" AND ul.location_id = ANY(").push_bind(ids).push(")");
    }
    if let Some(location_id) = query.location_id {
        builder.push(" AND ul.location_id = ").push_bind(location_id);
    }
    if let Some(role) = query.role {
        builder.push(" AND u.role = ").push_bind(role);
    }
    if !query.include_inactive.unwrap_or(false) {
        builder.push(" AND u.is_active = TRUE");
    }
    builder.push(" ORDER BY u.last_name, u.first_name");

    let users = builder.build_query_as::<User>().fetch_all(&state.db).await?;
    Ok(Json(users))
}

/// GET /api/users/{id}
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User with assignments", body = UserWithAssignments),
        (status = 404, description = "Not found or out of scope")
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserWithAssignments>> {
    let user = load_user_with_assignments(&state.db, id).await?;

    if user.user.company_id != principal.company_id {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    // Visible when it is the caller themselves or the user shares a
    // location with the caller's scope.
    let scope = principal.scope();
    let visible = principal.id == id
        || scope.sees_all()
        || user.locations.iter().any(|l| scope.contains(l.location_id));
    if !visible {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(user))
}

async fn replace_assignments(
    tx: &mut PgTransaction<'_>,
    user_id: Uuid,
    location_ids: &[Uuid],
    position_ids: &[Uuid],
) -> AppResult<()> {
    sqlx::query("DELETE FROM user_locations WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;
    sqlx::query("DELETE FROM user_positions WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    for (i, location_id) in location_ids.iter().enumerate() {
        sqlx::query(
            "INSERT INTO user_locations (id, user_id, location_id, is_primary) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(location_id)
        .bind(i == 0)
        .execute(&mut **tx)
        .await?;
    }

    for position_id in position_ids {
        sqlx::query("INSERT INTO user_positions (id, user_id, position_id) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(position_id)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

/// POST /api/users
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserInput,
    responses(
        (status = 200, description = "Created user with assignments", body = UserWithAssignments),
        (status = 409, description = "Email already in use")
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(input): Json<CreateUserInput>,
) -> AppResult<Json<UserWithAssignments>> {
    principal.require(Capability::ManageUsers)?;

    if input.password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    if input.location_ids.is_empty() {
        return Err(AppError::Validation(
            "At least one location assignment is required".to_string(),
        ));
    }
    let scope = principal.scope();
    if let Some(out) = input.location_ids.iter().find(|id| !scope.contains(**id)) {
        return Err(AppError::Forbidden(format!(
            "No access to location {}",
            out
        )));
    }

    let role = input.role.unwrap_or(UserRole::Employee);
    if !can_assign_role(principal.role, role) {
        return Err(AppError::Forbidden(
            "You cannot assign this role".to_string(),
        ));
    }
    let can_view_all = input.can_view_all.unwrap_or(false);
    if can_view_all && !can_grant_view_all(principal.role) {
        return Err(AppError::Forbidden(
            "Only a super admin can grant company-wide visibility".to_string(),
        ));
    }

    let email = input.email.trim().to_lowercase();
    let taken: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE LOWER(email) = $1")
        .bind(&email)
        .fetch_one(&state.db)
        .await?;
    if taken > 0 {
        return Err(AppError::Conflict("Email is already in use".to_string()));
    }

    let password_hash = auth::hash_password(&input.password)?;
    let mut tx = state.db.begin().await?;

    let user_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, company_id, email, password_hash, first_name, last_name, phone, role, can_view_all, pin)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(user_id)
    .bind(principal.company_id)
    .bind(&email)
    .bind(password_hash)
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.phone)
    .bind(role)
    .bind(can_view_all)
    .bind(input.pin.as_deref().filter(|p| !p.is_empty()))
    .execute(&mut *tx)
    .await?;

    replace_assignments(
        &mut tx,
        user_id,
        &input.location_ids,
        input.position_ids.as_deref().unwrap_or(&[]),
    )
    .await?;

    tx.commit().await?;

    let user = load_user_with_assignments(&state.db, user_id).await?;
    Ok(Json(user))
}

/// PUT /api/users/{id}
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserInput,
    responses(
        (status = 200, description = "Updated user with assignments", body = UserWithAssignments),
        (status = 404, description = "Not found or out of scope")
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateUserInput>,
) -> AppResult<Json<UserWithAssignments>> {
    principal.require(Capability::ManageUsers)?;
    if input.is_active == Some(false) {
        principal.require(Capability::DeactivateUsers)?;
    }

    let current = load_user_with_assignments(&state.db, id).await?;
    if current.user.company_id != principal.company_id {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    let scope = principal.scope();
    if !scope.sees_all()
        && !current.locations.iter().any(|l| scope.contains(l.location_id))
    {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    // Changing a role requires authority over both the old and new role,
    // so a manager can neither promote past their ceiling nor demote an
    // admin they could not have created.
    let role = input.role.unwrap_or(current.user.role);
    if role != current.user.role
        && !(can_assign_role(principal.role, role)
            && can_assign_role(principal.role, current.user.role))
    {
        return Err(AppError::Forbidden(
            "You cannot change this user's role".to_string(),
        ));
    }
    let can_view_all = input.can_view_all.unwrap_or(current.user.can_view_all);
    if can_view_all != current.user.can_view_all && !can_grant_view_all(principal.role) {
        return Err(AppError::Forbidden(
            "Only a super admin can change company-wide visibility".to_string(),
        ));
    }

    // An empty-string PIN clears it; absence leaves it unchanged.
    let pin = match input.pin.as_deref() {
        None => current.user.pin.clone(),
        Some("") => None,
        Some(p) => Some(p.to_string()),
    };

    let mut tx = state.db.begin().await?;

    sqlx::query(
        "UPDATE users
         SET first_name = $1, last_name = $2, phone = $3, pin = $4,
             role = $5, can_view_all = $6, is_active = $7
         WHERE id = $8",
    )
    .bind(input.first_name.unwrap_or(current.user.first_name))
    .bind(input.last_name.unwrap_or(current.user.last_name))
    .bind(input.phone.or(current.user.phone))
    .bind(pin)
    .bind(role)
    .bind(can_view_all)
    .bind(input.is_active.unwrap_or(current.user.is_active))
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if let Some(location_ids) = &input.location_ids {
        if location_ids.is_empty() {
            return Err(AppError::Validation(
                "At least one location assignment is required".to_string(),
            ));
        }
        if let Some(out) = location_ids.iter().find(|lid| !scope.contains(**lid)) {
            return Err(AppError::Forbidden(format!("No access to location {}", out)));
        }
        let position_ids = input.position_ids.clone().unwrap_or_else(|| {
            current.positions.iter().map(|p| p.position_id).collect()
        });
        replace_assignments(&mut tx, id, location_ids, &position_ids).await?;
    } else if let Some(position_ids) = &input.position_ids {
        let location_ids: Vec<Uuid> =
            current.locations.iter().map(|l| l.location_id).collect();
        replace_assignments(&mut tx, id, &location_ids, position_ids).await?;
    }

    tx.commit().await?;

    let user = load_user_with_assignments(&state.db, id).await?;
    Ok(Json(user))
}

/// DELETE /api/users/{id} — soft delete.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User deactivated", body = SuccessResponse),
        (status = 409, description = "Cannot deactivate yourself")
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SuccessResponse>> {
    principal.require(Capability::DeactivateUsers)?;

    if id == principal.id {
        return Err(AppError::Conflict(
            "You cannot deactivate your own account".to_string(),
        ));
    }

    let updated = sqlx::query(
        "UPDATE users SET is_active = FALSE WHERE id = $1 AND company_id = $2",
    )
    .bind(id)
    .bind(principal.company_id)
    .execute(&state.db)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(SuccessResponse {
        message: "User deactivated".to_string(),
    }))
}
