use axum::{extract::State, Json};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth,
    extractors::Principal,
    models::{
        ChangePasswordInput, LoginInput, LoginResponse, SuccessResponse, User, UserLocationEntry,
        UserPositionEntry, UserWithAssignments,
    },
    AppError, AppResult, AppState,
};

/// Load a user together with their location and position assignments.
/// Shared by login, /me and the user handlers.
pub async fn load_user_with_assignments(
    db: &sqlx::PgPool,
    user_id: Uuid,
) -> AppResult<UserWithAssignments> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let locations = sqlx::query_as::<_, UserLocationEntry>(
        "SELECT ul.location_id, l.name, ul.is_primary
         FROM user_locations ul
         JOIN locations l ON l.id = ul.location_id
         WHERE ul.user_id = $1
         ORDER BY ul.is_primary DESC, l.name",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    let positions = sqlx::query_as::<_, UserPositionEntry>(
        "SELECT up.position_id, p.name, p.color
         FROM user_positions up
         JOIN positions p ON p.id = up.position_id
         WHERE up.user_id = $1
         ORDER BY p.name",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(UserWithAssignments {
        user,
        locations,
        positions,
    })
}

/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginInput,
    responses(
        (status = 200, description = "Token and user profile", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<LoginResponse>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
        .bind(&input.email)
        .fetch_optional(&state.db)
        .await?;

    // Same error for unknown email and wrong password
    let user = match user {
        Some(u) if auth::verify_password(&input.password, &u.password_hash) => u,
        _ => {
            return Err(AppError::Unauthorized(
                "Invalid email or password".to_string(),
            ))
        }
    };

    if !user.is_active {
        return Err(AppError::Unauthorized(
            "This account has been deactivated".to_string(),
        ));
    }

    let token = auth::sign_token(user.id, user.company_id, &state.config.jwt_secret)?;
    let user = load_user_with_assignments(&state.db, user.id).await?;

    tracing::info!(user_id = %user.user.id, "User logged in");

    Ok(Json(LoginResponse { token, user }))
}

/// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "The authenticated user with assignments", body = UserWithAssignments),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth"
)]
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> AppResult<Json<UserWithAssignments>> {
    let user = load_user_with_assignments(&state.db, principal.id).await?;
    Ok(Json(user))
}

/// POST /api/auth/change-password
#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    request_body = ChangePasswordInput,
    responses(
        (status = 200, description = "Password changed", body = SuccessResponse),
        (status = 401, description = "Current password is wrong")
    ),
    tag = "auth"
)]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(input): Json<ChangePasswordInput>,
) -> AppResult<Json<SuccessResponse>> {
    if input.new_password.len() < 6 {
        return Err(AppError::Validation(
            "New password must be at least 6 characters".to_string(),
        ));
    }

    let current_hash: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
        .bind(principal.id)
        .fetch_one(&state.db)
        .await?;

    if !auth::verify_password(&input.current_password, &current_hash) {
        return Err(AppError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let new_hash = auth::hash_password(&input.new_password)?;
    sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
        .bind(new_hash)
        .bind(principal.id)
        .execute(&state.db)
        .await?;

    Ok(Json(SuccessResponse {
        message: "Password changed".to_string(),
    }))
}
