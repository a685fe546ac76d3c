use axum::{extract::State, Json};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth,
    models::{SetupInput, SetupResponse, UserRole},
    AppError, AppResult, AppState,
};

/// POST /api/setup
///
/// One-time bootstrap of an empty database: creates the company, its
/// headquarters location and a SUPER_ADMIN account in one transaction.
/// Refuses once any company exists.
#[utoipa::path(
    post,
    path = "/api/setup",
    request_body = SetupInput,
    responses(
        (status = 200, description = "Company bootstrapped", body = SetupResponse),
        (status = 409, description = "Already set up")
    ),
    tag = "setup"
)]
pub async fn run_setup(
    State(state): State<Arc<AppState>>,
    Json(input): Json<SetupInput>,
) -> AppResult<Json<SetupResponse>> {
    if input.company_name.trim().is_empty() {
        return Err(AppError::Validation("Company name is required".to_string()));
    }
    if input.admin_email.trim().is_empty() {
        return Err(AppError::Validation("Admin email is required".to_string()));
    }
    if input.admin_password.len() < 6 {
        return Err(AppError::Validation(
            "Admin password must be at least 6 characters".to_string(),
        ));
    }

    let password_hash = auth::hash_password(&input.admin_password)?;

    let mut tx = state.db.begin().await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM companies")
        .fetch_one(&mut *tx)
        .await?;
    if existing > 0 {
        return Err(AppError::Conflict(
            "Setup has already been completed".to_string(),
        ));
    }

    let company_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO companies (id, name, timezone, currency) VALUES ($1, $2, $3, $4)",
    )
    .bind(company_id)
    .bind(input.company_name.trim())
    .bind(input.timezone.as_deref().unwrap_or("UTC"))
    .bind(input.currency.as_deref().unwrap_or("USD"))
    .execute(&mut *tx)
    .await?;

    let location_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO locations (id, company_id, name, is_headquarters, clock_token)
         VALUES ($1, $2, $3, TRUE, $4)",
    )
    .bind(location_id)
    .bind(company_id)
    .bind("Headquarters")
    .bind(auth::generate_clock_token())
    .execute(&mut *tx)
    .await?;

    let admin_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO users (id, company_id, email, password_hash, first_name, last_name, role, can_view_all)
         VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE)",
    )
    .bind(admin_id)
    .bind(company_id)
    .bind(input.admin_email.trim().to_lowercase())
    .bind(password_hash)
    .bind(&input.admin_first_name)
    .bind(&input.admin_last_name)
    .bind(UserRole::SuperAdmin)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO user_locations (id, user_id, location_id, is_primary) VALUES ($1, $2, $3, TRUE)",
    )
    .bind(Uuid::new_v4())
    .bind(admin_id)
    .bind(location_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(%company_id, "Company bootstrapped");

    Ok(Json(SetupResponse {
        company_id,
        location_id,
        admin_id,
        message: "Setup complete".to_string(),
    }))
}
