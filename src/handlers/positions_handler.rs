use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    access::Capability,
    extractors::Principal,
    models::{CreatePositionInput, Position, SuccessResponse, UpdatePositionInput},
    AppError, AppResult, AppState,
};

const DEFAULT_COLOR: &str = "#3B82F6";

/// GET /api/positions
#[utoipa::path(
    get,
    path = "/api/positions",
    responses(
        (status = 200, description = "Active positions in the company", body = Vec<Position>)
    ),
    tag = "positions"
)]
pub async fn get_positions(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> AppResult<Json<Vec<Position>>> {
    let positions = sqlx::query_as::<_, Position>(
        "SELECT * FROM positions WHERE company_id = $1 AND is_active = TRUE ORDER BY name",
    )
    .bind(principal.company_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(positions))
}

/// POST /api/positions
#[utoipa::path(
    post,
    path = "/api/positions",
    request_body = CreatePositionInput,
    responses(
        (status = 200, description = "Created position", body = Position),
        (status = 403, description = "Role cannot manage positions")
    ),
    tag = "positions"
)]
pub async fn create_position(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(input): Json<CreatePositionInput>,
) -> AppResult<Json<Position>> {
    principal.require(Capability::ManagePositions)?;

    if input.name.trim().is_empty() {
        return Err(AppError::Validation("Position name is required".to_string()));
    }

    let position = sqlx::query_as::<_, Position>(
        "INSERT INTO positions (id, company_id, name, description, color, hourly_rate)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(principal.company_id)
    .bind(input.name.trim())
    .bind(input.description)
    .bind(input.color.as_deref().unwrap_or(DEFAULT_COLOR))
    .bind(input.hourly_rate)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(position))
}

/// PUT /api/positions/{id}
#[utoipa::path(
    put,
    path = "/api/positions/{id}",
    params(("id" = Uuid, Path, description = "Position id")),
    request_body = UpdatePositionInput,
    responses(
        (status = 200, description = "Updated position", body = Position),
        (status = 404, description = "Not found")
    ),
    tag = "positions"
)]
pub async fn update_position(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePositionInput>,
) -> AppResult<Json<Position>> {
    principal.require(Capability::ManagePositions)?;

    let current =
        sqlx::query_as::<_, Position>("SELECT * FROM positions WHERE id = $1 AND company_id = $2")
            .bind(id)
            .bind(principal.company_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Position not found".to_string()))?;

    let position = sqlx::query_as::<_, Position>(
        "UPDATE positions
         SET name = $1, description = $2, color = $3, hourly_rate = $4, is_active = $5
         WHERE id = $6
         RETURNING *",
    )
    .bind(input.name.unwrap_or(current.name))
    .bind(input.description.or(current.description))
    .bind(input.color.unwrap_or(current.color))
    .bind(input.hourly_rate.or(current.hourly_rate))
    .bind(input.is_active.unwrap_or(current.is_active))
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(position))
}

/// DELETE /api/positions/{id} — soft delete.
#[utoipa::path(
    delete,
    path = "/api/positions/{id}",
    params(("id" = Uuid, Path, description = "Position id")),
    responses(
        (status = 200, description = "Position deactivated", body = SuccessResponse),
        (status = 404, description = "Not found")
    ),
    tag = "positions"
)]
pub async fn delete_position(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SuccessResponse>> {
    principal.require(Capability::ManagePositions)?;

    let updated = sqlx::query(
        "UPDATE positions SET is_active = FALSE WHERE id = $1 AND company_id = $2",
    )
    .bind(id)
    .bind(principal.company_id)
    .execute(&state.db)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound("Position not found".to_string()));
    }

    Ok(Json(SuccessResponse {
        message: "Position deactivated".to_string(),
    }))
}
