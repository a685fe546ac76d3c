use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    access::Capability,
    auth,
    extractors::Principal,
    models::{CreateLocationInput, Location, SuccessResponse, UpdateLocationInput},
    AppError, AppResult, AppState,
};

/// The headquarters must stay active. Applies to the soft delete and to
/// an update that submits `is_active = false`.
fn deactivates_headquarters(is_headquarters: bool, requested_active: Option<bool>) -> bool {
    is_headquarters && requested_active == Some(false)
}

/// Fetch a location in the caller's company, reporting out-of-scope ids
/// as NotFound so their existence never leaks.
async fn fetch_scoped(
    db: &sqlx::PgPool,
    principal: &Principal,
    id: Uuid,
) -> AppResult<Location> {
    let location =
        sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE id = $1 AND company_id = $2")
            .bind(id)
            .bind(principal.company_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Location not found".to_string()))?;

    if !principal.scope().contains(location.id) {
        return Err(AppError::NotFound("Location not found".to_string()));
    }
    Ok(location)
}

/// GET /api/locations
#[utoipa::path(
    get,
    path = "/api/locations",
    responses(
        (status = 200, description = "Locations within the caller's scope", body = Vec<Location>)
    ),
    tag = "locations"
)]
pub async fn get_locations(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> AppResult<Json<Vec<Location>>> {
    let locations = match principal.scope().as_filter() {
        None => {
            sqlx::query_as::<_, Location>(
                "SELECT * FROM locations WHERE company_id = $1 ORDER BY is_headquarters DESC, name",
            )
            .bind(principal.company_id)
            .fetch_all(&state.db)
            .await?
        }
        Some(ids) => {
            sqlx::query_as::<_, Location>(
                "SELECT * FROM locations
                 WHERE company_id = $1 AND id = ANY($2)
                 ORDER BY is_headquarters DESC, name",
            )
            .bind(principal.company_id)
            .bind(&ids)
            .fetch_all(&state.db)
            .await?
        }
    };

    Ok(Json(locations))
}

/// GET /api/locations/{id}
#[utoipa::path(
    get,
    path = "/api/locations/{id}",
    params(("id" = Uuid, Path, description = "Location id")),
    responses(
        (status = 200, description = "The location", body = Location),
        (status = 404, description = "Not found or out of scope")
    ),
    tag = "locations"
)]
pub async fn get_location(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Location>> {
    let location = fetch_scoped(&state.db, &principal, id).await?;
    Ok(Json(location))
}

/// POST /api/locations
#[utoipa::path(
    post,
    path = "/api/locations",
    request_body = CreateLocationInput,
    responses(
        (status = 200, description = "Created location", body = Location),
        (status = 403, description = "Role cannot manage locations")
    ),
    tag = "locations"
)]
pub async fn create_location(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(input): Json<CreateLocationInput>,
) -> AppResult<Json<Location>> {
    principal.require(Capability::ManageLocations)?;

    if input.name.trim().is_empty() {
        return Err(AppError::Validation("Location name is required".to_string()));
    }

    let is_headquarters = input.is_headquarters.unwrap_or(false);
    let mut tx = state.db.begin().await?;

    // At most one headquarters per company
    if is_headquarters {
        sqlx::query("UPDATE locations SET is_headquarters = FALSE WHERE company_id = $1")
            .bind(principal.company_id)
            .execute(&mut *tx)
            .await?;
    }

    let location = sqlx::query_as::<_, Location>(
        "INSERT INTO locations (id, company_id, name, address, phone, email, timezone, is_headquarters, clock_token)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(principal.company_id)
    .bind(input.name.trim())
    .bind(input.address)
    .bind(input.phone)
    .bind(input.email)
    .bind(input.timezone)
    .bind(is_headquarters)
    .bind(auth::generate_clock_token())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Json(location))
}

/// PUT /api/locations/{id}
#[utoipa::path(
    put,
    path = "/api/locations/{id}",
    params(("id" = Uuid, Path, description = "Location id")),
    request_body = UpdateLocationInput,
    responses(
        (status = 200, description = "Updated location", body = Location),
        (status = 404, description = "Not found or out of scope")
    ),
    tag = "locations"
)]
pub async fn update_location(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateLocationInput>,
) -> AppResult<Json<Location>> {
    principal.require(Capability::EditLocation)?;
    let current = fetch_scoped(&state.db, &principal, id).await?;

    if deactivates_headquarters(current.is_headquarters, input.is_active) {
        return Err(AppError::Conflict(
            "The headquarters location cannot be deactivated".to_string(),
        ));
    }

    let mut tx = state.db.begin().await?;

    let becomes_headquarters = input.is_headquarters.unwrap_or(current.is_headquarters);
    if becomes_headquarters && !current.is_headquarters {
        sqlx::query("UPDATE locations SET is_headquarters = FALSE WHERE company_id = $1")
            .bind(principal.company_id)
            .execute(&mut *tx)
            .await?;
    }

    let location = sqlx::query_as::<_, Location>(
        "UPDATE locations
         SET name = $1, address = $2, phone = $3, email = $4, timezone = $5,
             is_headquarters = $6, is_active = $7
         WHERE id = $8
         RETURNING *",
    )
    .bind(input.name.unwrap_or(current.name))
    .bind(input.address.or(current.address))
    .bind(input.phone.or(current.phone))
    .bind(input.email.or(current.email))
    .bind(input.timezone.or(current.timezone))
    .bind(becomes_headquarters)
    .bind(input.is_active.unwrap_or(current.is_active))
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Json(location))
}

/// DELETE /api/locations/{id} — soft delete; the headquarters is refused.
#[utoipa::path(
    delete,
    path = "/api/locations/{id}",
    params(("id" = Uuid, Path, description = "Location id")),
    responses(
        (status = 200, description = "Location deactivated", body = SuccessResponse),
        (status = 409, description = "Cannot deactivate the headquarters")
    ),
    tag = "locations"
)]
pub async fn delete_location(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SuccessResponse>> {
    principal.require(Capability::ManageLocations)?;
    let location = fetch_scoped(&state.db, &principal, id).await?;

    if deactivates_headquarters(location.is_headquarters, Some(false)) {
        return Err(AppError::Conflict(
            "The headquarters location cannot be deactivated".to_string(),
        ));
    }

    sqlx::query("UPDATE locations SET is_active = FALSE WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    Ok(Json(SuccessResponse {
        message: "Location deactivated".to_string(),
    }))
}

/// POST /api/locations/{id}/rotate-token — invalidates the old kiosk URL.
#[utoipa::path(
    post,
    path = "/api/locations/{id}/rotate-token",
    params(("id" = Uuid, Path, description = "Location id")),
    responses(
        (status = 200, description = "Location with a fresh kiosk token", body = Location)
    ),
    tag = "locations"
)]
pub async fn rotate_clock_token(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Location>> {
    principal.require(Capability::ManageLocations)?;
    fetch_scoped(&state.db, &principal, id).await?;

    let location = sqlx::query_as::<_, Location>(
        "UPDATE locations SET clock_token = $1 WHERE id = $2 RETURNING *",
    )
    .bind(auth::generate_clock_token())
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(location_id = %id, "Kiosk token rotated");
    Ok(Json(location))
}

#[cfg(test)]
mod tests {
    use super::deactivates_headquarters;

    #[test]
    fn test_headquarters_cannot_be_deactivated_by_update_or_delete() {
        assert!(deactivates_headquarters(true, Some(false)));

        assert!(!deactivates_headquarters(true, Some(true)));
        assert!(!deactivates_headquarters(true, None));
        assert!(!deactivates_headquarters(false, Some(false)));
    }
}
