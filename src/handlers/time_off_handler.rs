use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use sqlx::QueryBuilder;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    access::Capability,
    calendar,
    extractors::Principal,
    models::{
        CreateTimeOffInput, CreateTimeOffResponse, PendingCountResponse, RejectTimeOffInput,
        ShiftStatus, TimeOffRequest, TimeOffStatus, TimeOffWithUser,
    },
    AppError, AppResult, AppState,
};

const TIME_OFF_DETAILS_SELECT: &str = "SELECT r.*,
    u.first_name AS user_first_name, u.last_name AS user_last_name, u.email AS user_email,
    pl.name AS primary_location_name,
    a.first_name AS approver_first_name, a.last_name AS approver_last_name
    FROM time_off_requests r
    JOIN users u ON u.id = r.user_id
    LEFT JOIN user_locations ul ON ul.user_id = u.id AND ul.is_primary
    LEFT JOIN locations pl ON pl.id = ul.location_id
    LEFT JOIN users a ON a.id = r.approved_by";

#[derive(Debug, Deserialize, IntoParams)]
pub struct GetTimeOffQuery {
    pub status: Option<TimeOffStatus>,
    pub user_id: Option<Uuid>,
}

/// GET /api/time-off
///
/// Workers see their own requests; reviewers see every request from
/// workers assigned to a location in their scope.
#[utoipa::path(
    get,
    path = "/api/time-off",
    params(GetTimeOffQuery),
    responses(
        (status = 200, description = "Time-off requests visible to the caller", body = Vec<TimeOffWithUser>)
    ),
    tag = "time-off"
)]
pub async fn get_time_off_requests(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Query(query): Query<GetTimeOffQuery>,
) -> AppResult<Json<Vec<TimeOffWithUser>>> {
    let mut builder = QueryBuilder::new(TIME_OFF_DETAILS_SELECT);
    builder.push(" WHERE u.company_id = ").push_bind(principal.company_id);

    let reviewer = principal.require(Capability::ReviewTimeOff).is_ok();
    if reviewer {
        if let Some(ids) = principal.scope().as_filter() {
            builder
                .push(" AND (r.user_id = ")
                .push_bind(principal.id)
                .push(" OR EXISTS (SELECT 1 FROM user_locations w
                        WHERE w.user_id = r.user_id AND w.location_id = ANY(")
                .push_bind(ids)
                .push(")))");
        }
    } else {
        builder.push(" AND r.user_id = ").push_bind(principal.id);
    }

    if let Some(status) = query.status {
        builder.push(" AND r.status = ").push_bind(status);
    }
    if let Some(user_id) = query.user_id {
        builder.push(" AND r.user_id = ").push_bind(user_id);
    }
    builder.push(" ORDER BY r.created_at DESC");

    let requests = builder
        .build_query_as::<TimeOffWithUser>()
        .fetch_all(&state.db)
        .await?;
    Ok(Json(requests))
}

/// GET /api/time-off/pending-count
#[utoipa::path(
    get,
    path = "/api/time-off/pending-count",
    responses(
        (status = 200, description = "Pending requests awaiting this reviewer", body = PendingCountResponse)
    ),
    tag = "time-off"
)]
pub async fn get_pending_count(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> AppResult<Json<PendingCountResponse>> {
    principal.require(Capability::ReviewTimeOff)?;

    let mut builder = QueryBuilder::new(
        "SELECT COUNT(*) FROM time_off_requests r
         JOIN users u ON u.id = r.user_id
         WHERE u.company_id = ",
    );
    builder.push_bind(principal.company_id);
    builder.push(" AND r.status = ").push_bind(TimeOffStatus::Pending);
    if let Some(ids) = principal.scope().as_filter() {
        builder
            .push(" AND EXISTS (SELECT 1 FROM user_locations w
                    WHERE w.user_id = r.user_id AND w.location_id = ANY(")
            .push_bind(ids)
            .push("))");
    }

    let count: i64 = builder.build_query_scalar().fetch_one(&state.db).await?;
    Ok(Json(PendingCountResponse { count }))
}

/// POST /api/time-off
#[utoipa::path(
    post,
    path = "/api/time-off",
    request_body = CreateTimeOffInput,
    responses(
        (status = 200, description = "Filed request with a conflict heads-up", body = CreateTimeOffResponse),
        (status = 400, description = "Invalid date range")
    ),
    tag = "time-off"
)]
pub async fn create_time_off_request(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(input): Json<CreateTimeOffInput>,
) -> AppResult<Json<CreateTimeOffResponse>> {
    let start_date = calendar::parse_date(&input.start_date)?;
    let end_date = calendar::parse_date(&input.end_date)?;
    if end_date < start_date {
        return Err(AppError::Validation(
            "End date must not be before the start date".to_string(),
        ));
    }

    let request = sqlx::query_as::<_, TimeOffRequest>(
        "INSERT INTO time_off_requests (id, user_id, type, start_date, end_date, reason, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(principal.id)
    .bind(input.request_type)
    .bind(start_date)
    .bind(end_date)
    .bind(input.reason)
    .bind(TimeOffStatus::Pending)
    .fetch_one(&state.db)
    .await?;

    // Heads-up only; nothing is cancelled until approval
    let conflicting_shifts_count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM shifts
         WHERE user_id = $1 AND date >= $2 AND date <= $3 AND status != $4",
    )
    .bind(principal.id)
    .bind(start_date)
    .bind(end_date)
    .bind(ShiftStatus::Cancelled)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(CreateTimeOffResponse {
        request,
        has_conflicts: conflicting_shifts_count > 0,
        conflicting_shifts_count,
    }))
}

/// Fetch a request whose requester falls inside the reviewer's scope.
async fn fetch_for_review(
    db: &sqlx::PgPool,
    principal: &Principal,
    id: Uuid,
) -> AppResult<TimeOffRequest> {
    let request = sqlx::query_as::<_, TimeOffRequest>(
        "SELECT r.* FROM time_off_requests r
         JOIN users u ON u.id = r.user_id
         WHERE r.id = $1 AND u.company_id = $2",
    )
    .bind(id)
    .bind(principal.company_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::NotFound("Time-off request not found".to_string()))?;

    if let Some(ids) = principal.scope().as_filter() {
        let overlaps: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_locations WHERE user_id = $1 AND location_id = ANY($2)",
        )
        .bind(request.user_id)
        .bind(&ids)
        .fetch_one(db)
        .await?;
        if overlaps == 0 {
            return Err(AppError::NotFound("Time-off request not found".to_string()));
        }
    }
    Ok(request)
}

/// POST /api/time-off/{id}/approve
///
/// Approval cancels every shift of the requester inside the range, in the
/// same transaction. Blunt cancel-all, no negotiation.
#[utoipa::path(
    post,
    path = "/api/time-off/{id}/approve",
    params(("id" = Uuid, Path, description = "Request id")),
    responses(
        (status = 200, description = "Approved request", body = TimeOffRequest),
        (status = 409, description = "Not pending")
    ),
    tag = "time-off"
)]
pub async fn approve_time_off(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TimeOffRequest>> {
    principal.require(Capability::ReviewTimeOff)?;
    let current = fetch_for_review(&state.db, &principal, id).await?;

    if current.status != TimeOffStatus::Pending {
        return Err(AppError::Conflict(
            "Only pending requests can be approved".to_string(),
        ));
    }

    let mut tx = state.db.begin().await?;

    let request = sqlx::query_as::<_, TimeOffRequest>(
        "UPDATE time_off_requests SET status = $1, approved_by = $2, approved_at = $3
         WHERE id = $4
         RETURNING *",
    )
    .bind(TimeOffStatus::Approved)
    .bind(principal.id)
    .bind(Utc::now())
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    let cancelled = sqlx::query(
        "UPDATE shifts SET status = $1, updated_at = now()
         WHERE user_id = $2 AND date >= $3 AND date <= $4",
    )
    .bind(ShiftStatus::Cancelled)
    .bind(request.user_id)
    .bind(request.start_date)
    .bind(request.end_date)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        request_id = %id,
        cancelled_shifts = cancelled.rows_affected(),
        "Time off approved"
    );
    Ok(Json(request))
}

/// POST /api/time-off/{id}/reject
#[utoipa::path(
    post,
    path = "/api/time-off/{id}/reject",
    params(("id" = Uuid, Path, description = "Request id")),
    request_body = RejectTimeOffInput,
    responses(
        (status = 200, description = "Rejected request", body = TimeOffRequest),
        (status = 409, description = "Not pending")
    ),
    tag = "time-off"
)]
pub async fn reject_time_off(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(input): Json<RejectTimeOffInput>,
) -> AppResult<Json<TimeOffRequest>> {
    principal.require(Capability::ReviewTimeOff)?;
    let current = fetch_for_review(&state.db, &principal, id).await?;

    if current.status != TimeOffStatus::Pending {
        return Err(AppError::Conflict(
            "Only pending requests can be rejected".to_string(),
        ));
    }

    let request = sqlx::query_as::<_, TimeOffRequest>(
        "UPDATE time_off_requests
         SET status = $1, approved_by = $2, approved_at = $3, rejected_reason = $4
         WHERE id = $5
         RETURNING *",
    )
    .bind(TimeOffStatus::Rejected)
    .bind(principal.id)
    .bind(Utc::now())
    .bind(input.reason)
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(request))
}

/// POST /api/time-off/{id}/cancel — requester withdraws a pending request.
#[utoipa::path(
    post,
    path = "/api/time-off/{id}/cancel",
    params(("id" = Uuid, Path, description = "Request id")),
    responses(
        (status = 200, description = "Cancelled request", body = TimeOffRequest),
        (status = 409, description = "Not pending")
    ),
    tag = "time-off"
)]
pub async fn cancel_time_off(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TimeOffRequest>> {
    let current = sqlx::query_as::<_, TimeOffRequest>(
        "SELECT * FROM time_off_requests WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(principal.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Time-off request not found".to_string()))?;

    if current.status != TimeOffStatus::Pending {
        return Err(AppError::Conflict(
            "Only pending requests can be cancelled".to_string(),
        ));
    }

    let request = sqlx::query_as::<_, TimeOffRequest>(
        "UPDATE time_off_requests SET status = $1 WHERE id = $2 RETURNING *",
    )
    .bind(TimeOffStatus::Cancelled)
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(request))
}
