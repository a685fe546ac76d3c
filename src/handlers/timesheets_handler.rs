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
    calendar, clock,
    clock::SessionScope,
    extractors::Principal,
    models::{
        accepts_attendance, ClockInInput, RejectTimesheetInput, ShiftStatus, Timesheet,
        TimesheetStatus, TimesheetStatusResponse, TimesheetWithDetails,
    },
    AppError, AppResult, AppState,
};

const TIMESHEET_DETAILS_SELECT: &str = "SELECT t.*,
    u.first_name AS user_first_name, u.last_name AS user_last_name,
    l.name AS location_name
    FROM timesheets t
    JOIN users u ON u.id = t.user_id
    JOIN locations l ON l.id = t.location_id";

#[derive(Debug, Deserialize, IntoParams)]
pub struct GetTimesheetsQuery {
    pub location_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<TimesheetStatus>,
}

/// GET /api/timesheets
///
/// Workers see their own records; reviewers additionally see everything
/// inside their location scope.
#[utoipa::path(
    get,
    path = "/api/timesheets",
    params(GetTimesheetsQuery),
    responses(
        (status = 200, description = "Timesheets matching the filters", body = Vec<TimesheetWithDetails>)
    ),
    tag = "timesheets"
)]
pub async fn get_timesheets(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Query(query): Query<GetTimesheetsQuery>,
) -> AppResult<Json<Vec<TimesheetWithDetails>>> {
    let mut builder = QueryBuilder::new(TIMESHEET_DETAILS_SELECT);
    builder.push(" WHERE l.company_id = ").push_bind(principal.company_id);

    let reviewer = principal.require(Capability::ReviewTimesheets).is_ok();
    if reviewer {
        if let Some(ids) = principal.scope().as_filter() {
            builder
                .push(" AND (t.location_id = ANY(")
                .push_bind(ids)
                .push(") OR t.user_id = ")
                .push_bind(principal.id)
                .push(")");
        }
    } else {
        builder.push(" AND t.user_id = ").push_bind(principal.id);
    }

    if let Some(location_id) = query.location_id {
        builder.push(" AND t.location_id = ").push_bind(location_id);
    }
    if let Some(user_id) = query.user_id {
        builder.push(" AND t.user_id = ").push_bind(user_id);
    }
    if let Some(start) = query.start_date.as_deref() {
        let start = calendar::parse_date(start)?;
        builder.push(" AND t.date >= ").push_bind(start);
    }
    if let Some(end) = query.end_date.as_deref() {
        let end = calendar::parse_date(end)?;
        builder.push(" AND t.date <= ").push_bind(end);
    }
    if let Some(status) = query.status {
        builder.push(" AND t.status = ").push_bind(status);
    }
    builder.push(" ORDER BY t.date DESC, t.clock_in DESC");

    let timesheets = builder
        .build_query_as::<TimesheetWithDetails>()
        .fetch_all(&state.db)
        .await?;
    Ok(Json(timesheets))
}

/// GET /api/timesheets/status
#[utoipa::path(
    get,
    path = "/api/timesheets/status",
    responses(
        (status = 200, description = "The caller's clock state", body = TimesheetStatusResponse)
    ),
    tag = "timesheets"
)]
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> AppResult<Json<TimesheetStatusResponse>> {
    let scope = SessionScope::Worker {
        user_id: principal.id,
    };
    let open = clock::find_open_session(&state.db, &scope).await?;

    Ok(Json(TimesheetStatusResponse {
        status: clock::state_of(open.as_ref()),
        timesheet: open,
    }))
}

/// POST /api/timesheets/clock-in
#[utoipa::path(
    post,
    path = "/api/timesheets/clock-in",
    request_body = ClockInInput,
    responses(
        (status = 200, description = "Opened timesheet", body = Timesheet),
        (status = 409, description = "An open session already exists")
    ),
    tag = "timesheets"
)]
pub async fn clock_in(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(input): Json<ClockInInput>,
) -> AppResult<Json<Timesheet>> {
    if !principal.scope().contains(input.location_id) {
        return Err(AppError::Forbidden(format!(
            "No access to location {}",
            input.location_id
        )));
    }

    // A linked shift must be the caller's own, at this location, and still
    // able to take attendance
    if let Some(shift_id) = input.shift_id {
        let row: Option<(ShiftStatus, bool)> = sqlx::query_as(
            "SELECT status, is_day_off FROM shifts
             WHERE id = $1 AND location_id = $2 AND user_id = $3",
        )
        .bind(shift_id)
        .bind(input.location_id)
        .bind(principal.id)
        .fetch_optional(&state.db)
        .await?;

        let (status, is_day_off) =
            row.ok_or_else(|| AppError::NotFound("Shift not found".to_string()))?;
        if !accepts_attendance(status, is_day_off) {
            return Err(AppError::Conflict(
                "This shift cannot be clocked against".to_string(),
            ));
        }
    }

    let scope = SessionScope::Worker {
        user_id: principal.id,
    };
    let timesheet = clock::clock_in(&state.db, &scope, input.location_id, input.shift_id).await?;

    tracing::info!(user_id = %principal.id, timesheet_id = %timesheet.id, "Clocked in");
    Ok(Json(timesheet))
}

/// POST /api/timesheets/clock-out
#[utoipa::path(
    post,
    path = "/api/timesheets/clock-out",
    responses(
        (status = 200, description = "Closed timesheet with totals", body = Timesheet),
        (status = 409, description = "No open session")
    ),
    tag = "timesheets"
)]
pub async fn clock_out(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> AppResult<Json<Timesheet>> {
    let scope = SessionScope::Worker {
        user_id: principal.id,
    };
    let timesheet = clock::clock_out(&state.db, &scope).await?;

    tracing::info!(user_id = %principal.id, total_minutes = ?timesheet.total_minutes, "Clocked out");
    Ok(Json(timesheet))
}

/// POST /api/timesheets/break/start
#[utoipa::path(
    post,
    path = "/api/timesheets/break/start",
    responses(
        (status = 200, description = "Timesheet with the break opened", body = Timesheet),
        (status = 409, description = "No open session or break already running")
    ),
    tag = "timesheets"
)]
pub async fn start_break(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> AppResult<Json<Timesheet>> {
    let scope = SessionScope::Worker {
        user_id: principal.id,
    };
    let timesheet = clock::start_break(&state.db, &scope).await?;
    Ok(Json(timesheet))
}

/// POST /api/timesheets/break/end
#[utoipa::path(
    post,
    path = "/api/timesheets/break/end",
    responses(
        (status = 200, description = "Timesheet with the break closed", body = Timesheet),
        (status = 409, description = "No break in progress")
    ),
    tag = "timesheets"
)]
pub async fn end_break(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> AppResult<Json<Timesheet>> {
    let scope = SessionScope::Worker {
        user_id: principal.id,
    };
    let timesheet = clock::end_break(&state.db, &scope).await?;
    Ok(Json(timesheet))
}

/// Fetch a submitted timesheet inside the reviewer's scope.
async fn fetch_for_review(
    db: &sqlx::PgPool,
    principal: &Principal,
    id: Uuid,
) -> AppResult<Timesheet> {
    let timesheet = sqlx::query_as::<_, Timesheet>(
        "SELECT t.* FROM timesheets t
         JOIN locations l ON l.id = t.location_id
         WHERE t.id = $1 AND l.company_id = $2",
    )
    .bind(id)
    .bind(principal.company_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::NotFound("Timesheet not found".to_string()))?;

    if !principal.scope().contains(timesheet.location_id) {
        return Err(AppError::NotFound("Timesheet not found".to_string()));
    }
    Ok(timesheet)
}

/// POST /api/timesheets/{id}/approve
#[utoipa::path(
    post,
    path = "/api/timesheets/{id}/approve",
    params(("id" = Uuid, Path, description = "Timesheet id")),
    responses(
        (status = 200, description = "Approved timesheet", body = Timesheet),
        (status = 409, description = "Not in a reviewable state")
    ),
    tag = "timesheets"
)]
pub async fn approve_timesheet(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Timesheet>> {
    principal.require(Capability::ReviewTimesheets)?;
    let current = fetch_for_review(&state.db, &principal, id).await?;

    if current.status != TimesheetStatus::Submitted {
        return Err(AppError::Conflict(
            "Only submitted timesheets can be approved".to_string(),
        ));
    }

    let timesheet = sqlx::query_as::<_, Timesheet>(
        "UPDATE timesheets SET status = $1, approved_by = $2, approved_at = $3
         WHERE id = $4
         RETURNING *",
    )
    .bind(TimesheetStatus::Approved)
    .bind(principal.id)
    .bind(Utc::now())
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(timesheet))
}

/// POST /api/timesheets/{id}/reject
#[utoipa::path(
    post,
    path = "/api/timesheets/{id}/reject",
    params(("id" = Uuid, Path, description = "Timesheet id")),
    request_body = RejectTimesheetInput,
    responses(
        (status = 200, description = "Rejected timesheet", body = Timesheet),
        (status = 409, description = "Not in a reviewable state")
    ),
    tag = "timesheets"
)]
pub async fn reject_timesheet(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(input): Json<RejectTimesheetInput>,
) -> AppResult<Json<Timesheet>> {
    principal.require(Capability::ReviewTimesheets)?;
    let current = fetch_for_review(&state.db, &principal, id).await?;

    if current.status != TimesheetStatus::Submitted {
        return Err(AppError::Conflict(
            "Only submitted timesheets can be rejected".to_string(),
        ));
    }

    let timesheet = sqlx::query_as::<_, Timesheet>(
        "UPDATE timesheets SET status = $1, approved_by = $2, approved_at = $3, notes = $4
         WHERE id = $5
         RETURNING *",
    )
    .bind(TimesheetStatus::Rejected)
    .bind(principal.id)
    .bind(Utc::now())
    .bind(input.reason)
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(timesheet))
}
