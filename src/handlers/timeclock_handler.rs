use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth, calendar, clock,
    clock::SessionScope,
    models::{
        KioskActionInput, KioskActionResponse, KioskEmployee, KioskLocationInfo,
        KioskStatusResponse, KioskTodayEntry, ShiftStatus, VerifyPinInput, VerifyPinResponse,
    },
    AppError, AppResult, AppState,
};

#[derive(sqlx::FromRow)]
struct KioskLocationRow {
    id: Uuid,
    name: String,
    company_name: String,
    timezone: Option<String>,
    company_timezone: String,
}

/// Resolve the kiosk entry token to its location. Unknown and inactive
/// tokens are both reported as NotFound.
async fn resolve_token(db: &sqlx::PgPool, token: &str) -> AppResult<KioskLocationRow> {
    sqlx::query_as::<_, KioskLocationRow>(
        "SELECT l.id, l.name, l.timezone, c.name AS company_name, c.timezone AS company_timezone
         FROM locations l
         JOIN companies c ON c.id = l.company_id
         WHERE l.clock_token = $1 AND l.is_active = TRUE",
    )
    .bind(token)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::NotFound("Unknown kiosk".to_string()))
}

#[derive(sqlx::FromRow)]
struct KioskWorkerRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    pin: Option<String>,
}

/// The PIN gate in front of every mutating kiosk action: the worker must
/// be active and assigned to the kiosk's location, and a configured PIN
/// must match exactly. A worker with no PIN passes without one.
async fn verify_worker(
    db: &sqlx::PgPool,
    location_id: Uuid,
    employee_id: Uuid,
    pin: Option<&str>,
) -> AppResult<KioskWorkerRow> {
    let worker = sqlx::query_as::<_, KioskWorkerRow>(
        "SELECT u.id, u.first_name, u.last_name, u.pin
         FROM users u
         JOIN user_locations ul ON ul.user_id = u.id
         WHERE u.id = $1 AND ul.location_id = $2 AND u.is_active = TRUE",
    )
    .bind(employee_id)
    .bind(location_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    if !auth::pin_matches(worker.pin.as_deref(), pin) {
        return Err(AppError::Unauthorized("Incorrect PIN".to_string()));
    }
    Ok(worker)
}

fn kiosk_scope(employee_id: Uuid, location_id: Uuid) -> SessionScope {
    SessionScope::LocationDay {
        user_id: employee_id,
        location_id,
        date: calendar::today(),
    }
}

/// GET /api/timeclock/{token}/info
#[utoipa::path(
    get,
    path = "/api/timeclock/{token}/info",
    params(("token" = String, Path, description = "Kiosk token")),
    responses(
        (status = 200, description = "Kiosk landing details", body = KioskLocationInfo),
        (status = 404, description = "Unknown kiosk")
    ),
    tag = "timeclock"
)]
pub async fn get_info(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> AppResult<Json<KioskLocationInfo>> {
    let location = resolve_token(&state.db, &token).await?;
    Ok(Json(KioskLocationInfo {
        id: location.id,
        name: location.name,
        company_name: location.company_name,
        timezone: location.timezone.unwrap_or(location.company_timezone),
    }))
}

/// GET /api/timeclock/{token}/employees
#[utoipa::path(
    get,
    path = "/api/timeclock/{token}/employees",
    params(("token" = String, Path, description = "Kiosk token")),
    responses(
        (status = 200, description = "Workers assigned to this branch", body = Vec<KioskEmployee>)
    ),
    tag = "timeclock"
)]
pub async fn get_employees(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> AppResult<Json<Vec<KioskEmployee>>> {
    let location = resolve_token(&state.db, &token).await?;

    let employees = sqlx::query_as::<_, KioskEmployee>(
        "SELECT u.id, u.first_name, u.last_name, u.avatar, (u.pin IS NOT NULL) AS has_pin
         FROM users u
         JOIN user_locations ul ON ul.user_id = u.id
         WHERE ul.location_id = $1 AND u.is_active = TRUE
         ORDER BY u.first_name, u.last_name",
    )
    .bind(location.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(employees))
}

/// POST /api/timeclock/{token}/verify-pin
#[utoipa::path(
    post,
    path = "/api/timeclock/{token}/verify-pin",
    params(("token" = String, Path, description = "Kiosk token")),
    request_body = VerifyPinInput,
    responses(
        (status = 200, description = "Whether the PIN matches", body = VerifyPinResponse)
    ),
    tag = "timeclock"
)]
pub async fn verify_pin(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(input): Json<VerifyPinInput>,
) -> AppResult<Json<VerifyPinResponse>> {
    let location = resolve_token(&state.db, &token).await?;

    let result = verify_worker(
        &state.db,
        location.id,
        input.employee_id,
        Some(input.pin.as_str()),
    )
    .await;

    match result {
        Ok(_) => Ok(Json(VerifyPinResponse {
            valid: true,
            message: "PIN verified".to_string(),
        })),
        Err(AppError::Unauthorized(_)) => Ok(Json(VerifyPinResponse {
            valid: false,
            message: "Incorrect PIN".to_string(),
        })),
        Err(e) => Err(e),
    }
}

/// GET /api/timeclock/{token}/status/{employee_id}
///
/// Derived from today's most recent timesheet at this branch: a closed
/// session means the worker may start a fresh one.
#[utoipa::path(
    get,
    path = "/api/timeclock/{token}/status/{employee_id}",
    params(
        ("token" = String, Path, description = "Kiosk token"),
        ("employee_id" = Uuid, Path, description = "Worker id")
    ),
    responses(
        (status = 200, description = "The worker's clock state today", body = KioskStatusResponse)
    ),
    tag = "timeclock"
)]
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    Path((token, employee_id)): Path<(String, Uuid)>,
) -> AppResult<Json<KioskStatusResponse>> {
    let location = resolve_token(&state.db, &token).await?;

    let latest =
        clock::find_latest_today(&state.db, employee_id, location.id, calendar::today()).await?;
    let status = clock::state_of(latest.as_ref());

    Ok(Json(KioskStatusResponse {
        status,
        can_clock_in: status == clock::ClockState::NotClockedIn,
        timesheet: latest,
    }))
}

/// POST /api/timeclock/{token}/clock-in
#[utoipa::path(
    post,
    path = "/api/timeclock/{token}/clock-in",
    params(("token" = String, Path, description = "Kiosk token")),
    request_body = KioskActionInput,
    responses(
        (status = 200, description = "Opened timesheet", body = KioskActionResponse),
        (status = 401, description = "PIN mismatch"),
        (status = 409, description = "Already clocked in today")
    ),
    tag = "timeclock"
)]
pub async fn clock_in(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(input): Json<KioskActionInput>,
) -> AppResult<Json<KioskActionResponse>> {
    let location = resolve_token(&state.db, &token).await?;
    let worker =
        verify_worker(&state.db, location.id, input.employee_id, input.pin.as_deref()).await?;

    // Link today's shift for this worker at this branch, if one exists.
    // Cancelled shifts are skipped so clocking in cannot revive them.
    let shift_id: Option<Uuid> = sqlx::query_scalar(
        "SELECT id FROM shifts
         WHERE user_id = $1 AND location_id = $2 AND date = $3
           AND is_day_off = FALSE AND status != $4
         ORDER BY start_time NULLS LAST
         LIMIT 1",
    )
    .bind(worker.id)
    .bind(location.id)
    .bind(calendar::today())
    .bind(ShiftStatus::Cancelled)
    .fetch_optional(&state.db)
    .await?;

    let scope = kiosk_scope(worker.id, location.id);
    let timesheet = clock::clock_in(&state.db, &scope, location.id, shift_id).await?;

    tracing::info!(user_id = %worker.id, location_id = %location.id, "Kiosk clock-in");
    Ok(Json(KioskActionResponse {
        message: format!("Welcome, {}", worker.first_name),
        employee_first_name: worker.first_name,
        employee_last_name: worker.last_name,
        timesheet,
    }))
}

/// POST /api/timeclock/{token}/clock-out
#[utoipa::path(
    post,
    path = "/api/timeclock/{token}/clock-out",
    params(("token" = String, Path, description = "Kiosk token")),
    request_body = KioskActionInput,
    responses(
        (status = 200, description = "Closed timesheet", body = KioskActionResponse),
        (status = 409, description = "No open session today")
    ),
    tag = "timeclock"
)]
pub async fn clock_out(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(input): Json<KioskActionInput>,
) -> AppResult<Json<KioskActionResponse>> {
    let location = resolve_token(&state.db, &token).await?;
    let worker =
        verify_worker(&state.db, location.id, input.employee_id, input.pin.as_deref()).await?;

    let scope = kiosk_scope(worker.id, location.id);
    let timesheet = clock::clock_out(&state.db, &scope).await?;

    tracing::info!(user_id = %worker.id, location_id = %location.id, "Kiosk clock-out");
    Ok(Json(KioskActionResponse {
        message: format!("Goodbye, {}", worker.first_name),
        employee_first_name: worker.first_name,
        employee_last_name: worker.last_name,
        timesheet,
    }))
}

/// POST /api/timeclock/{token}/break-start
#[utoipa::path(
    post,
    path = "/api/timeclock/{token}/break-start",
    params(("token" = String, Path, description = "Kiosk token")),
    request_body = KioskActionInput,
    responses(
        (status = 200, description = "Break opened", body = KioskActionResponse),
        (status = 409, description = "No open session or break already running")
    ),
    tag = "timeclock"
)]
pub async fn start_break(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(input): Json<KioskActionInput>,
) -> AppResult<Json<KioskActionResponse>> {
    let location = resolve_token(&state.db, &token).await?;
    let worker =
        verify_worker(&state.db, location.id, input.employee_id, input.pin.as_deref()).await?;

    let scope = kiosk_scope(worker.id, location.id);
    let timesheet = clock::start_break(&state.db, &scope).await?;

    Ok(Json(KioskActionResponse {
        message: "Break started".to_string(),
        employee_first_name: worker.first_name,
        employee_last_name: worker.last_name,
        timesheet,
    }))
}

/// POST /api/timeclock/{token}/break-end
#[utoipa::path(
    post,
    path = "/api/timeclock/{token}/break-end",
    params(("token" = String, Path, description = "Kiosk token")),
    request_body = KioskActionInput,
    responses(
        (status = 200, description = "Break closed", body = KioskActionResponse),
        (status = 409, description = "No break in progress")
    ),
    tag = "timeclock"
)]
pub async fn end_break(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(input): Json<KioskActionInput>,
) -> AppResult<Json<KioskActionResponse>> {
    let location = resolve_token(&state.db, &token).await?;
    let worker =
        verify_worker(&state.db, location.id, input.employee_id, input.pin.as_deref()).await?;

    let scope = kiosk_scope(worker.id, location.id);
    let timesheet = clock::end_break(&state.db, &scope).await?;

    Ok(Json(KioskActionResponse {
        message: "Break ended".to_string(),
        employee_first_name: worker.first_name,
        employee_last_name: worker.last_name,
        timesheet,
    }))
}

/// GET /api/timeclock/{token}/today
#[utoipa::path(
    get,
    path = "/api/timeclock/{token}/today",
    params(("token" = String, Path, description = "Kiosk token")),
    responses(
        (status = 200, description = "Today's attendance feed for this branch", body = Vec<KioskTodayEntry>)
    ),
    tag = "timeclock"
)]
pub async fn get_today(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> AppResult<Json<Vec<KioskTodayEntry>>> {
    let location = resolve_token(&state.db, &token).await?;

    let entries = sqlx::query_as::<_, KioskTodayEntry>(
        "SELECT t.id, t.user_id, u.first_name, u.last_name, u.avatar,
                t.clock_in, t.clock_out, t.break_start, t.break_end, t.total_minutes
         FROM timesheets t
         JOIN users u ON u.id = t.user_id
         WHERE t.location_id = $1 AND t.date = $2
         ORDER BY t.clock_in DESC",
    )
    .bind(location.id)
    .bind(calendar::today())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}
