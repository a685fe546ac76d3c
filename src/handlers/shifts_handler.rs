use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::QueryBuilder;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    access::{role_has, Capability},
    calendar,
    extractors::Principal,
    models::{
        apply_update, normalize_draft, BulkCreateShiftsInput, BulkShiftsResponse, CopyWeekInput,
        CreateShiftInput, PublishShiftsInput, Shift, ShiftCountResponse, ShiftDraft, ShiftStatus,
        ShiftWithDetails, UpdateShiftInput,
    },
    AppError, AppResult, AppState,
};

const SHIFT_DETAILS_SELECT: &str = "SELECT s.*, l.name AS location_name,
    u.first_name AS user_first_name, u.last_name AS user_last_name, u.avatar AS user_avatar,
    p.name AS position_name, p.color AS position_color
    FROM shifts s
    JOIN locations l ON l.id = s.location_id
    LEFT JOIN users u ON u.id = s.user_id
    LEFT JOIN positions p ON p.id = s.position_id";

#[derive(Debug, Deserialize, IntoParams)]
pub struct GetShiftsQuery {
    pub location_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    /// `YYYY-MM-DD`, inclusive.
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`, inclusive.
    pub end_date: Option<String>,
    pub status: Option<ShiftStatus>,
    pub is_published: Option<bool>,
    pub open_only: Option<bool>,
}

/// GET /api/shifts
///
/// Every filter is ANDed with the caller's location scope. Callers without
/// scheduling authority additionally see only published shifts, except
/// their own.
#[utoipa::path(
    get,
    path = "/api/shifts",
    params(GetShiftsQuery),
    responses(
        (status = 200, description = "Shifts matching the filters", body = Vec<ShiftWithDetails>)
    ),
    tag = "shifts"
)]
pub async fn get_shifts(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Query(query): Query<GetShiftsQuery>,
) -> AppResult<Json<Vec<ShiftWithDetails>>> {
    let mut builder = QueryBuilder::new(SHIFT_DETAILS_SELECT);
    builder.push(" WHERE l.company_id = ").push_bind(principal.company_id);

    if let Some(ids) = principal.scope().as_filter() {
        builder.push(" AND s.location_id = ANY(").push_bind(ids).push(")");
    }
    if let Some(location_id) = query.location_id {
        builder.push(" AND s.location_id = ").push_bind(location_id);
    }
    if let Some(user_id) = query.user_id {
        builder.push(" AND s.user_id = ").push_bind(user_id);
    }
    if let Some(start) = query.start_date.as_deref() {
        let start = calendar::parse_date(start)?;
        builder.push(" AND s.date >= ").push_bind(start);
    }
    if let Some(end) = query.end_date.as_deref() {
        let end = calendar::parse_date(end)?;
        builder.push(" AND s.date <= ").push_bind(end);
    }
    if let Some(status) = query.status {
        builder.push(" AND s.status = ").push_bind(status);
    }
    if let Some(is_published) = query.is_published {
        builder.push(" AND s.is_published = ").push_bind(is_published);
    }
    if query.open_only.unwrap_or(false) {
        builder.push(" AND s.is_open_shift = TRUE AND s.user_id IS NULL");
    }

    // Workers see drafts only when the shift is theirs
    if !role_has(principal.role, Capability::ManageShifts) {
        builder
            .push(" AND (s.is_published = TRUE OR s.user_id = ")
            .push_bind(principal.id)
            .push(")");
    }

    builder.push(" ORDER BY s.date, s.start_time NULLS LAST");

    let shifts = builder
        .build_query_as::<ShiftWithDetails>()
        .fetch_all(&state.db)
        .await?;
    Ok(Json(shifts))
}

async fn fetch_scoped(
    db: &sqlx::PgPool,
    principal: &Principal,
    id: Uuid,
) -> AppResult<Shift> {
    let shift = sqlx::query_as::<_, Shift>(
        "SELECT s.* FROM shifts s
         JOIN locations l ON l.id = s.location_id
         WHERE s.id = $1 AND l.company_id = $2",
    )
    .bind(id)
    .bind(principal.company_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::NotFound("Shift not found".to_string()))?;

    if !principal.scope().contains(shift.location_id) {
        return Err(AppError::NotFound("Shift not found".to_string()));
    }
    Ok(shift)
}

/// Validate a draft against the caller's scope before any write.
fn check_draft_scope(principal: &Principal, draft: &ShiftDraft) -> AppResult<()> {
    if principal.scope().contains(draft.location_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "No access to location {}",
            draft.location_id
        )))
    }
}

async fn insert_draft(
    db: impl sqlx::PgExecutor<'_>,
    draft: &ShiftDraft,
) -> Result<Shift, sqlx::Error> {
    sqlx::query_as::<_, Shift>(
        "INSERT INTO shifts (id, location_id, user_id, position_id, date, start_time, end_time,
                             break_minutes, notes, status, is_open_shift, is_published,
                             is_day_off, day_off_type, is_paid)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, FALSE, $12, $13, $14)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(draft.location_id)
    .bind(draft.user_id)
    .bind(draft.position_id)
    .bind(draft.date)
    .bind(draft.start_time)
    .bind(draft.end_time)
    .bind(draft.break_minutes)
    .bind(&draft.notes)
    .bind(ShiftStatus::Scheduled)
    .bind(draft.is_open_shift)
    .bind(draft.is_day_off)
    .bind(draft.day_off_type)
    .bind(draft.is_paid)
    .fetch_one(db)
    .await
}

/// POST /api/shifts
#[utoipa::path(
    post,
    path = "/api/shifts",
    request_body = CreateShiftInput,
    responses(
        (status = 200, description = "Created shift", body = Shift),
        (status = 400, description = "Invalid draft"),
        (status = 403, description = "Role or scope does not permit")
    ),
    tag = "shifts"
)]
pub async fn create_shift(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(input): Json<CreateShiftInput>,
) -> AppResult<Json<Shift>> {
    principal.require(Capability::ManageShifts)?;

    let draft = normalize_draft(input)?;
    check_draft_scope(&principal, &draft)?;

    let shift = insert_draft(&state.db, &draft).await?;
    Ok(Json(shift))
}

/// POST /api/shifts/bulk
///
/// All-or-nothing: every draft is validated before the transaction opens,
/// and any insert failure rolls the whole batch back.
#[utoipa::path(
    post,
    path = "/api/shifts/bulk",
    request_body = BulkCreateShiftsInput,
    responses(
        (status = 200, description = "All shifts created", body = BulkShiftsResponse),
        (status = 400, description = "Empty list or an invalid draft")
    ),
    tag = "shifts"
)]
pub async fn bulk_create_shifts(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(input): Json<BulkCreateShiftsInput>,
) -> AppResult<Json<BulkShiftsResponse>> {
    principal.require(Capability::BulkManageShifts)?;

    if input.shifts.is_empty() {
        return Err(AppError::Validation("No shifts provided".to_string()));
    }

    let drafts: Vec<ShiftDraft> = input
        .shifts
        .into_iter()
        .map(normalize_draft)
        .collect::<Result<_, _>>()?;
    for draft in &drafts {
        check_draft_scope(&principal, draft)?;
    }

    let mut tx = state.db.begin().await?;
    let mut created = Vec::with_capacity(drafts.len());
    for draft in &drafts {
        created.push(insert_draft(&mut *tx, draft).await?);
    }
    tx.commit().await?;

    Ok(Json(BulkShiftsResponse {
        count: created.len(),
        shifts: created,
    }))
}

/// POST /api/shifts/copy-week
///
/// Copies every shift of the source week into the target week, offset by
/// whole calendar days. Copies always land as drafts.
#[utoipa::path(
    post,
    path = "/api/shifts/copy-week",
    request_body = CopyWeekInput,
    responses(
        (status = 200, description = "Copied shift count", body = ShiftCountResponse),
        (status = 409, description = "Source week has no shifts")
    ),
    tag = "shifts"
)]
pub async fn copy_week(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(input): Json<CopyWeekInput>,
) -> AppResult<Json<ShiftCountResponse>> {
    principal.require(Capability::BulkManageShifts)?;

    if !principal.scope().contains(input.location_id) {
        return Err(AppError::Forbidden(format!(
            "No access to location {}",
            input.location_id
        )));
    }

    let source_start = calendar::parse_date(&input.source_start_date)?;
    let target_start = calendar::parse_date(&input.target_start_date)?;
    let offset = calendar::day_offset(source_start, target_start);

    let mut tx = state.db.begin().await?;

    let source: Vec<Shift> = sqlx::query_as(
        "SELECT * FROM shifts WHERE location_id = $1 AND date >= $2 AND date <= $3",
    )
    .bind(input.location_id)
    .bind(source_start)
    .bind(calendar::week_end(source_start))
    .fetch_all(&mut *tx)
    .await?;

    if source.is_empty() {
        return Err(AppError::Conflict(
            "The source week has no shifts to copy".to_string(),
        ));
    }

    let mut count = 0u64;
    for shift in &source {
        let date: NaiveDate = shift.date + chrono::Duration::days(offset);
        sqlx::query(
            "INSERT INTO shifts (id, location_id, user_id, position_id, date, start_time, end_time,
                                 break_minutes, notes, status, is_open_shift, is_published,
                                 is_day_off, day_off_type, is_paid)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, FALSE, $12, $13, $14)",
        )
        .bind(Uuid::new_v4())
        .bind(shift.location_id)
        .bind(shift.user_id)
        .bind(shift.position_id)
        .bind(date)
        .bind(shift.start_time)
        .bind(shift.end_time)
        .bind(shift.break_minutes)
        .bind(&shift.notes)
        .bind(shift.status)
        .bind(shift.is_open_shift)
        .bind(shift.is_day_off)
        .bind(shift.day_off_type)
        .bind(shift.is_paid)
        .execute(&mut *tx)
        .await?;
        count += 1;
    }

    tx.commit().await?;

    Ok(Json(ShiftCountResponse {
        count,
        message: format!("Copied {} shifts", count),
    }))
}

/// POST /api/shifts/publish
///
/// Idempotent: only still-unpublished shifts count, so a second call over
/// the same range reports zero.
#[utoipa::path(
    post,
    path = "/api/shifts/publish",
    request_body = PublishShiftsInput,
    responses(
        (status = 200, description = "Newly published shift count", body = ShiftCountResponse)
    ),
    tag = "shifts"
)]
pub async fn publish_shifts(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(input): Json<PublishShiftsInput>,
) -> AppResult<Json<ShiftCountResponse>> {
    principal.require(Capability::BulkManageShifts)?;

    if !principal.scope().contains(input.location_id) {
        return Err(AppError::Forbidden(format!(
            "No access to location {}",
            input.location_id
        )));
    }

    let start = calendar::parse_date(&input.start_date)?;
    let end = calendar::parse_date(&input.end_date)?;

    let result = sqlx::query(
        "UPDATE shifts SET is_published = TRUE, updated_at = now()
         WHERE location_id = $1 AND date >= $2 AND date <= $3 AND is_published = FALSE",
    )
    .bind(input.location_id)
    .bind(start)
    .bind(end)
    .execute(&state.db)
    .await?;

    let count = result.rows_affected();
    Ok(Json(ShiftCountResponse {
        count,
        message: format!("Published {} shifts", count),
    }))
}

/// PUT /api/shifts/{id}
#[utoipa::path(
    put,
    path = "/api/shifts/{id}",
    params(("id" = Uuid, Path, description = "Shift id")),
    request_body = UpdateShiftInput,
    responses(
        (status = 200, description = "Updated shift", body = Shift),
        (status = 404, description = "Not found or out of scope")
    ),
    tag = "shifts"
)]
pub async fn update_shift(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateShiftInput>,
) -> AppResult<Json<Shift>> {
    principal.require(Capability::ManageShifts)?;

    let current = fetch_scoped(&state.db, &principal, id).await?;
    let patch = apply_update(&current, input)?;

    let shift = sqlx::query_as::<_, Shift>(
        "UPDATE shifts
         SET user_id = $1, position_id = $2, date = $3, start_time = $4, end_time = $5,
             break_minutes = $6, notes = $7, status = $8, is_open_shift = $9,
             is_published = $10, is_day_off = $11, day_off_type = $12, is_paid = $13,
             updated_at = now()
         WHERE id = $14
         RETURNING *",
    )
    .bind(patch.user_id)
    .bind(patch.position_id)
    .bind(patch.date)
    .bind(patch.start_time)
    .bind(patch.end_time)
    .bind(patch.break_minutes)
    .bind(&patch.notes)
    .bind(patch.status)
    .bind(patch.is_open_shift)
    .bind(patch.is_published)
    .bind(patch.is_day_off)
    .bind(patch.day_off_type)
    .bind(patch.is_paid)
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(shift))
}

/// POST /api/shifts/{id}/claim
///
/// The write is conditioned on the shift still being open and unassigned,
/// so of two concurrent claims exactly one wins; the loser gets a 409.
#[utoipa::path(
    post,
    path = "/api/shifts/{id}/claim",
    params(("id" = Uuid, Path, description = "Shift id")),
    responses(
        (status = 200, description = "Claimed shift", body = Shift),
        (status = 409, description = "Not open or already taken")
    ),
    tag = "shifts"
)]
pub async fn claim_shift(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Shift>> {
    let current = fetch_scoped(&state.db, &principal, id).await?;

    if !current.is_open_shift {
        return Err(AppError::Conflict("This shift is not open".to_string()));
    }

    let claimed = sqlx::query_as::<_, Shift>(
        "UPDATE shifts
         SET user_id = $1, is_open_shift = FALSE, status = $2, updated_at = now()
         WHERE id = $3 AND is_open_shift = TRUE AND user_id IS NULL
         RETURNING *",
    )
    .bind(principal.id)
    .bind(ShiftStatus::Confirmed)
    .bind(id)
    .fetch_optional(&state.db)
    .await?;

    claimed.map(Json).ok_or_else(|| {
        AppError::Conflict("This shift has already been taken".to_string())
    })
}

/// DELETE /api/shifts/{id} — hard delete, no history kept.
#[utoipa::path(
    delete,
    path = "/api/shifts/{id}",
    params(("id" = Uuid, Path, description = "Shift id")),
    responses(
        (status = 200, description = "Shift deleted"),
        (status = 404, description = "Not found or out of scope")
    ),
    tag = "shifts"
)]
pub async fn delete_shift(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    principal.require(Capability::ManageShifts)?;
    fetch_scoped(&state.db, &principal, id).await?;

    sqlx::query("DELETE FROM shifts WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    Ok(Json(serde_json::json!({ "message": "Shift deleted" })))
}
