use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    calendar,
    extractors::Principal,
    models::{
        AlertItem, DashboardOverview, Location, LocationOverview, LocationRangeStats,
        LocationStats, Position, PositionStat, ShiftStatus, ShiftWithDetails, TimeOffStatus,
        TodayShiftsGroup, TodayShiftsLocation,
    },
    AppError, AppResult, AppState,
};

/// Open shifts are surfaced this many days ahead.
const OPEN_SHIFT_WINDOW_DAYS: u64 = 7;

async fn scoped_locations(
    db: &sqlx::PgPool,
    principal: &Principal,
) -> AppResult<Vec<Location>> {
    let locations = match principal.scope().as_filter() {
        None => {
            sqlx::query_as::<_, Location>(
                "SELECT * FROM locations
                 WHERE company_id = $1 AND is_active = TRUE
                 ORDER BY is_headquarters DESC, name",
            )
            .bind(principal.company_id)
            .fetch_all(db)
            .await?
        }
        Some(ids) => {
            sqlx::query_as::<_, Location>(
                "SELECT * FROM locations
                 WHERE company_id = $1 AND is_active = TRUE AND id = ANY($2)
                 ORDER BY is_headquarters DESC, name",
            )
            .bind(principal.company_id)
            .bind(&ids)
            .fetch_all(db)
            .await?
        }
    };
    Ok(locations)
}

/// One location's rollup, computed fresh: no caching, staleness tolerance
/// is the next page load.
async fn location_stats(
    db: &sqlx::PgPool,
    location_id: Uuid,
    today: NaiveDate,
) -> AppResult<LocationStats> {
    let tomorrow = today + chrono::Days::new(1);
    let window_end = today + chrono::Days::new(OPEN_SHIFT_WINDOW_DAYS);

    let total_employees: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM user_locations ul
         JOIN users u ON u.id = ul.user_id
         WHERE ul.location_id = $1 AND u.is_active = TRUE",
    )
    .bind(location_id)
    .fetch_one(db)
    .await?;

    let today_shifts: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM shifts
         WHERE location_id = $1 AND date = $2 AND is_day_off = FALSE AND status != $3",
    )
    .bind(location_id)
    .bind(today)
    .bind(ShiftStatus::Cancelled)
    .fetch_one(db)
    .await?;

    let clocked_in: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM timesheets
         WHERE location_id = $1 AND date = $2 AND clock_out IS NULL",
    )
    .bind(location_id)
    .bind(today)
    .fetch_one(db)
    .await?;

    let pending_requests: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM time_off_requests r
         WHERE r.status = $1 AND EXISTS (
             SELECT 1 FROM user_locations ul
             WHERE ul.user_id = r.user_id AND ul.location_id = $2
         )",
    )
    .bind(TimeOffStatus::Pending)
    .bind(location_id)
    .fetch_one(db)
    .await?;

    let open_shifts: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM shifts
         WHERE location_id = $1 AND is_open_shift = TRUE AND user_id IS NULL
           AND date >= $2 AND date <= $3 AND status != $4",
    )
    .bind(location_id)
    .bind(today)
    .bind(window_end)
    .bind(ShiftStatus::Cancelled)
    .fetch_one(db)
    .await?;

    let alerts: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM shifts
         WHERE location_id = $1 AND date = $2 AND is_published = FALSE AND status != $3",
    )
    .bind(location_id)
    .bind(tomorrow)
    .bind(ShiftStatus::Cancelled)
    .fetch_one(db)
    .await?;

    Ok(LocationStats {
        total_employees,
        today_shifts,
        clocked_in,
        pending_requests,
        open_shifts,
        alerts,
    })
}

/// GET /api/dashboard/overview
#[utoipa::path(
    get,
    path = "/api/dashboard/overview",
    responses(
        (status = 200, description = "Per-location rollups plus company totals", body = DashboardOverview)
    ),
    tag = "dashboard"
)]
pub async fn get_overview(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> AppResult<Json<DashboardOverview>> {
    let today = calendar::today();
    let sees_all = principal.scope().sees_all();

    let mut locations = Vec::new();
    let mut totals = LocationStats::default();
    for location in scoped_locations(&state.db, &principal).await? {
        let stats = location_stats(&state.db, location.id, today).await?;
        totals.accumulate(&stats);
        locations.push(LocationOverview { location, stats });
    }

    Ok(Json(DashboardOverview {
        locations,
        totals,
        can_view_all: sees_all,
    }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RangeStatsQuery {
    pub start_date: String,
    pub end_date: String,
}

#[derive(sqlx::FromRow)]
struct ScheduledShiftRow {
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    break_minutes: i32,
}

/// GET /api/dashboard/location/{id}/stats
///
/// Scheduled-versus-worked hours over a range. Scheduled time comes from
/// the rostered times of day (cross-midnight aware); worked time from the
/// recorded timesheet totals.
#[utoipa::path(
    get,
    path = "/api/dashboard/location/{id}/stats",
    params(
        ("id" = Uuid, Path, description = "Location id"),
        RangeStatsQuery
    ),
    responses(
        (status = 200, description = "Range rollup for the location", body = LocationRangeStats),
        (status = 404, description = "Not found or out of scope")
    ),
    tag = "dashboard"
)]
pub async fn get_location_range_stats(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Query(query): Query<RangeStatsQuery>,
) -> AppResult<Json<LocationRangeStats>> {
    if !principal.scope().contains(id) {
        return Err(AppError::NotFound("Location not found".to_string()));
    }

    let start = calendar::parse_date(&query.start_date)?;
    let end = calendar::parse_date(&query.end_date)?;

    let shifts: Vec<ScheduledShiftRow> = sqlx::query_as(
        "SELECT start_time, end_time, break_minutes FROM shifts
         WHERE location_id = $1 AND date >= $2 AND date <= $3
           AND is_day_off = FALSE AND status != $4",
    )
    .bind(id)
    .bind(start)
    .bind(end)
    .bind(ShiftStatus::Cancelled)
    .fetch_all(&state.db)
    .await?;

    let total_shifts = shifts.len() as i64;
    let scheduled_minutes: i64 = shifts
        .iter()
        .filter_map(|s| match (s.start_time, s.end_time) {
            (Some(start), Some(end)) => {
                Some((calendar::shift_duration_minutes(start, end) - i64::from(s.break_minutes)).max(0))
            }
            _ => None,
        })
        .sum();

    let worked_minutes: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(total_minutes), 0)::BIGINT FROM timesheets
         WHERE location_id = $1 AND date >= $2 AND date <= $3 AND total_minutes IS NOT NULL",
    )
    .bind(id)
    .bind(start)
    .bind(end)
    .fetch_one(&state.db)
    .await?;

    #[derive(sqlx::FromRow)]
    struct PositionCountRow {
        #[sqlx(flatten)]
        position: Position,
        employee_count: i64,
    }

    let position_stats: Vec<PositionCountRow> = sqlx::query_as(
        "SELECT p.*, COUNT(DISTINCT s.user_id) AS employee_count
         FROM positions p
         JOIN shifts s ON s.position_id = p.id
         WHERE s.location_id = $1 AND s.date >= $2 AND s.date <= $3 AND s.user_id IS NOT NULL
         GROUP BY p.id
         ORDER BY p.name",
    )
    .bind(id)
    .bind(start)
    .bind(end)
    .fetch_all(&state.db)
    .await?;

    let scheduled_hours = scheduled_minutes as f64 / 60.0;
    let worked_hours = worked_minutes as f64 / 60.0;

    Ok(Json(LocationRangeStats {
        scheduled_hours,
        worked_hours,
        variance: worked_hours - scheduled_hours,
        total_shifts,
        position_stats: position_stats
            .into_iter()
            .map(|row| PositionStat {
                position: row.position,
                employee_count: row.employee_count,
            })
            .collect(),
    }))
}

/// GET /api/dashboard/today-shifts
#[utoipa::path(
    get,
    path = "/api/dashboard/today-shifts",
    responses(
        (status = 200, description = "Today's shifts grouped per location", body = Vec<TodayShiftsGroup>)
    ),
    tag = "dashboard"
)]
pub async fn get_today_shifts(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> AppResult<Json<Vec<TodayShiftsGroup>>> {
    let today = calendar::today();

    let mut groups = Vec::new();
    for location in scoped_locations(&state.db, &principal).await? {
        let shifts = sqlx::query_as::<_, ShiftWithDetails>(
            "SELECT s.*, l.name AS location_name,
                    u.first_name AS user_first_name, u.last_name AS user_last_name,
                    u.avatar AS user_avatar,
                    p.name AS position_name, p.color AS position_color
             FROM shifts s
             JOIN locations l ON l.id = s.location_id
             LEFT JOIN users u ON u.id = s.user_id
             LEFT JOIN positions p ON p.id = s.position_id
             WHERE s.location_id = $1 AND s.date = $2 AND s.status != $3
             ORDER BY s.start_time NULLS LAST",
        )
        .bind(location.id)
        .bind(today)
        .bind(ShiftStatus::Cancelled)
        .fetch_all(&state.db)
        .await?;

        groups.push(TodayShiftsGroup {
            location: TodayShiftsLocation {
                id: location.id,
                name: location.name,
                is_headquarters: location.is_headquarters,
            },
            shifts,
        });
    }

    Ok(Json(groups))
}

/// GET /api/dashboard/alerts
///
/// The attention feed: upcoming open shifts and pending time-off
/// requests inside the caller's scope.
#[utoipa::path(
    get,
    path = "/api/dashboard/alerts",
    responses(
        (status = 200, description = "Alert feed", body = Vec<AlertItem>)
    ),
    tag = "dashboard"
)]
pub async fn get_alerts(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> AppResult<Json<Vec<AlertItem>>> {
    let today = calendar::today();
    let window_end = today + chrono::Days::new(OPEN_SHIFT_WINDOW_DAYS);
    let mut alerts = Vec::new();

    #[derive(sqlx::FromRow)]
    struct OpenShiftRow {
        location_id: Uuid,
        location_name: String,
        date: NaiveDate,
        open_count: i64,
    }

    let mut builder = sqlx::QueryBuilder::new(
        "SELECT s.location_id, l.name AS location_name, s.date, COUNT(*) AS open_count
         FROM shifts s
         JOIN locations l ON l.id = s.location_id
         WHERE l.company_id = ",
    );
    builder.push_bind(principal.company_id);
    builder
        .push(" AND s.is_open_shift = TRUE AND s.user_id IS NULL AND s.date >= ")
        .push_bind(today)
        .push(" AND s.date <= ")
        .push_bind(window_end)
        .push(" AND s.status != ")
        .push_bind(ShiftStatus::Cancelled);
    if let Some(ids) = principal.scope().as_filter() {
        builder.push(" AND s.location_id = ANY(").push_bind(ids).push(")");
    }
    builder.push(" GROUP BY s.location_id, l.name, s.date ORDER BY s.date");

    let open_rows: Vec<OpenShiftRow> = builder.build_query_as().fetch_all(&state.db).await?;
    for row in open_rows {
        alerts.push(AlertItem {
            alert_type: "open_shifts".to_string(),
            severity: "warning".to_string(),
            message: format!(
                "{} open shift(s) at {} on {}",
                row.open_count, row.location_name, row.date
            ),
            date: Utc::now(),
            location_id: Some(row.location_id),
            request_id: None,
        });
    }

    #[derive(sqlx::FromRow)]
    struct PendingRequestRow {
        id: Uuid,
        first_name: String,
        last_name: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
    }

    let mut builder = sqlx::QueryBuilder::new(
        "SELECT r.id, u.first_name, u.last_name, r.start_date, r.end_date
         FROM time_off_requests r
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
    builder.push(" ORDER BY r.created_at");

    let pending_rows: Vec<PendingRequestRow> =
        builder.build_query_as().fetch_all(&state.db).await?;
    for row in pending_rows {
        alerts.push(AlertItem {
            alert_type: "pending_time_off".to_string(),
            severity: "info".to_string(),
            message: format!(
                "{} {} requested time off {} to {}",
                row.first_name, row.last_name, row.start_date, row.end_date
            ),
            date: Utc::now(),
            location_id: None,
            request_id: Some(row.id),
        });
    }

    Ok(Json(alerts))
}
