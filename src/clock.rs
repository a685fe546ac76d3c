//! Shared clock state machine behind self-service and kiosk attendance.
//!
//! Both surfaces run the same cycle (clock in, optional break, clock out);
//! they differ only in where the at-most-one-open-session rule applies,
//! which [`SessionScope`] captures. State-machine violations surface as
//! `AppError::Conflict`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, PgPool};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{ShiftStatus, Timesheet, TimesheetStatus};
use crate::{calendar, AppError};

/// Where the "one open session" rule applies.
#[derive(Debug, Clone, Copy)]
pub enum SessionScope {
    /// Self-service: one open session per worker across all locations.
    Worker { user_id: Uuid },
    /// Kiosk: one open session per worker, location and calendar day. A
    /// worker whose earlier session closed may start another the same day.
    LocationDay {
        user_id: Uuid,
        location_id: Uuid,
        date: NaiveDate,
    },
}

impl SessionScope {
    pub fn user_id(&self) -> Uuid {
        match *self {
            SessionScope::Worker { user_id } => user_id,
            SessionScope::LocationDay { user_id, .. } => user_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClockState {
    NotClockedIn,
    ClockedIn,
    OnBreak,
}

/// Derive the display state from the scope's most recent timesheet.
pub fn state_of(timesheet: Option<&Timesheet>) -> ClockState {
    match timesheet {
        None => ClockState::NotClockedIn,
        Some(t) if t.clock_out.is_some() => ClockState::NotClockedIn,
        Some(t) if t.break_start.is_some() && t.break_end.is_none() => ClockState::OnBreak,
        Some(_) => ClockState::ClockedIn,
    }
}

/// Minutes worked between clock-in and clock-out, minus the break. A break
/// still open at clock-out counts as ending at clock-out. Never negative.
pub fn worked_minutes(
    clock_in: DateTime<Utc>,
    clock_out: DateTime<Utc>,
    break_start: Option<DateTime<Utc>>,
    break_end: Option<DateTime<Utc>>,
) -> i32 {
    let mut minutes = (clock_out - clock_in).num_minutes();
    if let Some(start) = break_start {
        let end = break_end.unwrap_or(clock_out);
        minutes -= (end - start).num_minutes();
    }
    minutes.max(0) as i32
}

/// The scope's open session, if one exists.
pub async fn find_open_session(
    db: impl PgExecutor<'_>,
    scope: &SessionScope,
) -> Result<Option<Timesheet>, AppError> {
    let timesheet = match *scope {
        SessionScope::Worker { user_id } => {
            sqlx::query_as::<_, Timesheet>(
                "SELECT * FROM timesheets WHERE user_id = $1 AND clock_out IS NULL",
            )
            .bind(user_id)
            .fetch_optional(db)
            .await?
        }
        SessionScope::LocationDay {
            user_id,
            location_id,
            date,
        } => {
            sqlx::query_as::<_, Timesheet>(
                "SELECT * FROM timesheets
                 WHERE user_id = $1 AND location_id = $2 AND date = $3 AND clock_out IS NULL",
            )
            .bind(user_id)
            .bind(location_id)
            .bind(date)
            .fetch_optional(db)
            .await?
        }
    };
    Ok(timesheet)
}

/// The scope's most recent timesheet today, open or closed. Kiosk status
/// uses this to tell "never clocked in" from "already clocked out".
pub async fn find_latest_today(
    db: impl PgExecutor<'_>,
    user_id: Uuid,
    location_id: Uuid,
    date: NaiveDate,
) -> Result<Option<Timesheet>, AppError> {
    let timesheet = sqlx::query_as::<_, Timesheet>(
        "SELECT * FROM timesheets
         WHERE user_id = $1 AND location_id = $2 AND date = $3
         ORDER BY created_at DESC
         LIMIT 1",
    )
    .bind(user_id)
    .bind(location_id)
    .bind(date)
    .fetch_optional(db)
    .await?;
    Ok(timesheet)
}

/// Open a new session.
///
/// The worker's user row is locked for the duration of the transaction, so
/// two near-simultaneous clock-ins serialize and the second one fails the
/// open-session check instead of creating a duplicate.
pub async fn clock_in(
    db: &PgPool,
    scope: &SessionScope,
    location_id: Uuid,
    shift_id: Option<Uuid>,
) -> Result<Timesheet, AppError> {
    let mut tx = db.begin().await?;

    sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
        .bind(scope.user_id())
        .fetch_optional(&mut *tx)
        .await?;

    if find_open_session(&mut *tx, scope).await?.is_some() {
        return Err(AppError::Conflict(
            "An open session already exists. Clock out first.".to_string(),
        ));
    }

    let date = match *scope {
        SessionScope::Worker { .. } => calendar::today(),
        SessionScope::LocationDay { date, .. } => date,
    };

    let timesheet = sqlx::query_as::<_, Timesheet>(
        "INSERT INTO timesheets (id, location_id, user_id, shift_id, date, clock_in, status)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(location_id)
    .bind(scope.user_id())
    .bind(shift_id)
    .bind(date)
    .bind(Utc::now())
    .bind(TimesheetStatus::Pending)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(shift_id) = shift_id {
        sqlx::query("UPDATE shifts SET status = $1, updated_at = now() WHERE id = $2")
            .bind(ShiftStatus::InProgress)
            .bind(shift_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(timesheet)
}

/// Close the open session: auto-close a dangling break, compute the total,
/// submit the sheet and complete the linked shift.
pub async fn clock_out(db: &PgPool, scope: &SessionScope) -> Result<Timesheet, AppError> {
    let mut tx = db.begin().await?;

    let open = find_open_session(&mut *tx, scope)
        .await?
        .ok_or_else(|| AppError::Conflict("No open session".to_string()))?;

    let now = Utc::now();
    let break_end = match (open.break_start, open.break_end) {
        (Some(_), None) => Some(now),
        _ => open.break_end,
    };
    let total = worked_minutes(open.clock_in, now, open.break_start, break_end);

    let timesheet = sqlx::query_as::<_, Timesheet>(
        "UPDATE timesheets
         SET clock_out = $1, break_end = $2, total_minutes = $3, status = $4
         WHERE id = $5
         RETURNING *",
    )
    .bind(now)
    .bind(break_end)
    .bind(total)
    .bind(TimesheetStatus::Submitted)
    .bind(open.id)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(shift_id) = timesheet.shift_id {
        sqlx::query("UPDATE shifts SET status = $1, updated_at = now() WHERE id = $2")
            .bind(ShiftStatus::Completed)
            .bind(shift_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(timesheet)
}

/// Start a break on the open session. Only the most recent break is kept;
/// starting a new one after a closed break overwrites it.
pub async fn start_break(db: &PgPool, scope: &SessionScope) -> Result<Timesheet, AppError> {
    let open = find_open_session(db, scope)
        .await?
        .ok_or_else(|| AppError::Conflict("No open session".to_string()))?;

    if open.break_start.is_some() && open.break_end.is_none() {
        return Err(AppError::Conflict("A break is already in progress".to_string()));
    }

    // Guarded so a concurrent start cannot produce two open breaks
    sqlx::query_as::<_, Timesheet>(
        "UPDATE timesheets
         SET break_start = $1, break_end = NULL
         WHERE id = $2 AND clock_out IS NULL AND (break_start IS NULL OR break_end IS NOT NULL)
         RETURNING *",
    )
    .bind(Utc::now())
    .bind(open.id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::Conflict("A break is already in progress".to_string()))
}

/// End the break in progress on the open session.
pub async fn end_break(db: &PgPool, scope: &SessionScope) -> Result<Timesheet, AppError> {
    let open = find_open_session(db, scope)
        .await?
        .ok_or_else(|| AppError::Conflict("No open session".to_string()))?;

    if open.break_start.is_none() || open.break_end.is_some() {
        return Err(AppError::Conflict("No break in progress".to_string()));
    }

    sqlx::query_as::<_, Timesheet>(
        "UPDATE timesheets
         SET break_end = $1
         WHERE id = $2 AND clock_out IS NULL AND break_start IS NOT NULL AND break_end IS NULL
         RETURNING *",
    )
    .bind(Utc::now())
    .bind(open.id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::Conflict("No break in progress".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, hour, minute, 0).unwrap()
    }

    fn sheet(
        clock_out: Option<DateTime<Utc>>,
        break_start: Option<DateTime<Utc>>,
        break_end: Option<DateTime<Utc>>,
    ) -> Timesheet {
        Timesheet {
            id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            shift_id: None,
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            clock_in: at(8, 0),
            clock_out,
            break_start,
            break_end,
            total_minutes: None,
            status: TimesheetStatus::Pending,
            approved_by: None,
            approved_at: None,
            notes: None,
            created_at: at(8, 0),
        }
    }

    #[test]
    fn test_worked_minutes_with_break() {
        // 08:00-16:00 with a 12:00-12:30 break
        let total = worked_minutes(at(8, 0), at(16, 0), Some(at(12, 0)), Some(at(12, 30)));
        assert_eq!(total, 450);
    }

    #[test]
    fn test_worked_minutes_without_break() {
        assert_eq!(worked_minutes(at(8, 0), at(16, 0), None, None), 480);
    }

    #[test]
    fn test_worked_minutes_unterminated_break_counts_to_clock_out() {
        // Break started at 15:00 and never ended: treated as ending at 16:00
        let total = worked_minutes(at(8, 0), at(16, 0), Some(at(15, 0)), None);
        assert_eq!(total, 420);
    }

    #[test]
    fn test_worked_minutes_never_negative() {
        let total = worked_minutes(at(8, 0), at(8, 5), Some(at(8, 0)), Some(at(8, 30)));
        assert_eq!(total, 0);
    }

    #[test]
    fn test_state_no_timesheet() {
        assert_eq!(state_of(None), ClockState::NotClockedIn);
    }

    #[test]
    fn test_state_closed_session_allows_new_cycle() {
        let t = sheet(Some(at(12, 0)), None, None);
        assert_eq!(state_of(Some(&t)), ClockState::NotClockedIn);
    }

    #[test]
    fn test_state_open_session() {
        let t = sheet(None, None, None);
        assert_eq!(state_of(Some(&t)), ClockState::ClockedIn);
    }

    #[test]
    fn test_state_on_break() {
        let t = sheet(None, Some(at(12, 0)), None);
        assert_eq!(state_of(Some(&t)), ClockState::OnBreak);
    }

    #[test]
    fn test_state_after_break_ends() {
        let t = sheet(None, Some(at(12, 0)), Some(at(12, 30)));
        assert_eq!(state_of(Some(&t)), ClockState::ClockedIn);
    }

    #[test]
    fn test_scope_user_id() {
        let user_id = Uuid::new_v4();
        let scope = SessionScope::LocationDay {
            user_id,
            location_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
        };
        assert_eq!(scope.user_id(), user_id);
    }
}
