use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "timesheet_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimesheetStatus {
    Pending,
    Submitted,
    Approved,
    Rejected,
}

/// One attendance record for one worker at one location on one calendar day.
///
/// `clock_out` null means the session is still open; `break_start` set with
/// `break_end` null means a break is in progress. `total_minutes` is
/// computed once, at clock-out.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Timesheet {
    pub id: Uuid,
    pub location_id: Uuid,
    pub user_id: Uuid,
    pub shift_id: Option<Uuid>,
    pub date: NaiveDate,
    pub clock_in: DateTime<Utc>,
    pub clock_out: Option<DateTime<Utc>>,
    pub break_start: Option<DateTime<Utc>>,
    pub break_end: Option<DateTime<Utc>>,
    pub total_minutes: Option<i32>,
    pub status: TimesheetStatus,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Timesheet plus display fields joined from user and location.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TimesheetWithDetails {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub timesheet: Timesheet,
    pub user_first_name: String,
    pub user_last_name: String,
    pub location_name: String,
}
