use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::timesheet::Timesheet;
use crate::clock::ClockState;

/// Branch details shown on the kiosk landing screen
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct KioskLocationInfo {
    pub id: Uuid,
    pub name: String,
    pub company_name: String,
    pub timezone: String,
}

/// Kiosk employee picker entry. Carries whether a PIN is required, never
/// the PIN itself.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct KioskEmployee {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub has_pin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyPinInput {
    pub employee_id: Uuid,
    pub pin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyPinResponse {
    pub valid: bool,
    pub message: String,
}

/// Input DTO for kiosk clock and break actions. The PIN must be present
/// whenever the employee has one configured.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KioskActionInput {
    pub employee_id: Uuid,
    pub pin: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct KioskStatusResponse {
    pub status: ClockState,
    pub can_clock_in: bool,
    pub timesheet: Option<Timesheet>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct KioskActionResponse {
    pub message: String,
    pub employee_first_name: String,
    pub employee_last_name: String,
    pub timesheet: Timesheet,
}

/// One row of the kiosk's "today" activity feed
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct KioskTodayEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub clock_in: DateTime<Utc>,
    pub clock_out: Option<DateTime<Utc>>,
    pub break_start: Option<DateTime<Utc>>,
    pub break_end: Option<DateTime<Utc>>,
    pub total_minutes: Option<i32>,
}
