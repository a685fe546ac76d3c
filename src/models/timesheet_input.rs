use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::timesheet::Timesheet;
use crate::clock::ClockState;

/// Input DTO for self-service clock-in
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClockInInput {
    pub location_id: Uuid,
    /// Optional link to the scheduled shift being worked.
    pub shift_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RejectTimesheetInput {
    pub reason: Option<String>,
}

/// Current clock state plus the open timesheet, if any.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimesheetStatusResponse {
    pub status: ClockState,
    pub timesheet: Option<Timesheet>,
}
