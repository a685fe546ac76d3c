use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::shift::DayOffType;
use super::time_off::TimeOffRequest;

/// Input DTO for filing a time-off request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTimeOffInput {
    #[serde(rename = "type")]
    pub request_type: DayOffType,
    pub start_date: String,
    pub end_date: String,
    pub reason: Option<String>,
}

/// Created request plus a heads-up about shifts already scheduled inside
/// the requested range.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateTimeOffResponse {
    #[serde(flatten)]
    pub request: TimeOffRequest,
    pub has_conflicts: bool,
    pub conflicting_shifts_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RejectTimeOffInput {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PendingCountResponse {
    pub count: i64,
}
