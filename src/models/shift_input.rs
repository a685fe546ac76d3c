use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::shift::{DayOffType, Shift, ShiftStatus};

/// Input DTO for creating a new shift or day-off marker.
///
/// Dates are strict `YYYY-MM-DD` strings and times `HH:MM[:SS]`; both are
/// validated before any write.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateShiftInput {
    pub location_id: Uuid,
    pub user_id: Option<Uuid>,
    pub position_id: Option<Uuid>,
    pub date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub break_minutes: Option<i32>,
    pub notes: Option<String>,
    pub is_open_shift: Option<bool>,
    pub is_day_off: Option<bool>,
    pub day_off_type: Option<DayOffType>,
    pub is_paid: Option<bool>,
}

/// Input DTO for updating an existing shift
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateShiftInput {
    pub user_id: Option<Uuid>,
    pub position_id: Option<Uuid>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub break_minutes: Option<i32>,
    pub notes: Option<String>,
    pub status: Option<ShiftStatus>,
    pub is_open_shift: Option<bool>,
    pub is_published: Option<bool>,
    pub is_day_off: Option<bool>,
    pub day_off_type: Option<DayOffType>,
    pub is_paid: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkCreateShiftsInput {
    pub shifts: Vec<CreateShiftInput>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BulkShiftsResponse {
    pub count: usize,
    pub shifts: Vec<Shift>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CopyWeekInput {
    pub location_id: Uuid,
    /// First day of the source week, `YYYY-MM-DD`.
    pub source_start_date: String,
    /// First day of the target week, `YYYY-MM-DD`.
    pub target_start_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublishShiftsInput {
    pub location_id: Uuid,
    pub start_date: String,
    pub end_date: String,
}

/// Count-bearing response for bulk publish/copy operations
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShiftCountResponse {
    pub count: u64,
    pub message: String,
}
