use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::location::Location;
use super::position::Position;
use super::shift::ShiftWithDetails;

/// Per-location rollup counts, computed fresh on every call.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct LocationStats {
    pub total_employees: i64,
    pub today_shifts: i64,
    pub clocked_in: i64,
    pub pending_requests: i64,
    pub open_shifts: i64,
    /// Shifts scheduled for tomorrow that are still unpublished.
    pub alerts: i64,
}

impl LocationStats {
    pub fn accumulate(&mut self, other: &LocationStats) {
        self.total_employees += other.total_employees;
        self.today_shifts += other.today_shifts;
        self.clocked_in += other.clocked_in;
        self.pending_requests += other.pending_requests;
        self.open_shifts += other.open_shifts;
        self.alerts += other.alerts;
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LocationOverview {
    #[serde(flatten)]
    pub location: Location,
    pub stats: LocationStats,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardOverview {
    pub locations: Vec<LocationOverview>,
    pub totals: LocationStats,
    pub can_view_all: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PositionStat {
    #[serde(flatten)]
    pub position: Position,
    pub employee_count: i64,
}

/// Scheduled-versus-worked rollup for one location over a date range.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LocationRangeStats {
    pub scheduled_hours: f64,
    pub worked_hours: f64,
    pub variance: f64,
    pub total_shifts: i64,
    pub position_stats: Vec<PositionStat>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TodayShiftsLocation {
    pub id: Uuid,
    pub name: String,
    pub is_headquarters: bool,
}

/// Today's shifts for one location, for the all-branches board.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TodayShiftsGroup {
    pub location: TodayShiftsLocation,
    pub shifts: Vec<ShiftWithDetails>,
}

/// One entry of the alert feed: an open shift coming up or a pending
/// time-off request.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AlertItem {
    #[serde(rename = "type")]
    pub alert_type: String,
    pub severity: String,
    pub message: String,
    pub date: DateTime<Utc>,
    pub location_id: Option<Uuid>,
    pub request_id: Option<Uuid>,
}
