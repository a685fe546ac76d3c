use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::shift::DayOffType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "time_off_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeOffStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

/// A date-ranged absence request. Approval cancels the worker's shifts in
/// the range; requests are never deleted, only moved to a terminal status.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TimeOffRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub request_type: DayOffType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub status: TimeOffStatus,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request plus requester and approver display fields.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TimeOffWithUser {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub request: TimeOffRequest,
    pub user_first_name: String,
    pub user_last_name: String,
    pub user_email: String,
    pub primary_location_name: Option<String>,
    pub approver_first_name: Option<String>,
    pub approver_last_name: Option<String>,
}
