use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A physical branch. At most one per company carries `is_headquarters`;
/// the handlers demote the previous one on promotion. `clock_token` is the
/// opaque kiosk entry credential for this branch.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Location {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Falls back to the company timezone when unset.
    pub timezone: Option<String>,
    pub is_headquarters: bool,
    pub is_active: bool,
    pub clock_token: String,
    pub created_at: DateTime<Utc>,
}
