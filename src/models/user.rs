use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    SuperAdmin,
    Admin,
    Manager,
    Supervisor,
    Employee,
}

/// A worker or manager account.
///
/// The password hash and the kiosk PIN never leave the server: both fields
/// are skipped on serialization, so any response built from this struct is
/// already stripped.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub company_id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub role: UserRole,
    pub can_view_all: bool,
    #[serde(skip_serializing)]
    pub pin: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A user's location assignment, for embedding in user payloads.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserLocationEntry {
    pub location_id: Uuid,
    pub name: String,
    pub is_primary: bool,
}

/// A user's position assignment, for embedding in user payloads.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserPositionEntry {
    pub position_id: Uuid,
    pub name: String,
    pub color: String,
}

/// User plus their location and position assignments.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserWithAssignments {
    #[serde(flatten)]
    pub user: User,
    pub locations: Vec<UserLocationEntry>,
    pub positions: Vec<UserPositionEntry>,
}
