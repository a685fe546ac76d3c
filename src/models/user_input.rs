use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::{UserRole, UserWithAssignments};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserWithAssignments,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

/// Input DTO for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub pin: Option<String>,
    pub role: Option<UserRole>,
    pub can_view_all: Option<bool>,
    /// At least one; the first becomes the primary location.
    pub location_ids: Vec<Uuid>,
    pub position_ids: Option<Vec<Uuid>>,
}

/// Input DTO for updating an existing user. An empty-string PIN clears it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub pin: Option<String>,
    pub is_active: Option<bool>,
    pub role: Option<UserRole>,
    pub can_view_all: Option<bool>,
    pub location_ids: Option<Vec<Uuid>>,
    pub position_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SuccessResponse {
    pub message: String,
}
