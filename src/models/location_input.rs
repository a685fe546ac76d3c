use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Input DTO for creating a new location
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateLocationInput {
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub timezone: Option<String>,
    pub is_headquarters: Option<bool>,
}

/// Input DTO for updating an existing location
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateLocationInput {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub timezone: Option<String>,
    pub is_headquarters: Option<bool>,
    pub is_active: Option<bool>,
}
