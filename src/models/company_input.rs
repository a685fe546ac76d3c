use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Input DTO for the one-time bootstrap of an empty database
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetupInput {
    pub company_name: String,
    pub timezone: Option<String>,
    pub currency: Option<String>,
    pub admin_email: String,
    pub admin_password: String,
    pub admin_first_name: String,
    pub admin_last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetupResponse {
    pub company_id: Uuid,
    pub location_id: Uuid,
    pub admin_id: Uuid,
    pub message: String,
}
