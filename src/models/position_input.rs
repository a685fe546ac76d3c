use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Input DTO for creating a new position
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePositionInput {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub hourly_rate: Option<f64>,
}

/// Input DTO for updating an existing position
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdatePositionInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub hourly_rate: Option<f64>,
    pub is_active: Option<bool>,
}
