use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

pub const DEFAULT_MODULE_COLOR: &str = "#3B82F6";

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateModuleRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 64))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub color: Option<String>,
    #[validate(length(max = 64))]
    pub icon: Option<String>,
    #[validate(range(min = 0, max = 1000))]
    pub credits: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateModuleRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 64))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub color: Option<String>,
    #[validate(length(max = 64))]
    pub icon: Option<String>,
    #[validate(range(min = 0, max = 1000))]
    pub credits: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteModuleQuery {
    /// Keep the module's assignments, detached from any module.
    #[serde(default)]
    pub unlink_only: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteModuleResponse {
    pub message: String,
}

impl DeleteModuleResponse {
    pub fn for_mode(unlink_only: bool) -> Self {
        let message = if unlink_only {
            "Module deleted successfully. Assignments have been unlinked."
        } else {
            "Module deleted successfully."
        };
        Self {
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentCountResponse {
    pub count: i64,
}
