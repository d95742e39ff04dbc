use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::assignment_models::AssignmentStatus;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAssignmentRequest {
    pub module_id: Option<Uuid>,
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub weighting_percent: Option<f64>,
    #[validate(range(min = 0.0))]
    pub estimated_hours: Option<f64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAssignmentRequest {
    pub module_id: Option<Uuid>,
    #[validate(length(min = 1, max = 500))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub weighting_percent: Option<f64>,
    #[validate(range(min = 0.0))]
    pub estimated_hours: Option<f64>,
    pub status: Option<AssignmentStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAssignmentStatusRequest {
    pub status: AssignmentStatus,
}
