use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{error::Result, state::AppState};
use super::reminder_models::Reminder;

#[derive(Debug, Serialize, ToSchema)]
pub struct TriggerResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run the deadline scan immediately
#[utoipa::path(
    post,
    path = "/api/reminders/trigger",
    responses(
        (status = 200, description = "Reminder check completed", body = TriggerResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Reminder check failed", body = TriggerResponse)
    ),
    tag = "reminders",
    security(("bearer_auth" = []))
)]
pub async fn trigger_reminders(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
) -> (StatusCode, Json<TriggerResponse>) {
    tracing::info!(%user_id, "Manual reminder check triggered");

    if state.reminder_scheduler.trigger().await {
        (
            StatusCode::OK,
            Json(TriggerResponse {
                success: true,
                message: Some(
                    "Manual reminder check completed. Check server logs for details.".to_string(),
                ),
                error: None,
            }),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(TriggerResponse {
                success: false,
                message: None,
                error: Some("Failed to trigger reminder check".to_string()),
            }),
        )
    }
}

/// List ledger entries for one of the caller's assignments
#[utoipa::path(
    get,
    path = "/api/assignments/{id}/reminders",
    params(
        ("id" = Uuid, Path, description = "Assignment ID")
    ),
    responses(
        (status = 200, description = "Scheduled and sent reminders", body = Vec<Reminder>),
        (status = 404, description = "Assignment not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "reminders",
    security(("bearer_auth" = []))
)]
pub async fn get_assignment_reminders(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(assignment_id): Path<Uuid>,
) -> Result<Json<Vec<Reminder>>> {
    let found = state.assignment_service.get_assignment(user_id, assignment_id).await?;
    let reminders = state
        .reminder_store
        .find_by_assignment(found.assignment.id)
        .await?;

    Ok(Json(reminders))
}
