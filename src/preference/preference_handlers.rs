use axum::{extract::State, Extension, Json};
use uuid::Uuid;
use validator::Validate;

use crate::{error::Result, reminder::ReminderOffsets, state::AppState};
use super::preference_dto::{NotificationPreferencesResponse, UpdateNotificationPreferencesRequest};

/// Get reminder preferences
#[utoipa::path(
    get,
    path = "/api/preferences",
    responses(
        (status = 200, description = "Current preferences", body = NotificationPreferencesResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "preferences",
    security(("bearer_auth" = []))
)]
pub async fn get_preferences(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<NotificationPreferencesResponse>> {
    let preference = state.preference_store.ensure_for_user(user_id).await?;
    Ok(Json(preference.into()))
}

/// Update reminder preferences
#[utoipa::path(
    put,
    path = "/api/preferences",
    request_body = UpdateNotificationPreferencesRequest,
    responses(
        (status = 200, description = "Preferences updated", body = NotificationPreferencesResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "preferences",
    security(("bearer_auth" = []))
)]
pub async fn update_preferences(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Json(payload): Json<UpdateNotificationPreferencesRequest>,
) -> Result<Json<NotificationPreferencesResponse>> {
    payload.validate()?;

    let reminder_days = payload
        .reminder_days
        .and_then(ReminderOffsets::new)
        .map(|offsets| offsets.to_string());

    let preference = state
        .preference_store
        .upsert(user_id, payload.email_enabled, reminder_days.as_deref())
        .await?;

    Ok(Json(preference.into()))
}
