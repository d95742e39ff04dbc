use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::preference_models::NotificationPreference;

pub const MAX_REMINDER_DAY: u32 = 365;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateNotificationPreferencesRequest {
    pub email_enabled: Option<bool>,
    #[validate(length(min = 1, max = 10), custom(function = "validate_reminder_days"))]
    pub reminder_days: Option<Vec<u32>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationPreferencesResponse {
    pub email_enabled: bool,
    pub reminder_days: Vec<u32>,
}

impl From<NotificationPreference> for NotificationPreferencesResponse {
    fn from(preference: NotificationPreference) -> Self {
        Self {
            email_enabled: preference.email_enabled,
            reminder_days: preference.reminder_offsets().days().to_vec(),
        }
    }
}

#[allow(clippy::ptr_arg)]
fn validate_reminder_days(days: &Vec<u32>) -> Result<(), ValidationError> {
    if days.iter().any(|&d| d > MAX_REMINDER_DAY) {
        return Err(ValidationError::new("reminder_day_out_of_range"));
    }
    Ok(())
}
