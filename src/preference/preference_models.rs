use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::reminder::ReminderOffsets;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct NotificationPreference {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email_enabled: bool,
    /// Comma-separated day offsets, e.g. `7,2,1`.
    pub default_reminder_days: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NotificationPreference {
    pub fn reminder_offsets(&self) -> ReminderOffsets {
        ReminderOffsets::from_stored(self.default_reminder_days.as_deref())
    }
}
