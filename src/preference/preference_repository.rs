use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use super::preference_models::NotificationPreference;

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<NotificationPreference>>;

    /// Returns the user's preferences, creating the default row if missing.
    async fn ensure_for_user(&self, user_id: Uuid) -> Result<NotificationPreference>;

    /// `None` keeps the stored value, or the column default for a new row.
    async fn upsert(
        &self,
        user_id: Uuid,
        email_enabled: Option<bool>,
        default_reminder_days: Option<&str>,
    ) -> Result<NotificationPreference>;
}

#[derive(Clone)]
pub struct PreferenceRepository {
    pool: PgPool,
}

impl PreferenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceStore for PreferenceRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<NotificationPreference>> {
        let preference = sqlx::query_as::<_, NotificationPreference>(
            "SELECT * FROM notification_preferences WHERE user_id = $1"
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(preference)
    }

    async fn ensure_for_user(&self, user_id: Uuid) -> Result<NotificationPreference> {
        let preference = sqlx::query_as::<_, NotificationPreference>(
            "INSERT INTO notification_preferences (user_id)
             VALUES ($1)
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
             RETURNING *"
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(preference)
    }

    async fn upsert(
        &self,
        user_id: Uuid,
        email_enabled: Option<bool>,
        default_reminder_days: Option<&str>,
    ) -> Result<NotificationPreference> {
        let preference = sqlx::query_as::<_, NotificationPreference>(
            "INSERT INTO notification_preferences (user_id, email_enabled, default_reminder_days)
             VALUES ($1, COALESCE($2, true), COALESCE($3, '7,2,1'))
             ON CONFLICT (user_id) DO UPDATE SET
                email_enabled = COALESCE($2, notification_preferences.email_enabled),
                default_reminder_days = COALESCE($3, notification_preferences.default_reminder_days),
                updated_at = NOW()
             RETURNING *"
        )
        .bind(user_id)
        .bind(email_enabled)
        .bind(default_reminder_days)
        .fetch_one(&self.pool)
        .await?;

        Ok(preference)
    }
}
