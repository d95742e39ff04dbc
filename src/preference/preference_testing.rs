//! In-memory preference store.

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use super::{preference_models::NotificationPreference, preference_repository::PreferenceStore};

const COLUMN_DEFAULT_DAYS: &str = "7,2,1";

#[derive(Default)]
pub struct InMemoryPreferenceStore {
    rows: Mutex<HashMap<Uuid, NotificationPreference>>,
    fail_queries: Mutex<bool>,
}

impl InMemoryPreferenceStore {
    pub fn set_days(&self, user_id: Uuid, days: &str) {
        let now = Utc::now();
        self.rows.lock().unwrap().insert(
            user_id,
            NotificationPreference {
                id: Uuid::new_v4(),
                user_id,
                email_enabled: true,
                default_reminder_days: Some(days.to_string()),
                created_at: now,
                updated_at: now,
            },
        );
    }

    pub fn fail_queries(&self, fail: bool) {
        *self.fail_queries.lock().unwrap() = fail;
    }

    pub fn has_row(&self, user_id: Uuid) -> bool {
        self.rows.lock().unwrap().contains_key(&user_id)
    }

    fn check(&self) -> Result<()> {
        if *self.fail_queries.lock().unwrap() {
            Err(AppError::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<NotificationPreference>> {
        self.check()?;
        Ok(self.rows.lock().unwrap().get(&user_id).cloned())
    }

    async fn ensure_for_user(&self, user_id: Uuid) -> Result<NotificationPreference> {
        self.upsert(user_id, None, None).await
    }

    async fn upsert(
        &self,
        user_id: Uuid,
        email_enabled: Option<bool>,
        default_reminder_days: Option<&str>,
    ) -> Result<NotificationPreference> {
        self.check()?;

        let now = Utc::now();
        let mut rows = self.rows.lock().unwrap();
        let row = rows.entry(user_id).or_insert_with(|| NotificationPreference {
            id: Uuid::new_v4(),
            user_id,
            email_enabled: true,
            default_reminder_days: Some(COLUMN_DEFAULT_DAYS.to_string()),
            created_at: now,
            updated_at: now,
        });

        if let Some(enabled) = email_enabled {
            row.email_enabled = enabled;
        }
        if let Some(days) = default_reminder_days {
            row.default_reminder_days = Some(days.to_string());
        }
        row.updated_at = now;

        Ok(row.clone())
    }
}
