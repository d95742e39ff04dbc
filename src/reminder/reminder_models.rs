use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReminderType {
    Email,
}

impl ReminderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderType::Email => "email",
        }
    }
}

impl std::fmt::Display for ReminderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ledger row: a scheduled or already-sent reminder for an assignment.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reminder {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub user_id: Uuid,
    pub remind_at: DateTime<Utc>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub reminder_type: String,
    pub sent: bool,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Assignment joined with its module, owner and preferences, as seen by a scan.
#[derive(Debug, Clone, FromRow)]
pub struct ReminderCandidate {
    pub assignment_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: DateTime<Utc>,
    pub estimated_hours: Option<f64>,
    pub weighting_percent: Option<f64>,
    pub module_name: Option<String>,
    pub user_id: Uuid,
    pub email: String,
    pub user_name: Option<String>,
    pub default_reminder_days: Option<String>,
}
