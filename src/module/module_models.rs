use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A course module grouping assignments. Its name appears in reminder emails.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Module {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub code: Option<String>,
    pub color: String,
    pub icon: Option<String>,
    pub credits: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
