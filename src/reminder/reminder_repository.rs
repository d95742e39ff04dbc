use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use super::{
    reminder_models::{Reminder, ReminderCandidate, ReminderType},
    reminder_policy::{future_remind_times, ReminderOffsets},
};

/// Window in which a sent reminder suppresses any further send for the
/// same assignment.
pub const RECENT_SEND_WINDOW_HOURS: i64 = 24;

/// Storage seam for the reminder ledger and the scan's candidate query.
///
/// Every call is a single atomic statement; nothing here spans rows in a
/// transaction.
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Assignments not done, owned by users with email enabled, due in
    /// `(now, horizon]`, and without a send in the last 24h. Ascending due date.
    /// Users without a preference row count as enabled with default offsets.
    async fn find_candidates(
        &self,
        now: DateTime<Utc>,
        horizon: DateTime<Utc>,
    ) -> Result<Vec<ReminderCandidate>>;

    async fn has_recent_send(&self, assignment_id: Uuid, now: DateTime<Utc>) -> Result<bool>;

    async fn record_send(
        &self,
        assignment_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Reminder>;

    /// Drops every unsent row for the assignment. Sent rows are kept.
    async fn invalidate_unsent(&self, assignment_id: Uuid) -> Result<u64>;

    async fn schedule_future(
        &self,
        assignment_id: Uuid,
        user_id: Uuid,
        due_date: DateTime<Utc>,
        offsets: &ReminderOffsets,
        now: DateTime<Utc>,
    ) -> Result<Vec<Reminder>>;

    async fn find_by_assignment(&self, assignment_id: Uuid) -> Result<Vec<Reminder>>;
}

#[derive(Clone)]
pub struct PgReminderStore {
    pool: PgPool,
}

impl PgReminderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReminderStore for PgReminderStore {
    async fn find_candidates(
        &self,
        now: DateTime<Utc>,
        horizon: DateTime<Utc>,
    ) -> Result<Vec<ReminderCandidate>> {
        let candidates = sqlx::query_as::<_, ReminderCandidate>(
            "SELECT
                a.id AS assignment_id,
                a.title,
                a.description,
                a.due_date,
                a.estimated_hours,
                a.weighting_percent,
                m.name AS module_name,
                u.id AS user_id,
                u.email,
                u.name AS user_name,
                np.default_reminder_days
             FROM assignments a
             LEFT JOIN modules m ON a.module_id = m.id
             JOIN users u ON a.user_id = u.id
             LEFT JOIN notification_preferences np ON u.id = np.user_id
             WHERE a.status <> 'done'
               AND COALESCE(np.email_enabled, true) = true
               AND a.due_date > $1
               AND a.due_date <= $2
               AND NOT EXISTS (
                   SELECT 1 FROM reminders r
                   WHERE r.assignment_id = a.id
                     AND r.sent = true
                     AND r.sent_at > $3
               )
             ORDER BY a.due_date ASC"
        )
        .bind(now)
        .bind(horizon)
        .bind(now - Duration::hours(RECENT_SEND_WINDOW_HOURS))
        .fetch_all(&self.pool)
        .await?;

        Ok(candidates)
    }

    async fn has_recent_send(&self, assignment_id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM reminders
                WHERE assignment_id = $1 AND sent = true AND sent_at > $2
             )"
        )
        .bind(assignment_id)
        .bind(now - Duration::hours(RECENT_SEND_WINDOW_HOURS))
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn record_send(
        &self,
        assignment_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Reminder> {
        let reminder = sqlx::query_as::<_, Reminder>(
            "INSERT INTO reminders (assignment_id, user_id, remind_at, type, sent, sent_at)
             VALUES ($1, $2, $3, $4, true, $3)
             RETURNING *"
        )
        .bind(assignment_id)
        .bind(user_id)
        .bind(now)
        .bind(ReminderType::Email.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(reminder)
    }

    async fn invalidate_unsent(&self, assignment_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM reminders WHERE assignment_id = $1 AND sent = false")
            .bind(assignment_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn schedule_future(
        &self,
        assignment_id: Uuid,
        user_id: Uuid,
        due_date: DateTime<Utc>,
        offsets: &ReminderOffsets,
        now: DateTime<Utc>,
    ) -> Result<Vec<Reminder>> {
        let mut reminders = Vec::new();

        for (_, remind_at) in future_remind_times(due_date, offsets, now) {
            let reminder = sqlx::query_as::<_, Reminder>(
                "INSERT INTO reminders (assignment_id, user_id, remind_at, type)
                 VALUES ($1, $2, $3, $4)
                 RETURNING *"
            )
            .bind(assignment_id)
            .bind(user_id)
            .bind(remind_at)
            .bind(ReminderType::Email.as_str())
            .fetch_one(&self.pool)
            .await?;

            reminders.push(reminder);
        }

        Ok(reminders)
    }

    async fn find_by_assignment(&self, assignment_id: Uuid) -> Result<Vec<Reminder>> {
        let reminders = sqlx::query_as::<_, Reminder>(
            "SELECT * FROM reminders WHERE assignment_id = $1 ORDER BY remind_at ASC"
        )
        .bind(assignment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reminders)
    }
}
