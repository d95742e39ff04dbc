use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;

use super::assignment_models::{Assignment, AssignmentStatus, AssignmentWithModule};

#[derive(Clone)]
pub struct AssignmentRepository {
    pool: PgPool,
}

#[derive(Debug, Default)]
pub struct AssignmentFilters {
    pub status: Option<AssignmentStatus>,
    pub module_id: Option<Uuid>,
    /// Only assignments due within this many days from now.
    pub upcoming_days: Option<i32>,
}

pub struct NewAssignment<'a> {
    pub module_id: Option<Uuid>,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub due_date: DateTime<Utc>,
    pub weighting_percent: Option<f64>,
    pub estimated_hours: Option<f64>,
}

#[derive(Default)]
pub struct AssignmentChanges<'a> {
    pub module_id: Option<Uuid>,
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub due_date: Option<DateTime<Utc>>,
    pub weighting_percent: Option<f64>,
    pub estimated_hours: Option<f64>,
    pub status: Option<AssignmentStatus>,
}

/// Storage seam for assignment rows. Every lookup is scoped to the owner.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    async fn find_all(
        &self,
        user_id: Uuid,
        filters: AssignmentFilters,
    ) -> Result<Vec<AssignmentWithModule>>;

    async fn find_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<AssignmentWithModule>>;

    async fn module_belongs_to_user(&self, module_id: Uuid, user_id: Uuid) -> Result<bool>;

    async fn create(&self, user_id: Uuid, new: NewAssignment<'_>) -> Result<Assignment>;

    /// `None` fields keep their stored value.
    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: AssignmentChanges<'_>,
    ) -> Result<Option<Assignment>>;

    async fn update_status(
        &self,
        id: Uuid,
        user_id: Uuid,
        status: AssignmentStatus,
    ) -> Result<Option<Assignment>>;

    /// Reminder rows go with the assignment through `ON DELETE CASCADE`.
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<u64>;
}

const SELECT_WITH_MODULE: &str = "SELECT a.*, m.name AS module_name, m.code AS module_code
     FROM assignments a
     LEFT JOIN modules m ON a.module_id = m.id";

impl AssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssignmentStore for AssignmentRepository {
    async fn find_all(
        &self,
        user_id: Uuid,
        filters: AssignmentFilters,
    ) -> Result<Vec<AssignmentWithModule>> {
        let mut query = format!("{} WHERE a.user_id = $1", SELECT_WITH_MODULE);
        let mut params_count = 1;

        if filters.status.is_some() {
            params_count += 1;
            query.push_str(&format!(" AND a.status = ${}", params_count));
        }

        if filters.module_id.is_some() {
            params_count += 1;
            query.push_str(&format!(" AND a.module_id = ${}", params_count));
        }

        if filters.upcoming_days.is_some() {
            params_count += 1;
            query.push_str(&format!(
                " AND a.due_date BETWEEN NOW() AND NOW() + make_interval(days => ${})",
                params_count
            ));
        }

        query.push_str(" ORDER BY a.due_date ASC");

        let mut db_query = sqlx::query_as::<_, AssignmentWithModule>(&query).bind(user_id);

        if let Some(status) = filters.status {
            db_query = db_query.bind(status.as_str());
        }

        if let Some(module_id) = filters.module_id {
            db_query = db_query.bind(module_id);
        }

        if let Some(days) = filters.upcoming_days {
            db_query = db_query.bind(days);
        }

        let assignments = db_query.fetch_all(&self.pool).await?;
        Ok(assignments)
    }

    async fn find_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<AssignmentWithModule>> {
        let query = format!("{} WHERE a.id = $1 AND a.user_id = $2", SELECT_WITH_MODULE);
        let assignment = sqlx::query_as::<_, AssignmentWithModule>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(assignment)
    }

    async fn module_belongs_to_user(&self, module_id: Uuid, user_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM modules WHERE id = $1 AND user_id = $2)"
        )
        .bind(module_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create(&self, user_id: Uuid, new: NewAssignment<'_>) -> Result<Assignment> {
        let assignment = sqlx::query_as::<_, Assignment>(
            "INSERT INTO assignments
                (user_id, module_id, title, description, due_date, weighting_percent, estimated_hours)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *"
        )
        .bind(user_id)
        .bind(new.module_id)
        .bind(new.title)
        .bind(new.description)
        .bind(new.due_date)
        .bind(new.weighting_percent)
        .bind(new.estimated_hours)
        .fetch_one(&self.pool)
        .await?;

        Ok(assignment)
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: AssignmentChanges<'_>,
    ) -> Result<Option<Assignment>> {
        let assignment = sqlx::query_as::<_, Assignment>(
            "UPDATE assignments SET
                module_id = COALESCE($1, module_id),
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                due_date = COALESCE($4, due_date),
                weighting_percent = COALESCE($5, weighting_percent),
                estimated_hours = COALESCE($6, estimated_hours),
                status = COALESCE($7, status),
                completed_at = CASE
                    WHEN $7 = 'done' AND status <> 'done' THEN NOW()
                    WHEN $7 IS NOT NULL AND $7 <> 'done' THEN NULL
                    ELSE completed_at
                END,
                updated_at = NOW()
             WHERE id = $8 AND user_id = $9
             RETURNING *"
        )
        .bind(changes.module_id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.due_date)
        .bind(changes.weighting_percent)
        .bind(changes.estimated_hours)
        .bind(changes.status.map(|s| s.as_str()))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(assignment)
    }

    async fn update_status(
        &self,
        id: Uuid,
        user_id: Uuid,
        status: AssignmentStatus,
    ) -> Result<Option<Assignment>> {
        let assignment = sqlx::query_as::<_, Assignment>(
            "UPDATE assignments SET
                status = $1,
                completed_at = CASE WHEN $1 = 'done' THEN COALESCE(completed_at, NOW()) ELSE NULL END,
                updated_at = NOW()
             WHERE id = $2 AND user_id = $3
             RETURNING *"
        )
        .bind(status.as_str())
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(assignment)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM assignments WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
