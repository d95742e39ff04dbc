use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use super::{
    module_dto::{CreateModuleRequest, UpdateModuleRequest, DEFAULT_MODULE_COLOR},
    module_models::Module,
};

#[derive(Clone)]
pub struct ModuleRepository {
    pool: PgPool,
}

impl ModuleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_all(&self, user_id: Uuid) -> Result<Vec<Module>> {
        let modules = sqlx::query_as::<_, Module>(
            "SELECT * FROM modules WHERE user_id = $1 ORDER BY name ASC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(modules)
    }

    pub async fn find_by_id(&self, id: Uuid, user_id: Uuid) -> Result<Option<Module>> {
        let module = sqlx::query_as::<_, Module>(
            "SELECT * FROM modules WHERE id = $1 AND user_id = $2"
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(module)
    }

    pub async fn create(&self, user_id: Uuid, payload: &CreateModuleRequest) -> Result<Module> {
        let module = sqlx::query_as::<_, Module>(
            "INSERT INTO modules (user_id, name, code, color, icon, credits)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *"
        )
        .bind(user_id)
        .bind(&payload.name)
        .bind(&payload.code)
        .bind(payload.color.as_deref().unwrap_or(DEFAULT_MODULE_COLOR))
        .bind(&payload.icon)
        .bind(payload.credits)
        .fetch_one(&self.pool)
        .await?;

        Ok(module)
    }

    pub async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        payload: &UpdateModuleRequest,
    ) -> Result<Option<Module>> {
        let module = sqlx::query_as::<_, Module>(
            "UPDATE modules SET
                name = COALESCE($1, name),
                code = COALESCE($2, code),
                color = COALESCE($3, color),
                icon = COALESCE($4, icon),
                credits = COALESCE($5, credits),
                updated_at = NOW()
             WHERE id = $6 AND user_id = $7
             RETURNING *"
        )
        .bind(&payload.name)
        .bind(&payload.code)
        .bind(&payload.color)
        .bind(&payload.icon)
        .bind(payload.credits)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(module)
    }

    pub async fn count_assignments(&self, id: Uuid, user_id: Uuid) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM assignments WHERE module_id = $1 AND user_id = $2"
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Without `unlink_only` the module's assignments, and through them their
    /// reminders, are deleted by `ON DELETE CASCADE`.
    pub async fn delete(&self, id: Uuid, user_id: Uuid, unlink_only: bool) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        if unlink_only {
            sqlx::query("UPDATE assignments SET module_id = NULL WHERE module_id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        let result = sqlx::query("DELETE FROM modules WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }
}
