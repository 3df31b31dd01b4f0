use async_trait::async_trait;

use super::{query_timeout::QueryTimeout, DBClient};
use crate::{models::taskmodel::Task, service::error::LedgerError};

/// Tasks are seeded by migrations; the write methods exist for
/// administrative provisioning.
#[async_trait]
pub trait TaskExt {
    /// Looks a task up whether or not it is active.
    async fn get_task_by_code(&self, code: &str) -> Result<Option<Task>, LedgerError>;

    async fn save_task(
        &self,
        code: &str,
        name: &str,
        points: i32,
        active: bool,
    ) -> Result<Task, LedgerError>;

    async fn update_task_points(&self, task_id: i64, points: i32) -> Result<Task, LedgerError>;

    async fn set_task_active(&self, task_id: i64, active: bool) -> Result<Task, LedgerError>;
}

#[async_trait]
impl TaskExt for DBClient {
    async fn get_task_by_code(&self, code: &str) -> Result<Option<Task>, LedgerError> {
        QueryTimeout::run(
            self.query_timeout(),
            sqlx::query_as::<_, Task>(
                r#"
                SELECT id, code, name, points, active, created_at
                FROM tasks
                WHERE code = $1
                "#,
            )
            .bind(code)
            .fetch_optional(self.pool()),
        )
        .await
    }

    async fn save_task(
        &self,
        code: &str,
        name: &str,
        points: i32,
        active: bool,
    ) -> Result<Task, LedgerError> {
        QueryTimeout::run(
            self.query_timeout(),
            sqlx::query_as::<_, Task>(
                r#"
                INSERT INTO tasks (code, name, points, active)
                VALUES ($1, $2, $3, $4)
                RETURNING id, code, name, points, active, created_at
                "#,
            )
            .bind(code)
            .bind(name)
            .bind(points)
            .bind(active)
            .fetch_one(self.pool()),
        )
        .await
        .map_err(|e| match e {
            LedgerError::Conflict(_) => {
                LedgerError::Conflict(format!("task code {:?} already exists", code))
            }
            other => other,
        })
    }

    async fn update_task_points(&self, task_id: i64, points: i32) -> Result<Task, LedgerError> {
        QueryTimeout::run(
            self.query_timeout(),
            sqlx::query_as::<_, Task>(
                r#"
                UPDATE tasks
                SET points = $2
                WHERE id = $1
                RETURNING id, code, name, points, active, created_at
                "#,
            )
            .bind(task_id)
            .bind(points)
            .fetch_one(self.pool()),
        )
        .await
    }

    async fn set_task_active(&self, task_id: i64, active: bool) -> Result<Task, LedgerError> {
        QueryTimeout::run(
            self.query_timeout(),
            sqlx::query_as::<_, Task>(
                r#"
                UPDATE tasks
                SET active = $2
                WHERE id = $1
                RETURNING id, code, name, points, active, created_at
                "#,
            )
            .bind(task_id)
            .bind(active)
            .fetch_one(self.pool()),
        )
        .await
    }
}
