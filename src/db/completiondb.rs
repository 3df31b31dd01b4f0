use async_trait::async_trait;

use super::{query_timeout::QueryTimeout, DBClient};
use crate::{models::taskmodel::Completion, service::error::LedgerError};

#[async_trait]
pub trait CompletionExt {
    /// Insert the ledger row for `(user_id, task)` in one statement, copying
    /// the task's current points. `None` means nothing was inserted: either
    /// the pair already exists or no active task has `task_code`.
    async fn insert_completion_if_absent(
        &self,
        user_id: i64,
        task_code: &str,
    ) -> Result<Option<Completion>, LedgerError>;

    async fn sum_completion_points(&self, user_id: i64) -> Result<i64, LedgerError>;

    /// Most recent first.
    async fn get_completions(&self, user_id: i64) -> Result<Vec<Completion>, LedgerError>;
}

#[async_trait]
impl CompletionExt for DBClient {
    async fn insert_completion_if_absent(
        &self,
        user_id: i64,
        task_code: &str,
    ) -> Result<Option<Completion>, LedgerError> {
        QueryTimeout::run(
            self.query_timeout(),
            sqlx::query_as::<_, Completion>(
                r#"
                INSERT INTO user_tasks (user_id, task_id, points_awarded)
                SELECT $1, t.id, t.points
                FROM tasks t
                WHERE t.code = $2 AND t.active = TRUE
                ON CONFLICT (user_id, task_id) DO NOTHING
                RETURNING user_id, task_id, points_awarded, completed_at
                "#,
            )
            .bind(user_id)
            .bind(task_code)
            .fetch_optional(self.pool()),
        )
        .await
        .map_err(|e| match e {
            LedgerError::NotFound(_) => LedgerError::NotFound(format!("user {} not found", user_id)),
            other => other,
        })
    }

    async fn sum_completion_points(&self, user_id: i64) -> Result<i64, LedgerError> {
        QueryTimeout::run(
            self.query_timeout(),
            sqlx::query_scalar::<_, i64>(
                r#"
                SELECT COALESCE(SUM(points_awarded), 0)::BIGINT
                FROM user_tasks
                WHERE user_id = $1
                "#,
            )
            .bind(user_id)
            .fetch_one(self.pool()),
        )
        .await
    }

    async fn get_completions(&self, user_id: i64) -> Result<Vec<Completion>, LedgerError> {
        QueryTimeout::run(
            self.query_timeout(),
            sqlx::query_as::<_, Completion>(
                r#"
                SELECT user_id, task_id, points_awarded, completed_at
                FROM user_tasks
                WHERE user_id = $1
                ORDER BY completed_at DESC, task_id ASC
                "#,
            )
            .bind(user_id)
            .fetch_all(self.pool()),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    //! Exercise the real SQL primitives. Run with a scratch database:
    //! `DATABASE_URL=postgres://... cargo test -- --ignored`
    use std::sync::Arc;

    use chrono::Utc;
    use tokio::task::JoinSet;

    use super::*;
    use crate::db::{TaskExt, UserExt};

    async fn connect() -> Arc<DBClient> {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for postgres tests");
        let pool = DBClient::connect(&url, 20, QueryTimeout::DEFAULT_TIMEOUT)
            .await
            .expect("connect");
        let db = DBClient::new(pool);
        db.migrate().await.expect("migrate");
        Arc::new(db)
    }

    fn unique(prefix: &str) -> String {
        format!("{}_{}", prefix, Utc::now().timestamp_nanos_opt().unwrap_or_default())
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn concurrent_inserts_credit_once() {
        let db = connect().await;
        let user_id = db.save_user(&unique("pg_racer")).await.unwrap().id;
        let code = unique("PG_RACE");
        db.save_task(&code, "race", 25, true).await.unwrap();

        let mut set = JoinSet::new();
        for _ in 0..16 {
            let db = db.clone();
            let code = code.clone();
            set.spawn(async move { db.insert_completion_if_absent(user_id, &code).await });
        }

        let mut inserted = 0;
        while let Some(res) = set.join_next().await {
            if res.unwrap().unwrap().is_some() {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(db.sum_completion_points(user_id).await.unwrap(), 25);
        assert_eq!(db.get_completions(user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn inactive_task_inserts_nothing_and_points_are_snapshotted() {
        let db = connect().await;
        let user = db.save_user(&unique("pg_snapshot")).await.unwrap();
        let code = unique("PG_SNAP");
        let task = db.save_task(&code, "snapshot", 40, true).await.unwrap();

        let row = db.insert_completion_if_absent(user.id, &code).await.unwrap().unwrap();
        assert_eq!(row.points_awarded, 40);

        db.update_task_points(task.id, 400).await.unwrap();
        assert_eq!(db.sum_completion_points(user.id).await.unwrap(), 40);

        let other = db.save_user(&unique("pg_snapshot_b")).await.unwrap();
        db.set_task_active(task.id, false).await.unwrap();
        assert!(db.insert_completion_if_absent(other.id, &code).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn unknown_user_is_not_found() {
        let db = connect().await;
        let code = unique("PG_NOUSER");
        db.save_task(&code, "no user", 5, true).await.unwrap();

        let err = db.insert_completion_if_absent(i64::MAX, &code).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn referrer_is_set_by_exactly_one_racer() {
        let db = connect().await;
        let target = db.save_user(&unique("pg_target")).await.unwrap().id;
        let mut referrers = Vec::new();
        for i in 0..8 {
            referrers.push(db.save_user(&unique(&format!("pg_ref{}", i))).await.unwrap().id);
        }

        let mut set = JoinSet::new();
        for referrer in referrers {
            let db = db.clone();
            set.spawn(async move { db.set_referrer_if_unset(target, referrer).await });
        }

        let mut winners = 0;
        while let Some(res) = set.join_next().await {
            if res.unwrap().unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);

        let late = db.save_user(&unique("pg_late")).await.unwrap().id;
        assert_eq!(db.set_referrer_if_unset(target, late).await, Ok(false));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn duplicate_username_conflicts() {
        let db = connect().await;
        let name = unique("pg_dupe");
        db.save_user(&name).await.unwrap();
        assert!(matches!(db.save_user(&name).await, Err(LedgerError::Conflict(_))));
    }
}
