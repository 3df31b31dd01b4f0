use async_trait::async_trait;

use super::{query_timeout::QueryTimeout, DBClient};
use crate::{
    models::usermodel::{LeaderboardEntry, User},
    service::error::LedgerError,
};

#[async_trait]
pub trait UserExt {
    /// Insert a new user. A taken username is a `Conflict`.
    async fn save_user(&self, username: &str) -> Result<User, LedgerError>;

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, LedgerError>;

    /// Set `referrer_id` only while it is still NULL. Returns whether a row
    /// changed; concurrent callers race inside a single statement.
    async fn set_referrer_if_unset(
        &self,
        user_id: i64,
        referrer_id: i64,
    ) -> Result<bool, LedgerError>;

    /// All users with their ledger balance, `balance DESC, id ASC`.
    async fn get_leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, LedgerError>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn save_user(&self, username: &str) -> Result<User, LedgerError> {
        QueryTimeout::run(
            self.query_timeout(),
            sqlx::query_as::<_, User>(
                r#"
                INSERT INTO users (username)
                VALUES ($1)
                RETURNING id, username, referrer_id, created_at
                "#,
            )
            .bind(username)
            .fetch_one(self.pool()),
        )
        .await
        .map_err(|e| match e {
            LedgerError::Conflict(_) => {
                LedgerError::Conflict(format!("username {:?} is already taken", username))
            }
            other => other,
        })
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, LedgerError> {
        QueryTimeout::run(
            self.query_timeout(),
            sqlx::query_as::<_, User>(
                r#"
                SELECT id, username, referrer_id, created_at
                FROM users
                WHERE id = $1
                "#,
            )
            .bind(user_id)
            .fetch_optional(self.pool()),
        )
        .await
    }

    async fn set_referrer_if_unset(
        &self,
        user_id: i64,
        referrer_id: i64,
    ) -> Result<bool, LedgerError> {
        let result = QueryTimeout::run(
            self.query_timeout(),
            sqlx::query(
                r#"
                UPDATE users
                SET referrer_id = $2
                WHERE id = $1 AND referrer_id IS NULL
                "#,
            )
            .bind(user_id)
            .bind(referrer_id)
            .execute(self.pool()),
        )
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn get_leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, LedgerError> {
        QueryTimeout::run(
            self.query_timeout(),
            sqlx::query_as::<_, LeaderboardEntry>(
                r#"
                SELECT u.id AS user_id, u.username,
                       COALESCE(SUM(ut.points_awarded), 0)::BIGINT AS balance
                FROM users u
                LEFT JOIN user_tasks ut ON ut.user_id = u.id
                GROUP BY u.id, u.username
                ORDER BY balance DESC, u.id ASC
                LIMIT $1
                "#,
            )
            .bind(limit)
            .fetch_all(self.pool()),
        )
        .await
    }
}
