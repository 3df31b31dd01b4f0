use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

pub mod completiondb;
#[cfg(test)]
pub mod memorydb;
pub mod query_timeout;
pub mod taskdb;
pub mod userdb;

pub use completiondb::CompletionExt;
pub use taskdb::TaskExt;
pub use userdb::UserExt;

use query_timeout::QueryTimeout;

/// Everything the ledger services need from storage. Implemented by
/// [`DBClient`] and, in tests, by the in-memory store.
pub trait RewardStore: UserExt + TaskExt + CompletionExt + std::fmt::Debug + Send + Sync {}

impl<T> RewardStore for T where T: UserExt + TaskExt + CompletionExt + std::fmt::Debug + Send + Sync {}

#[derive(Debug, Clone)]
pub struct DBClient {
    pool: Pool<Postgres>,
    query_timeout: Duration,
}

impl DBClient {
    pub fn new(pool: Pool<Postgres>) -> Self {
        DBClient {
            pool,
            query_timeout: QueryTimeout::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Open the shared pool and make sure the database answers.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Pool<Postgres>, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;

        if let Err(err) = sqlx::query("SELECT 1").execute(&pool).await {
            pool.close().await;
            return Err(err);
        }

        Ok(pool)
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
