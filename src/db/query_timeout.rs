// Database query timeout protection
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::service::error::LedgerError;

pub struct QueryTimeout;

impl QueryTimeout {
    /// Default bound for every statement issued by the store.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Await `query_fn` for at most `timeout_duration`. Storage errors are
    /// classified; an elapsed timer becomes `LedgerError::Transient`. A
    /// dropped statement either applied in full or not at all.
    pub async fn run<F, T>(timeout_duration: Duration, query_fn: F) -> Result<T, LedgerError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match timeout(timeout_duration, query_fn).await {
            Ok(result) => result.map_err(|e| {
                let err = LedgerError::from(e);
                if err.is_retryable() {
                    tracing::warn!("transient storage failure: {}", err);
                }
                err
            }),
            Err(_) => {
                tracing::warn!("query timed out after {:?}", timeout_duration);
                Err(LedgerError::Transient(format!(
                    "query timed out after {:?}",
                    timeout_duration
                )))
            }
        }
    }
}
