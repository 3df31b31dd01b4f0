use std::sync::Arc;

use crate::{
    db::RewardStore,
    service::error::LedgerError,
};

/// One-shot assignment of a user's referrer.
#[derive(Debug, Clone)]
pub struct ReferralService {
    db_client: Arc<dyn RewardStore>,
}

impl ReferralService {
    pub fn new(db_client: Arc<dyn RewardStore>) -> Self {
        Self { db_client }
    }

    /// Link `user_id` to `referrer_id`. The link can be made once; every later
    /// attempt, including one naming the same referrer, is a `Conflict`.
    pub async fn set_referrer(&self, user_id: i64, referrer_id: i64) -> Result<(), LedgerError> {
        if user_id == referrer_id {
            return Err(LedgerError::Invalid("cannot refer self".to_string()));
        }
        if referrer_id <= 0 {
            return Err(LedgerError::Invalid("invalid referrer id".to_string()));
        }

        if self.db_client.get_user(referrer_id).await?.is_none() {
            return Err(LedgerError::NotFound(format!("referrer {} not found", referrer_id)));
        }

        if self.db_client.set_referrer_if_unset(user_id, referrer_id).await? {
            tracing::info!("user {} referred by {}", user_id, referrer_id);
            return Ok(());
        }

        match self.db_client.get_user(user_id).await? {
            None => Err(LedgerError::NotFound(format!("user {} not found", user_id))),
            Some(_) => Err(LedgerError::Conflict("referrer already set".to_string())),
        }
    }
}
