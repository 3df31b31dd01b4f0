use std::sync::Arc;

use crate::{
    db::RewardStore,
    models::usermodel::LeaderboardEntry,
    service::error::LedgerError,
};

/// Ranking service: every user with their ledger balance, highest first.
///
/// Ties are broken by ascending user id, so an unchanged ledger always yields
/// the same sequence. Nothing is cached; each call reads the ledger.
#[derive(Debug, Clone)]
pub struct RankingService {
    db_client: Arc<dyn RewardStore>,
}

impl RankingService {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MIN_LIMIT: i64 = 1;
    pub const MAX_LIMIT: i64 = 100;

    pub fn new(db_client: Arc<dyn RewardStore>) -> Self {
        Self { db_client }
    }

    pub fn clamp_limit(limit: Option<i64>) -> i64 {
        limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(Self::MIN_LIMIT, Self::MAX_LIMIT)
    }

    pub async fn leaderboard(&self, limit: Option<i64>) -> Result<Vec<LeaderboardEntry>, LedgerError> {
        self.db_client.get_leaderboard(Self::clamp_limit(limit)).await
    }
}
