pub mod config;
pub mod db;
pub mod dtos;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
pub mod utils;

use std::sync::Arc;

use crate::{
    config::Config,
    db::RewardStore,
    service::{ledger_service::LedgerService, ranking::RankingService, referral::ReferralService},
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub ledger_service: Arc<LedgerService>,
    pub referral_service: Arc<ReferralService>,
    pub ranking_service: Arc<RankingService>,
}

impl AppState {
    pub fn new(db_client: Arc<dyn RewardStore>, config: Config) -> Self {
        Self {
            env: config,
            ledger_service: Arc::new(LedgerService::new(db_client.clone())),
            referral_service: Arc::new(ReferralService::new(db_client.clone())),
            ranking_service: Arc::new(RankingService::new(db_client)),
        }
    }
}
