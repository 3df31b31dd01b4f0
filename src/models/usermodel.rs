use chrono::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,

    /// Set at most once; never equal to `id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer_id: Option<i64>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// One row of the ranked view over all users' balances.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub user_id: i64,
    pub username: String,
    pub balance: i64,
}
