use chrono::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct Task {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub points: i32,
    pub active: bool,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// A ledger row. `points_awarded` is copied from the task when the row is
/// inserted and never follows later edits of `tasks.points`.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct Completion {
    pub user_id: i64,
    pub task_id: i64,
    pub points_awarded: i32,
    pub completed_at: DateTime<Utc>,
}
