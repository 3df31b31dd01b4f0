use std::sync::Arc;

use serde::Serialize;

use crate::{
    db::RewardStore,
    models::{
        taskmodel::{Completion, Task},
        usermodel::User,
    },
    service::error::LedgerError,
};

pub const MAX_USERNAME_LEN: usize = 64;

/// A user together with the derived balance and the ledger rows behind it.
#[derive(Debug, Clone, Serialize)]
pub struct UserStatus {
    pub user: User,
    pub balance: i64,
    pub completed: Vec<Completion>,
}

/// Exactly-once crediting of task completions and balance reads.
#[derive(Debug, Clone)]
pub struct LedgerService {
    db_client: Arc<dyn RewardStore>,
}

impl LedgerService {
    pub fn new(db_client: Arc<dyn RewardStore>) -> Self {
        Self { db_client }
    }

    pub async fn create_user(&self, username: &str) -> Result<User, LedgerError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(LedgerError::Invalid("username must not be empty".to_string()));
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(LedgerError::Invalid(format!(
                "username must be at most {} characters",
                MAX_USERNAME_LEN
            )));
        }

        let user = self.db_client.save_user(username).await?;
        tracing::info!("created user {} ({})", user.id, user.username);
        Ok(user)
    }

    pub async fn get_user(&self, user_id: i64) -> Result<User, LedgerError> {
        self.db_client
            .get_user(user_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("user {} not found", user_id)))
    }

    pub async fn get_task_by_code(&self, code: &str) -> Result<Task, LedgerError> {
        self.db_client
            .get_task_by_code(code)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("task {:?} not found", code)))
    }

    /// Credit `user_id` for the task named by `task_code`.
    ///
    /// Returns `true` when this call inserted the ledger row and `false` when
    /// the pair was already credited. Concurrent identical calls produce one
    /// `true`; the uniqueness of `(user, task)` in storage decides the winner.
    pub async fn complete_task(&self, user_id: i64, task_code: &str) -> Result<bool, LedgerError> {
        // Codes match exactly; surrounding whitespace is part of the code.
        if task_code.trim().is_empty() {
            return Err(LedgerError::Invalid("task code must not be empty".to_string()));
        }

        if let Some(completion) = self
            .db_client
            .insert_completion_if_absent(user_id, task_code)
            .await?
        {
            tracing::info!(
                "credited user {} with {} points for task {}",
                user_id,
                completion.points_awarded,
                task_code
            );
            return Ok(true);
        }

        // Suppressed: tell "already done" apart from "no such active task".
        // This second read is not atomic with the insert; a task deactivated
        // in between reads as missing.
        match self.db_client.get_task_by_code(task_code).await? {
            Some(task) if task.active => {
                tracing::debug!("user {} already completed task {}", user_id, task_code);
                Ok(false)
            }
            _ => Err(LedgerError::NotFound(format!(
                "task {:?} not found or inactive",
                task_code
            ))),
        }
    }

    /// Sum of `points_awarded` over the user's ledger rows.
    pub async fn balance(&self, user_id: i64) -> Result<i64, LedgerError> {
        self.get_user(user_id).await?;
        self.db_client.sum_completion_points(user_id).await
    }

    pub async fn list_completions(&self, user_id: i64) -> Result<Vec<Completion>, LedgerError> {
        self.db_client.get_completions(user_id).await
    }

    pub async fn user_status(&self, user_id: i64) -> Result<UserStatus, LedgerError> {
        let user = self.get_user(user_id).await?;
        let balance = self.db_client.sum_completion_points(user_id).await?;
        let completed = self.list_completions(user_id).await?;

        Ok(UserStatus {
            user,
            balance,
            completed,
        })
    }
}
