//! In-memory store with the same uniqueness and conditional-update rules as
//! the Postgres schema. A single mutex stands in for statement atomicity.
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{CompletionExt, TaskExt, UserExt};
use crate::{
    models::{
        taskmodel::{Completion, Task},
        usermodel::{LeaderboardEntry, User},
    },
    service::error::LedgerError,
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    tasks: Vec<Task>,
    completions: Vec<Completion>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the pool could not be reached.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn completion_count(&self, user_id: i64, task_id: i64) -> usize {
        let tables = self.tables.lock().await;
        tables
            .completions
            .iter()
            .filter(|c| c.user_id == user_id && c.task_id == task_id)
            .count()
    }

    fn check_available(&self) -> Result<(), LedgerError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LedgerError::Transient("pool timed out".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserExt for MemoryStore {
    async fn save_user(&self, username: &str) -> Result<User, LedgerError> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;
        if username.is_empty() {
            return Err(LedgerError::Invalid("username must not be empty".to_string()));
        }
        if tables.users.iter().any(|u| u.username == username) {
            return Err(LedgerError::Conflict(format!("username {:?} is already taken", username)));
        }
        let user = User {
            id: tables.users.len() as i64 + 1,
            username: username.to_string(),
            referrer_id: None,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, LedgerError> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn set_referrer_if_unset(
        &self,
        user_id: i64,
        referrer_id: i64,
    ) -> Result<bool, LedgerError> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;
        let referrer_exists = tables.users.iter().any(|u| u.id == referrer_id);
        let Some(user) = tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id && u.referrer_id.is_none())
        else {
            return Ok(false);
        };
        if !referrer_exists {
            return Err(LedgerError::NotFound(format!("user {} not found", referrer_id)));
        }
        if user_id == referrer_id {
            return Err(LedgerError::Invalid("a user cannot refer themselves".to_string()));
        }
        user.referrer_id = Some(referrer_id);
        Ok(true)
    }

    async fn get_leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>, LedgerError> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        let mut entries: Vec<LeaderboardEntry> = tables
            .users
            .iter()
            .map(|u| LeaderboardEntry {
                user_id: u.id,
                username: u.username.clone(),
                balance: tables
                    .completions
                    .iter()
                    .filter(|c| c.user_id == u.id)
                    .map(|c| c.points_awarded as i64)
                    .sum(),
            })
            .collect();
        entries.sort_by(|a, b| b.balance.cmp(&a.balance).then(a.user_id.cmp(&b.user_id)));
        entries.truncate(limit.max(0) as usize);
        Ok(entries)
    }
}

#[async_trait]
impl TaskExt for MemoryStore {
    async fn get_task_by_code(&self, code: &str) -> Result<Option<Task>, LedgerError> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        Ok(tables.tasks.iter().find(|t| t.code == code).cloned())
    }

    async fn save_task(
        &self,
        code: &str,
        name: &str,
        points: i32,
        active: bool,
    ) -> Result<Task, LedgerError> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;
        if points < 0 {
            return Err(LedgerError::Invalid("points must not be negative".to_string()));
        }
        if tables.tasks.iter().any(|t| t.code == code) {
            return Err(LedgerError::Conflict(format!("task code {:?} already exists", code)));
        }
        let task = Task {
            id: tables.tasks.len() as i64 + 1,
            code: code.to_string(),
            name: name.to_string(),
            points,
            active,
            created_at: Utc::now(),
        };
        tables.tasks.push(task.clone());
        Ok(task)
    }

    async fn update_task_points(&self, task_id: i64, points: i32) -> Result<Task, LedgerError> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;
        if points < 0 {
            return Err(LedgerError::Invalid("points must not be negative".to_string()));
        }
        let task = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| LedgerError::NotFound(format!("task {} not found", task_id)))?;
        task.points = points;
        Ok(task.clone())
    }

    async fn set_task_active(&self, task_id: i64, active: bool) -> Result<Task, LedgerError> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;
        let task = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| LedgerError::NotFound(format!("task {} not found", task_id)))?;
        task.active = active;
        Ok(task.clone())
    }
}

#[async_trait]
impl CompletionExt for MemoryStore {
    async fn insert_completion_if_absent(
        &self,
        user_id: i64,
        task_code: &str,
    ) -> Result<Option<Completion>, LedgerError> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;
        let Some(task) = tables.tasks.iter().find(|t| t.code == task_code && t.active) else {
            return Ok(None);
        };
        let (task_id, points) = (task.id, task.points);
        if !tables.users.iter().any(|u| u.id == user_id) {
            return Err(LedgerError::NotFound(format!("user {} not found", user_id)));
        }
        if tables
            .completions
            .iter()
            .any(|c| c.user_id == user_id && c.task_id == task_id)
        {
            return Ok(None);
        }
        let completion = Completion {
            user_id,
            task_id,
            points_awarded: points,
            completed_at: Utc::now(),
        };
        tables.completions.push(completion.clone());
        Ok(Some(completion))
    }

    async fn sum_completion_points(&self, user_id: i64) -> Result<i64, LedgerError> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .completions
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.points_awarded as i64)
            .sum())
    }

    async fn get_completions(&self, user_id: i64) -> Result<Vec<Completion>, LedgerError> {
        self.check_available()?;
        let tables = self.tables.lock().await;
        let mut rows: Vec<Completion> = tables
            .completions
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.completed_at.cmp(&a.completed_at).then(a.task_id.cmp(&b.task_id)));
        Ok(rows)
    }
}
