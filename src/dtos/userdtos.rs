use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    models::{
        taskmodel::{Completion, Task},
        usermodel::{LeaderboardEntry, User},
    },
    service::ledger_service::UserStatus,
};

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct SignupUserDto {
    #[validate(length(min = 1, max = 64, message = "Username must be 1 to 64 characters"))]
    pub username: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct CompleteTaskDto {
    #[validate(length(min = 1, message = "task_code is required"))]
    pub task_code: String,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct SetReferrerDto {
    #[validate(range(min = 1, message = "referrer_id must be a positive id"))]
    pub referrer_id: i64,
}

/// `limit` stays a string so that garbage falls back to the default instead
/// of rejecting the request.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LeaderboardQueryDto {
    pub limit: Option<String>,
}

impl LeaderboardQueryDto {
    pub fn parsed_limit(&self) -> Option<i64> {
        self.limit.as_deref().and_then(|v| v.trim().parse().ok())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FilterUserDto {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl FilterUserDto {
    pub fn filter_user(user: &User) -> Self {
        FilterUserDto {
            id: user.id,
            username: user.username.to_owned(),
            referrer_id: user.referrer_id,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompletedSummaryDto {
    pub task_id: i64,
    pub points: i32,
    pub completed_at: DateTime<Utc>,
}

impl CompletedSummaryDto {
    pub fn filter_completions(rows: &[Completion]) -> Vec<CompletedSummaryDto> {
        rows.iter()
            .map(|c| CompletedSummaryDto {
                task_id: c.task_id,
                points: c.points_awarded,
                completed_at: c.completed_at,
            })
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserData {
    pub user: FilterUserDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignupResponseDto {
    pub status: String,
    pub token: String,
    pub data: UserData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserStatusResponseDto {
    pub status: String,
    pub user: FilterUserDto,
    pub balance: i64,
    pub completed: Vec<CompletedSummaryDto>,
}

impl UserStatusResponseDto {
    pub fn from_status(status: &UserStatus) -> Self {
        UserStatusResponseDto {
            status: "success".to_string(),
            user: FilterUserDto::filter_user(&status.user),
            balance: status.balance,
            completed: CompletedSummaryDto::filter_completions(&status.completed),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponseDto {
    pub status: String,
    pub user_id: i64,
    pub balance: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResponseDto {
    pub status: String,
    pub task: Task,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompleteTaskResponseDto {
    pub status: String,
    pub newly_completed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardResponseDto {
    pub status: String,
    pub items: Vec<LeaderboardEntry>,
}
