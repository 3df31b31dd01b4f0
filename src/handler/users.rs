use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    dtos::{
        BalanceResponseDto, CompleteTaskDto, CompleteTaskResponseDto, LeaderboardQueryDto, LeaderboardResponseDto,
        SetReferrerDto, UserStatusResponseDto,
    },
    error::{ErrorMessage, HttpError},
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn users_handler() -> Router {
    Router::new()
        .route("/:id/status", get(get_status))
        .route("/:id/balance", get(get_balance))
        .route("/:id/task/complete", post(complete_task))
        .route("/:id/referrer", post(set_referrer))
}

/// Parse the path id and make sure the caller acts only on their own account.
fn own_user_id(raw: &str, auth: &JWTAuthMiddeware) -> Result<i64, HttpError> {
    let path_id = raw
        .parse::<i64>()
        .map_err(|_| HttpError::bad_request(ErrorMessage::InvalidUserId.to_string()))?;

    if path_id != auth.user.id {
        return Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()));
    }
    Ok(path_id)
}

pub async fn get_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = own_user_id(&id, &user)?;

    let status = app_state.ledger_service.user_status(user_id).await?;

    Ok(Json(UserStatusResponseDto::from_status(&status)))
}

pub async fn get_balance(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = own_user_id(&id, &user)?;

    let balance = app_state.ledger_service.balance(user_id).await?;

    Ok(Json(BalanceResponseDto {
        status: "success".to_string(),
        user_id,
        balance,
    }))
}

pub async fn complete_task(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(id): Path<String>,
    Json(body): Json<CompleteTaskDto>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = own_user_id(&id, &user)?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let newly_completed = app_state
        .ledger_service
        .complete_task(user_id, &body.task_code)
        .await?;

    Ok(Json(CompleteTaskResponseDto {
        status: "success".to_string(),
        newly_completed,
    }))
}

pub async fn set_referrer(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<JWTAuthMiddeware>,
    Path(id): Path<String>,
    Json(body): Json<SetReferrerDto>,
) -> Result<impl IntoResponse, HttpError> {
    let user_id = own_user_id(&id, &user)?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    app_state
        .referral_service
        .set_referrer(user_id, body.referrer_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_leaderboard(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query_params): Query<LeaderboardQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let items = app_state
        .ranking_service
        .leaderboard(query_params.parsed_limit())
        .await?;

    Ok(Json(LeaderboardResponseDto {
        status: "success".to_string(),
        items,
    }))
}
