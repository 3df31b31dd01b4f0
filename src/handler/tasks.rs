use std::sync::Arc;

use axum::{extract::Path, response::IntoResponse, routing::get, Extension, Json, Router};

use crate::{dtos::TaskResponseDto, error::HttpError, AppState};

pub fn tasks_handler() -> Router {
    Router::new().route("/:code", get(get_task))
}

/// Inactive tasks are returned too; `active` tells whether they can be completed.
pub async fn get_task(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let task = app_state.ledger_service.get_task_by_code(&code).await?;

    Ok(Json(TaskResponseDto {
        status: "success".to_string(),
        task,
    }))
}
