use std::sync::Arc;

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Extension, Json, Router,
};
use axum_extra::extract::cookie::Cookie;
use validator::Validate;

use crate::{
    dtos::{FilterUserDto, SignupResponseDto, SignupUserDto, UserData},
    error::{ErrorMessage, HttpError},
    service::error::LedgerError,
    utils::token,
    AppState,
};

pub fn auth_handler() -> Router {
    Router::new().route("/signup", post(signup))
}

pub async fn signup(
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<SignupUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let user = app_state
        .ledger_service
        .create_user(&body.username)
        .await
        .map_err(|e| match e {
            LedgerError::Conflict(_) => {
                HttpError::new(ErrorMessage::UsernameExist.to_string(), StatusCode::CONFLICT)
                    .with_code("conflict")
            }
            other => other.into(),
        })?;

    let token = token::create_token(
        &user.id.to_string(),
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage,
    )
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    let cookie_duration = time::Duration::minutes(app_state.env.jwt_maxage);
    let cookie = Cookie::build(("token", token.clone()))
        .path("/")
        .max_age(cookie_duration)
        .http_only(true)
        .build();

    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        cookie
            .to_string()
            .parse()
            .map_err(|_| HttpError::server_error("failed to build session cookie"))?,
    );

    let response = Json(SignupResponseDto {
        status: "success".to_string(),
        token,
        data: UserData {
            user: FilterUserDto::filter_user(&user),
        },
    });

    Ok((StatusCode::CREATED, headers, response))
}
