use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Router};
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        auth::auth_handler,
        tasks::tasks_handler,
        users::{get_leaderboard, users_handler},
    },
    middleware::auth,
    AppState,
};

async fn health_check() -> &'static str {
    "ok"
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .nest("/auth", auth_handler())
        .nest("/users", users_handler().layer(middleware::from_fn(auth)))
        .nest("/tasks", tasks_handler())
        .route("/leaderboard", get(get_leaderboard))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/healthz", get(health_check))
        .nest("/api", api_route)
}
