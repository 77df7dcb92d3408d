mod dictionaries;
mod health;
mod learning;
mod users;

use axum::response::{IntoResponse, Response};
use axum::Router;

use crate::response::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health::router())
        .nest("/api/dictionaries", dictionaries::public_router())
        .nest("/api/users/:user_id", users::router())
        .nest("/api/users/:user_id/dictionaries", dictionaries::user_router())
        .nest("/api/users/:user_id/learning", learning::router())
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    AppError::not_found("NOT_FOUND", "Route not found").into_response()
}
