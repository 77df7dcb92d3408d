use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::post;
use axum::Router;
use serde::Serialize;

use crate::domain::UserId;
use crate::response::{ok, AppError};
use crate::services::onboarding::OnboardingError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(start).delete(remove_me))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UserResponse {
    user_id: UserId,
    registered: bool,
}

async fn start(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Response, AppError> {
    state
        .onboarding()
        .start(user_id)
        .await
        .map_err(|err| onboarding_failure(user_id, err))?;
    Ok(ok(UserResponse {
        user_id,
        registered: true,
    }))
}

async fn remove_me(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Response, AppError> {
    state
        .onboarding()
        .remove_me(user_id)
        .await
        .map_err(|err| onboarding_failure(user_id, err))?;
    Ok(ok(UserResponse {
        user_id,
        registered: false,
    }))
}

fn onboarding_failure(user_id: UserId, err: OnboardingError) -> AppError {
    match &err {
        OnboardingError::Internal { op, source } => {
            tracing::error!(user_id, op, error = %source, "onboarding operation failed");
        }
        OnboardingError::Learning(learning) if learning.is_internal() => {
            tracing::error!(user_id, error = %learning, "onboarding operation failed");
        }
        OnboardingError::Learning(_) => {}
    }
    err.into()
}
