use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Dictionary, UserId};
use crate::response::{ok, AppError};
use crate::services::catalog::CatalogError;
use crate::services::subscription::SubscriptionError;
use crate::state::AppState;

pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_public))
        .route("/:dictionary_id", get(details))
}

pub fn user_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_subscribed))
        .route("/:dictionary_id", post(subscribe).delete(unsubscribe))
}

/// A subscribed dictionary with the number learning-by-ordinal accepts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NumberedDictionary {
    ordinal: usize,
    #[serde(flatten)]
    dictionary: Dictionary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionChanged {
    dictionary_id: Uuid,
    subscribed: bool,
}

async fn list_public(State(state): State<AppState>) -> Result<Response, AppError> {
    let dictionaries = state
        .catalog()
        .public_dictionaries()
        .await
        .map_err(catalog_failure)?;
    Ok(ok(dictionaries))
}

async fn details(
    State(state): State<AppState>,
    Path(dictionary_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let details = state
        .catalog()
        .dictionary_details(dictionary_id)
        .await
        .map_err(catalog_failure)?;
    Ok(ok(details))
}

async fn list_subscribed(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Response, AppError> {
    let dictionaries = state
        .catalog()
        .user_dictionaries(user_id)
        .await
        .map_err(catalog_failure)?;
    let numbered: Vec<NumberedDictionary> = dictionaries
        .into_iter()
        .enumerate()
        .map(|(index, dictionary)| NumberedDictionary {
            ordinal: index + 1,
            dictionary,
        })
        .collect();
    Ok(ok(numbered))
}

async fn subscribe(
    State(state): State<AppState>,
    Path((user_id, dictionary_id)): Path<(UserId, Uuid)>,
) -> Result<Response, AppError> {
    state
        .subscriptions()
        .subscribe(user_id, dictionary_id)
        .await
        .map_err(|err| subscription_failure(user_id, err))?;
    Ok(ok(SubscriptionChanged {
        dictionary_id,
        subscribed: true,
    }))
}

async fn unsubscribe(
    State(state): State<AppState>,
    Path((user_id, dictionary_id)): Path<(UserId, Uuid)>,
) -> Result<Response, AppError> {
    state
        .subscriptions()
        .unsubscribe(user_id, dictionary_id)
        .await
        .map_err(|err| subscription_failure(user_id, err))?;
    Ok(ok(SubscriptionChanged {
        dictionary_id,
        subscribed: false,
    }))
}

fn catalog_failure(err: CatalogError) -> AppError {
    if let CatalogError::Internal { op, source } = &err {
        tracing::error!(op, error = %source, "catalog operation failed");
    }
    err.into()
}

fn subscription_failure(user_id: UserId, err: SubscriptionError) -> AppError {
    if let SubscriptionError::Internal { op, source } = &err {
        tracing::error!(user_id, op, error = %source, "subscription operation failed");
    }
    err.into()
}
