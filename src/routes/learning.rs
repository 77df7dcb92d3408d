use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{LearningWord, UserId};
use crate::response::{ok, AppError};
use crate::services::learning_session::{Decision, LearningError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", delete(exit))
        .route("/ordinal/:ordinal", post(start_by_ordinal))
        .route("/dictionaries/:dictionary_id", post(start_by_dictionary_id))
        .route("/decision", post(decide))
        .route("/active", get(active_dictionary))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum DecisionKind {
    Add,
    Block,
    Back,
}

#[derive(Debug, Deserialize)]
struct DecisionRequest {
    decision: DecisionKind,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum LearningStep {
    Presenting {
        #[serde(rename = "dictionaryId")]
        dictionary_id: Uuid,
        word: LearningWord,
    },
    Completed {
        #[serde(rename = "dictionaryId")]
        dictionary_id: Uuid,
    },
    Idle,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ActiveDictionaryResponse {
    dictionary_id: Option<Uuid>,
}

async fn start_by_ordinal(
    State(state): State<AppState>,
    Path((user_id, ordinal)): Path<(UserId, i64)>,
) -> Result<Response, AppError> {
    let step = match state.learning().start_by_ordinal(user_id, ordinal).await {
        Ok(started) => LearningStep::Presenting {
            dictionary_id: started.dictionary_id,
            word: started.word,
        },
        Err(err) => completed_or_fail(user_id, err)?,
    };
    Ok(ok(step))
}

async fn start_by_dictionary_id(
    State(state): State<AppState>,
    Path((user_id, dictionary_id)): Path<(UserId, Uuid)>,
) -> Result<Response, AppError> {
    let step = match state
        .learning()
        .start_by_dictionary_id(user_id, dictionary_id)
        .await
    {
        Ok(word) => LearningStep::Presenting {
            dictionary_id,
            word,
        },
        Err(err) => completed_or_fail(user_id, err)?,
    };
    Ok(ok(step))
}

async fn decide(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Json(body): Json<DecisionRequest>,
) -> Result<Response, AppError> {
    let decision = match body.decision {
        DecisionKind::Add => Decision::Add,
        DecisionKind::Block => Decision::Block,
        DecisionKind::Back => {
            state
                .learning()
                .exit(user_id)
                .await
                .map_err(|err| fail(user_id, err))?;
            return Ok(ok(LearningStep::Idle));
        }
    };

    let step = match state.learning().decide(user_id, decision).await {
        Ok(word) => LearningStep::Presenting {
            dictionary_id: word.dictionary_id,
            word,
        },
        Err(err) => completed_or_fail(user_id, err)?,
    };
    Ok(ok(step))
}

async fn active_dictionary(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Response, AppError> {
    let dictionary_id = state
        .learning()
        .current_dictionary(user_id)
        .await
        .map_err(|err| fail(user_id, err))?;
    Ok(ok(ActiveDictionaryResponse { dictionary_id }))
}

async fn exit(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Response, AppError> {
    state
        .learning()
        .exit(user_id)
        .await
        .map_err(|err| fail(user_id, err))?;
    Ok(ok(LearningStep::Idle))
}

/// Running out of words is a normal end of the flow, not a failure.
fn completed_or_fail(user_id: UserId, err: LearningError) -> Result<LearningStep, AppError> {
    match err {
        LearningError::NoWordsForLearning { dictionary_id } => {
            Ok(LearningStep::Completed { dictionary_id })
        }
        other => Err(fail(user_id, other)),
    }
}

fn fail(user_id: UserId, err: LearningError) -> AppError {
    if let LearningError::Internal { op, source } = &err {
        tracing::error!(user_id, op, error = %source, "learning operation failed");
    }
    err.into()
}
