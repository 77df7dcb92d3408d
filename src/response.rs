use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::catalog::CatalogError;
use crate::services::learning_session::LearningError;
use crate::services::onboarding::OnboardingError;
use crate::services::subscription::SubscriptionError;

#[derive(Debug, Serialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Response {
    Json(SuccessResponse {
        success: true,
        data,
    })
    .into_response()
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
    is_operational: bool,
}

impl AppError {
    pub fn not_found(code: &str, message: impl Into<String>) -> Self {
        Self::operational(StatusCode::NOT_FOUND, code, message)
    }

    pub fn conflict(code: &str, message: impl Into<String>) -> Self {
        Self::operational(StatusCode::CONFLICT, code, message)
    }

    pub fn bad_request(code: &str, message: impl Into<String>) -> Self {
        Self::operational(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
            is_operational: false,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    fn operational(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.to_string(),
            message: message.into(),
            is_operational: true,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.is_operational {
            self.message
        } else {
            "Something went wrong, please try again later".to_string()
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: self.code,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<LearningError> for AppError {
    fn from(err: LearningError) -> Self {
        match err {
            LearningError::InvalidReference => {
                Self::bad_request("INVALID_REFERENCE", "No dictionary with that number")
            }
            LearningError::DictionaryNotFound => {
                Self::not_found("DICTIONARY_NOT_FOUND", "Dictionary not found")
            }
            LearningError::SubscriptionNotFound => Self::not_found(
                "SUBSCRIPTION_NOT_FOUND",
                "You are not subscribed to this dictionary",
            ),
            LearningError::NoWordsForLearning { .. } => Self::conflict(
                "NO_WORDS_FOR_LEARNING",
                "All words of this dictionary are already sorted",
            ),
            LearningError::LearningNotStarted => Self::conflict(
                "LEARNING_NOT_STARTED",
                "Pick a dictionary to start learning first",
            ),
            LearningError::Internal { op, .. } => Self::internal(format!("{op} failed")),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::DictionaryNotFound => {
                Self::not_found("DICTIONARY_NOT_FOUND", "Dictionary not found")
            }
            CatalogError::Internal { op, .. } => Self::internal(format!("{op} failed")),
        }
    }
}

impl From<SubscriptionError> for AppError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::DictionaryNotFound => {
                Self::not_found("DICTIONARY_NOT_FOUND", "Dictionary not found")
            }
            SubscriptionError::SubscriptionNotFound => Self::not_found(
                "SUBSCRIPTION_NOT_FOUND",
                "You are not subscribed to this dictionary",
            ),
            SubscriptionError::AlreadySubscribed => Self::conflict(
                "ALREADY_SUBSCRIBED",
                "You are already subscribed to this dictionary",
            ),
            SubscriptionError::Internal { op, .. } => Self::internal(format!("{op} failed")),
        }
    }
}

impl From<OnboardingError> for AppError {
    fn from(err: OnboardingError) -> Self {
        match err {
            OnboardingError::Internal { op, .. } => Self::internal(format!("{op} failed")),
            OnboardingError::Learning(err) => err.into(),
        }
    }
}
