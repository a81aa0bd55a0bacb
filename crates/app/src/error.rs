use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use services::{
    ActivityServiceError, ChallengeServiceError, DashboardError, SessionServiceError,
    TopicServiceError,
};
use storage::repository::StorageError;

/// API-boundary error taxonomy: validation, not-found, conflict, and an
/// opaque internal bucket. Storage details are logged, never leaked.
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    NotFound,
    Conflict(String),
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "not found".to_owned()),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, message),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_owned(),
            ),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn from_storage(e: StorageError) -> ApiError {
    match e {
        StorageError::NotFound => ApiError::NotFound,
        StorageError::Conflict => ApiError::Conflict("conflict".to_owned()),
        other => {
            error!(error = %other, "storage failure");
            ApiError::Internal
        }
    }
}

impl From<TopicServiceError> for ApiError {
    fn from(e: TopicServiceError) -> Self {
        match e {
            TopicServiceError::Topic(e) => ApiError::Validation(e.to_string()),
            TopicServiceError::Subtopic(e) => ApiError::Validation(e.to_string()),
            TopicServiceError::Storage(e) => from_storage(e),
            _ => ApiError::Internal,
        }
    }
}

impl From<ActivityServiceError> for ApiError {
    fn from(e: ActivityServiceError) -> Self {
        match e {
            ActivityServiceError::NameTaken => ApiError::Conflict(e.to_string()),
            ActivityServiceError::Activity(e) => ApiError::Validation(e.to_string()),
            ActivityServiceError::Storage(e) => from_storage(e),
            _ => ApiError::Internal,
        }
    }
}

impl From<SessionServiceError> for ApiError {
    fn from(e: SessionServiceError) -> Self {
        match e {
            SessionServiceError::ActiveSessionExists => ApiError::Conflict(e.to_string()),
            SessionServiceError::Session(e) => ApiError::Validation(e.to_string()),
            SessionServiceError::Storage(e) => from_storage(e),
            _ => ApiError::Internal,
        }
    }
}

impl From<ChallengeServiceError> for ApiError {
    fn from(e: ChallengeServiceError) -> Self {
        match e {
            ChallengeServiceError::NoActiveChallenge => ApiError::NotFound,
            ChallengeServiceError::Challenge(e) => ApiError::Validation(e.to_string()),
            ChallengeServiceError::Storage(e) => from_storage(e),
            _ => ApiError::Internal,
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(e: DashboardError) -> Self {
        match e {
            DashboardError::Settings(e) => ApiError::Validation(e.to_string()),
            DashboardError::Topics(e) => e.into(),
            DashboardError::Activities(e) => e.into(),
            DashboardError::Storage(e) => from_storage(e),
            _ => ApiError::Internal,
        }
    }
}
