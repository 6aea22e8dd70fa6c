use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use santa_core::{AuthError, DrawError, EventServiceError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Request could not be extracted; keeps the extractor's status.
    #[error("{1}")]
    Rejected(StatusCode, String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, message),
            ApiError::Rejected(status, message) => (status, message),
            ApiError::Internal(message) => {
                error!("event=request module=http status=error error_code=internal error={message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::Validation(err) => ApiError::BadRequest(err.to_string()),
            AuthError::EmailTaken => ApiError::Conflict(value.to_string()),
            AuthError::InvalidCredentials
            | AuthError::InvalidToken(_)
            | AuthError::UnknownUser => ApiError::Unauthorized(value.to_string()),
            AuthError::Repo(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<EventServiceError> for ApiError {
    fn from(value: EventServiceError) -> Self {
        match value {
            EventServiceError::Validation(_)
            | EventServiceError::AlreadyDrawn(_)
            | EventServiceError::NotDrawnYet(_) => ApiError::BadRequest(value.to_string()),
            EventServiceError::EventNotFound(_) | EventServiceError::ParticipantNotFound => {
                ApiError::NotFound(value.to_string())
            }
            EventServiceError::DuplicateParticipantEmail => ApiError::Conflict(value.to_string()),
            EventServiceError::Repo(_) | EventServiceError::InconsistentState(_) => {
                ApiError::Internal(value.to_string())
            }
        }
    }
}

impl From<DrawError> for ApiError {
    fn from(value: DrawError) -> Self {
        match value {
            DrawError::AlreadyDrawn(_) | DrawError::InsufficientParticipants { .. } => {
                ApiError::BadRequest(value.to_string())
            }
            DrawError::EventNotFound(_) => ApiError::NotFound(value.to_string()),
            DrawError::Assignment(_) | DrawError::Repo(_) => ApiError::Internal(value.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected(rejection.status(), rejection.body_text())
    }
}
