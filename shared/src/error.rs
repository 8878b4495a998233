use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("{0}")]
    EntityNotFound(String),
    #[error("{0}")]
    ValidationError(#[from] garde::Report),
    #[error("cannot RSVP to a past event")]
    EventAlreadyStarted,
    #[error("RSVP will open in {wait_secs} seconds")]
    RsvpNotYetOpen { wait_secs: i64 },
    #[error("you have already RSVP'd to this event")]
    AlreadyRsvped,
    #[error("event is at full capacity")]
    EventFull,
    #[error("you have not RSVP'd to this event")]
    NotRsvped,
    #[error("transaction error")]
    TransactionError(#[source] sqlx::Error),
    #[error("database operation error")]
    SpecificOperationError(#[source] sqlx::Error),
    #[error("no rows affected: {0}")]
    NoRowsAffectedError(String),
    #[error("{0}")]
    KeyValueStoreError(#[from] redis::RedisError),
    #[error("{0}")]
    BcryptError(#[from] bcrypt::BcryptError),
    #[error("{0}")]
    ConvertToUuidError(#[from] uuid::Error),
    #[error("authentication is required")]
    UnauthenticatedError,
    #[error("authorization failed")]
    UnauthorizedError,
}

/// クライアントへ返すエラーレスポンスのボディ。
/// code はクライアント側での分岐に使える安定した識別子とする。
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    seconds_remaining: Option<i64>,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::UnprocessableEntity(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unprocessable_entity")
            }
            AppError::EntityNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::ConvertToUuidError(_) => (StatusCode::BAD_REQUEST, "invalid_id"),
            AppError::EventAlreadyStarted => (StatusCode::BAD_REQUEST, "event_in_past"),
            AppError::RsvpNotYetOpen { .. } => (StatusCode::BAD_REQUEST, "rsvp_not_open"),
            AppError::AlreadyRsvped => (StatusCode::BAD_REQUEST, "already_rsvped"),
            AppError::EventFull => (StatusCode::BAD_REQUEST, "capacity_full"),
            AppError::NotRsvped => (StatusCode::BAD_REQUEST, "not_rsvped"),
            AppError::UnauthenticatedError => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            AppError::UnauthorizedError => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::TransactionError(_)
            | AppError::SpecificOperationError(_)
            | AppError::NoRowsAffectedError(_)
            | AppError::KeyValueStoreError(_)
            | AppError::BcryptError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, code) = self.status_and_code();
        if status_code.is_server_error() {
            tracing::error!(
                error.cause_chain = ?self,
                error.message = %self,
                "unexpected error happened"
            );
        }

        let seconds_remaining = match &self {
            AppError::RsvpNotYetOpen { wait_secs } => Some(*wait_secs),
            _ => None,
        };
        let body = ErrorBody {
            code,
            message: self.to_string(),
            seconds_remaining,
        };

        (status_code, Json(body)).into_response()
    }
}
