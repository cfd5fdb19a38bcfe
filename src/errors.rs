use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Failures of the remote attendee store. All of them are retryable from
/// the attendee's point of view.
#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "remote store is not configured")]
    Unavailable,
    #[display(fmt = "attendee {} not found", _0)]
    NotFound(String),
    #[display(fmt = "constraint violated: {}", _0)]
    Constraint(String),
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some("23000") {
                return StoreError::Constraint(db_err.message().to_string());
            }
        }
        StoreError::Database(e)
    }
}

/// Errors returned by HTTP handlers, rendered as `{ "error", "retryable" }`.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    Validation(String),
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "{}", _0)]
    Unauthorized(String),
    #[display(fmt = "RSVP sudah ditutup")]
    Closed,
    /// A write to the store failed.
    #[display(fmt = "Could not submit RSVP, please try again")]
    Submit(StoreError),
    /// A read from the store failed.
    #[display(fmt = "Could not load RSVP data, please try again")]
    Store(StoreError),
    #[display(fmt = "Could not generate the export, please try again")]
    Export(String),
    #[display(fmt = "Internal Server Error")]
    Internal,
}

impl ApiError {
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Submit(_) | ApiError::Store(_) | ApiError::Export(_) | ApiError::Internal
        )
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Closed => StatusCode::FORBIDDEN,
            ApiError::Submit(e) | ApiError::Store(e) => match e {
                StoreError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::Constraint(_) => StatusCode::CONFLICT,
                StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Export(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string(),
            "retryable": self.retryable(),
        }))
    }
}
