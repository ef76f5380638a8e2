use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Schema migration failed for table `{table}`: {source}")]
    Schema {
        table: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Invalid signup request: {0}")]
    InvalidSignUp(String),

    #[error("An account with this email already exists")]
    DuplicateAccount,

    #[error("Internal server error")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidSignUp(_) => StatusCode::BAD_REQUEST,
            ServiceError::DuplicateAccount => StatusCode::CONFLICT,
            ServiceError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Connect(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Schema { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Driver errors can carry connection details; keep them in the logs only.
        let error = if status.is_server_error() {
            log::error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(ErrorResponse {
            success: false,
            error,
        })
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
