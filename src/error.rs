use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("No usable ingredients in query")]
    EmptyQuery,

    #[error("Invalid constraint: {0}")]
    InvalidConstraint(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Get a sanitized error message safe for logging
    /// Filters out potentially sensitive information
    pub fn log_safe(&self) -> String {
        match self {
            // Store errors might contain schema or connection details
            Error::DataSource(_) => "Data source operation failed".to_string(),
            Error::Database(_) => "Database operation failed".to_string(),
            Error::Migration(_) => "Database migration failed".to_string(),

            Error::Http(_) => "External HTTP request failed".to_string(),

            Error::Internal(msg) => {
                if msg.to_lowercase().contains("password")
                    || msg.to_lowercase().contains("secret")
                    || msg.to_lowercase().contains("token")
                    || msg.to_lowercase().contains("key")
                {
                    "Internal error (details redacted)".to_string()
                } else {
                    format!("Internal error: {msg}")
                }
            }

            Error::EmptyQuery => "No usable ingredients in query".to_string(),
            Error::InvalidConstraint(msg) => format!("Invalid constraint: {msg}"),
            Error::InvalidUrl(_) => "Invalid URL provided".to_string(),
            Error::Io(_) => "File system operation failed".to_string(),
            Error::Config(msg) => format!("Configuration error: {msg}"),
            Error::Validation(msg) => format!("Validation error: {msg}"),
        }
    }

    /// Whether the caller can fix the request and retry
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::EmptyQuery | Error::InvalidConstraint(_) | Error::Validation(_)
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if self.is_user_error() {
            tracing::debug!("Rejected request: {}", self.log_safe());
        } else {
            tracing::error!("Request error: {}", self.log_safe());
        }

        let (status, error_message) = match &self {
            Error::EmptyQuery => (StatusCode::BAD_REQUEST, self.to_string()),
            Error::InvalidConstraint(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Error::DataSource(_) | Error::Database(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Recipe store unavailable".to_string(),
            ),
            Error::Http(_) => (
                StatusCode::BAD_GATEWAY,
                "External service error".to_string(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
