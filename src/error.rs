use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Profile limit of {0} reached")]
    ProfileLimit(usize),

    #[error("The last remaining profile cannot be removed")]
    LastProfile,

    #[error("Title {0} is already in the list")]
    AlreadyInList(u64),

    #[error("Incorrect PIN")]
    IncorrectPin,

    #[error("Profile {0} is locked after too many failed attempts")]
    Locked(String),

    #[error("No profile selected")]
    NoActiveProfile,

    #[error("No profile is awaiting confirmation")]
    NothingPending,

    #[error("This content is not available for kids")]
    ContentBlocked,

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) | AppError::NothingPending => StatusCode::BAD_REQUEST,
            AppError::ProfileLimit(_) | AppError::LastProfile | AppError::AlreadyInList(_) => {
                StatusCode::CONFLICT
            }
            AppError::IncorrectPin | AppError::NoActiveProfile => StatusCode::UNAUTHORIZED,
            AppError::Locked(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::ContentBlocked => StatusCode::FORBIDDEN,
            AppError::ExternalApi(_) | AppError::HttpClient(_) => StatusCode::BAD_GATEWAY,
            AppError::Storage(_)
            | AppError::Serialization(_)
            | AppError::Cache(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
