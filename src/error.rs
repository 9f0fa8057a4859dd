use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::users::{password::PasswordError, repo::RepoError};

/// Errors surfaced by the user service and turned into HTTP responses by the handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid user id `{0}`")]
    InvalidId(String),

    #[error("{0} already taken")]
    Conflict(String),

    #[error("password hashing failed: {0}")]
    Hash(#[from] PasswordError),

    #[error("store failure: {0}")]
    Store(#[source] sqlx::Error),
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict { field } => ApiError::Conflict(field.to_string()),
            RepoError::Store(e) => ApiError::Store(e),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidId(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Hash(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
            return (status, "Internal server error".to_string()).into_response();
        }
        (status, self.to_string()).into_response()
    }
}
