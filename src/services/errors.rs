use axum::http::StatusCode;
use thiserror::Error;

use crate::infrastructure::graph::GraphError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Node not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to clients; internal causes stay in the logs.
    pub fn detail(&self) -> String {
        match self {
            ServiceError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<GraphError> for ServiceError {
    fn from(err: GraphError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}
