use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failures talking to the external statistics provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to stats provider failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("stats provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode stats provider response: {0}")]
    Decode(String),
}

/// Failures while reshaping a stat table.
#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("column '{0}' is not numeric")]
    NonNumericColumn(String),

    #[error("column '{column}' contains a value that cannot be represented in JSON")]
    NonFiniteValue { column: String },

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("column '{column}' has {found} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },
}

/// Anything that can go wrong between fetching and serializing a stats pipeline.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Debug)]
pub enum ApiError {
    InvalidArgument(String),
    Upstream(StatsError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::InvalidArgument(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Upstream(err) => {
                tracing::error!("Stats pipeline failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("An error occurred: {}", err),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            detail,
        });

        (status, body).into_response()
    }
}

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        ApiError::Upstream(err)
    }
}
