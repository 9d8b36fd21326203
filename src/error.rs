//! Error types for the labtrend library

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LabError {
    #[error("invalid date '{input}', expected format 'dd MMM yyyy'")]
    InvalidDate { input: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed lab data: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "remote")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[cfg(feature = "remote")]
    #[error("invalid data source URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("no tests selected")]
    EmptySelection,

    #[error("graph not found: {0}")]
    GraphNotFound(String),

    #[error("test not found: {0}")]
    TestNotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, LabError>;

impl ResponseError for LabError {
    fn status_code(&self) -> StatusCode {
        match self {
            LabError::InvalidDate { .. } | LabError::EmptySelection | LabError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            LabError::GraphNotFound(_) | LabError::TestNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
