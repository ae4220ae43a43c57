//! Error types for the push listener.
//!
//! `ListenerError` covers process startup and is fatal. `PushError` covers a
//! single request and is always turned into an HTTP response.

use std::io;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::constants::INVALID_JSON_DETAIL;

/// Errors that stop the listener from starting or serving.
#[derive(Error, Debug)]
pub enum ListenerError {
    /// Represents an invalid `LISTENER_*` value.
    #[error("Config error: {0}")]
    Config(String),

    /// Represents a failure to bind the listening socket.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Represents a failure of the accept loop.
    #[error("Server error: {0}")]
    Serve(#[source] io::Error),

    /// Represents a failure to install the tracing subscriber.
    #[error("Logging error: {0}")]
    Logging(String),
}

/// A `Result` type alias for startup operations that can fail with a `ListenerError`.
pub type Result<T> = std::result::Result<T, ListenerError>;

/// Errors raised while handling one push request.
#[derive(Error, Debug)]
pub enum PushError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("failed to write payload to console: {0}")]
    Io(#[from] io::Error),

    #[error("console sink is poisoned")]
    ConsolePoisoned,
}

/// Body shape shared by every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl PushError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PushError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            PushError::Io(_) | PushError::ConsolePoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `detail` string sent back to the caller.
    pub fn detail(&self) -> String {
        match self {
            PushError::InvalidJson(_) => INVALID_JSON_DETAIL.to_string(),
            other => format!("Internal server error: {other}"),
        }
    }
}

impl IntoResponse for PushError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorBody::new(self.detail()))).into_response()
    }
}
