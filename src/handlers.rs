//! Request handlers for the push listener.
//!
//! Every per-request failure is caught here and turned into a status code
//! through [`PushError`]; nothing escapes the handler boundary.

use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::constants::{
    ALIVE_MESSAGE, JSON_CONTENT_TYPE, NOT_FOUND_DETAIL, RECEIVED_MESSAGE, RECEIVE_PUSH_PATH,
    ROOT_PATH, STATUS_SUCCESS,
};
use crate::error::{ErrorBody, PushError};
use crate::logger::Console;

/// State shared by all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub console: Console,
}

/// Liveness response body.
#[derive(Debug, Serialize)]
pub struct AliveResponse {
    pub message: &'static str,
}

/// Acknowledgement sent back for an accepted payload.
#[derive(Debug, Serialize)]
pub struct PushAck {
    pub status: &'static str,
    pub message: &'static str,
    pub source_ip: String,
}

/// `GET /`
pub async fn root() -> Json<AliveResponse> {
    info!("Received GET request on {ROOT_PATH}");

    Json(AliveResponse {
        message: ALIVE_MESSAGE,
    })
}

/// `POST /receive_push`
///
/// Parses the body as an arbitrary JSON value, dumps it to the console and
/// acknowledges with the caller's IP. The `Content-Type` header is only
/// advisory: anything other than JSON is logged and parsing goes ahead.
///
/// # Errors
///
/// - 400 when the body is not valid JSON
/// - 500 when the payload cannot be written to the console
#[instrument(name = "receive_push", skip_all, fields(source_ip = %addr.ip()))]
pub async fn receive_push(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PushAck>, PushError> {
    let source_ip = addr.ip().to_string();
    info!("Received POST request on {RECEIVE_PUSH_PATH} from {source_ip}");

    match handle_payload(&state.console, &headers, &body) {
        Ok(()) => Ok(Json(PushAck {
            status: STATUS_SUCCESS,
            message: RECEIVED_MESSAGE,
            source_ip,
        })),
        Err(e @ PushError::InvalidJson(_)) => {
            debug!(error = %e, "JSON decode detail");
            error!("Failed to decode JSON from request body.");
            Err(e)
        }
        Err(e) => {
            error!(
                error = ?e,
                "An unexpected error occurred while processing request: {e}"
            );
            Err(e)
        }
    }
}

fn handle_payload(console: &Console, headers: &HeaderMap, body: &[u8]) -> Result<(), PushError> {
    let content_type = content_type(headers);
    if !is_json(&content_type) {
        warn!("Received request with unexpected Content-Type: {content_type}");
    }

    let payload: Value = serde_json::from_slice(body).map_err(PushError::InvalidJson)?;
    info!("Successfully parsed JSON payload.");

    console.dump_payload(&payload)
}

/// Lowercased `Content-Type`, or an empty string when absent or unreadable.
fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_lowercase)
        .unwrap_or_default()
}

/// Checks if a content type is JSON.
fn is_json(content_type: &str) -> bool {
    content_type.contains(JSON_CONTENT_TYPE)
}

/// Fallback for unknown routes.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new(NOT_FOUND_DETAIL)))
}
