/// Centralized helpers for WebSocket and HTTP error responses.
///
/// Use these helpers to ensure all error replies are consistent: a command that fails
/// is answered with its own `*Result` event carrying the error status and detail.
use actix_web::{HttpResponse, http::StatusCode};
use serde_json::json;

use crate::server::error::EngineError;
use crate::server::events::{CommandResult, ResultKind, ServerEvent};

/// Builds the `*Result` event answering a failed command.
///
/// # Arguments
/// - `kind`: Command being answered (e.g. `ResultKind::SearchGame`).
/// - `err`: Failure to report.
pub fn error_result(kind: ResultKind, err: &EngineError) -> ServerEvent {
    kind.event(CommandResult::new(err.status()).detail(err.public_detail()))
}

/// Returns the event sent before closing a duplicate connection.
pub fn already_logged_in_event() -> ServerEvent {
    ServerEvent::error("ALREADY_LOGGED_IN", "This user is already connected.")
}

/// Returns the event sent for an unknown or unparsable frame.
pub fn invalid_message_event(context: &str) -> ServerEvent {
    ServerEvent::error("INVALID_MESSAGE", context)
}

/// Returns an HTTP error response with a JSON body.
///
/// # Arguments
/// - `code`: Unique error code.
/// - `message`: Human-readable error message.
/// - `status`: HTTP status code.
pub fn http_error_response(code: &str, message: &str, status: StatusCode) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "error": { "code": code, "message": message }
    }))
}
