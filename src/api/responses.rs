// src/api/responses.rs
//! Decoding of Notion response bodies, successful or not.

use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::{AppError, NotionErrorCode, RemoteError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Notion's error object: `{"object": "error", "status", "code", "message"}`.
#[derive(Debug, Deserialize)]
struct NotionErrorBody {
    code: String,
    message: String,
    #[serde(default)]
    request_id: Option<String>,
}

/// Decodes a successful response into a domain type.
pub(crate) fn decode<T: DeserializeOwned>(value: Value, context: &str) -> Result<T, AppError> {
    serde_json::from_value(value).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", context, e);
        AppError::MalformedResponse(format!("{}: {}", context, e))
    })
}

/// Parses a response body into JSON. An empty body decodes to `null`.
pub(crate) fn parse_body(body: &str, context: &str) -> Result<Value, AppError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| {
        AppError::MalformedResponse(format!("{}: {} (body: {})", context, e, preview(body)))
    })
}

/// Builds the typed error for a non-2xx response.
///
/// Falls back to the HTTP status when the body is not a Notion error object.
pub(crate) fn remote_error(status: u16, body: &str, context: &str) -> RemoteError {
    match serde_json::from_str::<NotionErrorBody>(body) {
        Ok(error) => RemoteError {
            request_id: error.request_id,
            ..RemoteError::new(
                status,
                NotionErrorCode::from_api_response(&error.code),
                error.message,
            )
        },
        Err(_) => RemoteError::new(
            status,
            NotionErrorCode::from_http_status(status),
            format!("HTTP {} from {}: {}", status, context, preview(body)),
        ),
    }
}

fn preview(body: &str) -> String {
    if body.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
        let cut: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        format!("{}...", cut)
    } else {
        body.to_string()
    }
}
