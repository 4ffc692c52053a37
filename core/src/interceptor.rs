//! Outbound and inbound hooks applied around every transport call.
//!
//! # Design
//! Both hooks are plain functions over the plain-data request/response
//! types. `AuthService` composes them explicitly:
//! `before_send` -> `Transport::execute` -> `on_response`. Neither hook
//! ever turns a failure into a success.

use serde_json::Value;
use tracing::error;

use crate::error::{ClientError, TransportError};
use crate::http::{HttpRequest, HttpResponse, APPLICATION_JSON, CONTENT_TYPE};

/// Message logged when an error body carries no `message`.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// A response is successful iff its status is in 200..=299.
pub fn is_success_status(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Force a JSON content type, unless the body is multipart, in which case
/// drop the header so the transport can add the boundary itself.
///
/// Method, URL and body are left untouched.
pub fn before_send(mut request: HttpRequest) -> HttpRequest {
    if request.is_multipart() {
        request.remove_header(CONTENT_TYPE);
    } else {
        request.set_header(CONTENT_TYPE, APPLICATION_JSON);
    }
    request
}

/// Pass successful responses through, classify and log everything else.
pub fn on_response(
    result: Result<HttpResponse, TransportError>,
) -> Result<HttpResponse, ClientError> {
    match result {
        Ok(response) if response.is_success() => Ok(response),
        Ok(response) => Err(server_error(&response)),
        Err(TransportError::NoResponse {
            method,
            url,
            message,
        }) => {
            error!(%method, %url, reason = %message, "no response from server");
            Err(ClientError::NoResponse {
                method,
                url,
                message,
            })
        }
        Err(TransportError::Setup { message }) => {
            Err(setup_failed(ClientError::RequestSetup { message }))
        }
    }
}

fn server_error(response: &HttpResponse) -> ClientError {
    let status = response.status;
    let body = response.data();

    let errors = body.get("errors").cloned().unwrap_or(Value::Null);
    error!(status, reason = %error_reason(&body), %errors, %body, "server responded with an error");

    ClientError::ServerResponded {
        status,
        validation_message: extract_validation_message(status, &body),
        body,
    }
}

/// The body's `message` as logged, or a placeholder when it is falsy.
fn error_reason(body: &Value) -> String {
    body.get("message")
        .and_then(message_text)
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string())
}

/// Log a failure that happened before anything was sent and hand it back.
pub fn setup_failed(err: ClientError) -> ClientError {
    if let ClientError::RequestSetup { message } = &err {
        error!(reason = %message, "failed to set up request");
    }
    err
}

/// Pull a single user-facing message out of a 400 response body.
///
/// A truthy `errors` field wins: its first entry, unwrapped once more when
/// that entry is a list, even when that yields nothing. Otherwise a truthy
/// `message` is used. Any status other than 400 yields `None`.
pub fn extract_validation_message(status: u16, body: &Value) -> Option<String> {
    if status != 400 {
        return None;
    }
    match body.get("errors").filter(|errors| is_truthy(errors)) {
        None => body.get("message").and_then(message_text),
        Some(Value::Object(fields)) => fields.values().next().and_then(first_message),
        Some(Value::Array(entries)) => entries.first().and_then(first_message),
        Some(Value::String(text)) => Some(text.clone()),
        Some(_) => None,
    }
}

fn first_message(entry: &Value) -> Option<String> {
    match entry {
        Value::Array(items) => items.first().and_then(message_text),
        other => message_text(other),
    }
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        v if !is_truthy(v) => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// `null`, `false`, `0` and `""` count as absent.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
