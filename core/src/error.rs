//! Error types for the auth API client.
//!
//! # Design
//! `ClientError` is the normalized failure every service call returns. It is
//! classified by how far the exchange got: the server answered with a
//! non-2xx status, the request went out but nothing came back, or the
//! request was never sent. `TransportError` is the narrower vocabulary a
//! `Transport` uses when it has no response to hand back.

use serde_json::Value;
use thiserror::Error;

use crate::http::HttpMethod;

/// Normalized failure returned by `AuthService` operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// The server answered with a status outside 200..=299.
    #[error("server responded with status {status}")]
    ServerResponded {
        status: u16,
        body: Value,
        /// First validation message of a 400 response, if one could be found.
        validation_message: Option<String>,
    },

    /// The request was dispatched but no response arrived.
    #[error("no response from server for {method} {url}: {message}")]
    NoResponse {
        method: HttpMethod,
        url: String,
        message: String,
    },

    /// The request could not be built or dispatched.
    #[error("request setup failed: {message}")]
    RequestSetup { message: String },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::ServerResponded { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&Value> {
        match self {
            ClientError::ServerResponded { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn validation_message(&self) -> Option<&str> {
        match self {
            ClientError::ServerResponded {
                validation_message, ..
            } => validation_message.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn setup(message: impl Into<String>) -> Self {
        ClientError::RequestSetup {
            message: message.into(),
        }
    }
}

/// Failure reported by a `Transport` when it has no response to return.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// Connection refused, timeout, reset, unreadable body.
    #[error("{method} {url}: {message}")]
    NoResponse {
        method: HttpMethod,
        url: String,
        message: String,
    },

    /// The transport could not turn the request into something sendable.
    #[error("{message}")]
    Setup { message: String },
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::NoResponse {
                method,
                url,
                message,
            } => ClientError::NoResponse {
                method,
                url,
                message,
            },
            TransportError::Setup { message } => ClientError::RequestSetup { message },
        }
    }
}
