//! Async client core for the auth API (login, registration, profile update).
//!
//! # Overview
//! Requests and responses are plain data. `ApiClient` builds requests, the
//! `interceptor` hooks normalize headers on the way out and failures on the
//! way back, and a `Transport` performs the actual I/O. `AuthService` wires
//! the three together into awaitable operations.
//!
//! # Design
//! - No global state: `AuthService` is constructed once from a
//!   `ClientConfig` and a transport, then shared by reference.
//! - JSON and multipart requests go through the same pipeline; the
//!   outbound hook decides whether to force or drop `content-type`.
//! - Every failure becomes a `ClientError` and is returned to the caller
//!   unchanged. There are no retries.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod interceptor;
pub mod service;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, MultipartForm, PartValue, RequestBody};
pub use service::AuthService;
pub use transport::{ReqwestTransport, Transport};
pub use types::{Credentials, Registration, UserUpdate};
