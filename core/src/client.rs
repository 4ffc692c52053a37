//! Stateless HTTP request builder and response parser for the auth API.
//!
//! # Design
//! `ApiClient` holds the base URL and default headers and carries no mutable
//! state between calls. Each operation has a `build_*` method producing an
//! `HttpRequest`; `parse_response` consumes whatever the transport returned
//! and runs the inbound hook. The caller (usually `AuthService`) executes
//! the round-trip in between.

use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ClientError, TransportError};
use crate::http::{
    HttpMethod, HttpRequest, HttpResponse, RequestBody, ACCEPT, APPLICATION_JSON, AUTHORIZATION,
    CONTENT_TYPE,
};
use crate::interceptor;
use crate::types::UserUpdate;

/// Synchronous, stateless client for the auth API.
///
/// Cheap to clone and safe to share between concurrent calls.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    default_headers: Vec<(String, String)>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url().to_string(),
            default_headers: vec![
                (ACCEPT.to_string(), APPLICATION_JSON.to_string()),
                (CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()),
            ],
        }
    }

    pub fn build_login<C: Serialize + ?Sized>(
        &self,
        credentials: &C,
    ) -> Result<HttpRequest, ClientError> {
        Ok(self.request(HttpMethod::Post, "/login", Some(json_body(credentials)?)))
    }

    pub fn build_register<C: Serialize + ?Sized>(
        &self,
        registration: &C,
    ) -> Result<HttpRequest, ClientError> {
        Ok(self.request(HttpMethod::Post, "/register", Some(json_body(registration)?)))
    }

    /// JSON updates use `PUT`; multipart updates use `POST`, which is what
    /// the server accepts for file uploads.
    pub fn build_update_user(
        &self,
        user_id: u64,
        update: &UserUpdate,
        token: &str,
    ) -> Result<HttpRequest, ClientError> {
        let path = format!("/update-user/{user_id}");
        let mut req = match update {
            UserUpdate::Json(fields) => {
                self.request(HttpMethod::Put, &path, Some(json_body(fields)?))
            }
            UserUpdate::Multipart(form) => self.request(
                HttpMethod::Post,
                &path,
                Some(RequestBody::Multipart(form.clone())),
            ),
        };
        req.set_header(AUTHORIZATION, format!("Bearer {token}"));
        Ok(req)
    }

    /// Run the inbound hook and return the parsed body of a successful
    /// response.
    pub fn parse_response(
        &self,
        result: Result<HttpResponse, TransportError>,
    ) -> Result<Value, ClientError> {
        interceptor::on_response(result).map(|response| response.data())
    }

    fn request(&self, method: HttpMethod, path: &str, body: Option<RequestBody>) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers: self.default_headers.clone(),
            body,
        }
    }
}

fn json_body<T: Serialize + ?Sized>(value: &T) -> Result<RequestBody, ClientError> {
    serde_json::to_string(value)
        .map(RequestBody::Json)
        .map_err(|e| ClientError::setup(format!("failed to serialize request body: {e}")))
}
