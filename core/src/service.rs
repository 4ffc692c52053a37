//! Async auth operations over a `Transport`.
//!
//! Every call runs the same pipeline: `ApiClient::build_*`,
//! `interceptor::before_send`, `Transport::execute`, then
//! `ApiClient::parse_response`. Failures are logged and returned unchanged.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::ApiClient;
use crate::config::{ClientConfig, ConfigError};
use crate::error::ClientError;
use crate::http::HttpRequest;
use crate::interceptor;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::UserUpdate;

/// Auth API entry point, built once at startup and shared by reference.
#[derive(Debug, Clone)]
pub struct AuthService<T> {
    client: ApiClient,
    transport: T,
}

impl AuthService<ReqwestTransport> {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config, ReqwestTransport::new()?))
    }
}

impl<T: Transport> AuthService<T> {
    pub fn new(config: &ClientConfig, transport: T) -> Self {
        Self {
            client: ApiClient::new(config),
            transport,
        }
    }

    /// `POST /login`. Resolves to the response body (token and user record).
    pub async fn login<C: Serialize + ?Sized>(&self, credentials: &C) -> Result<Value, ClientError> {
        log_outcome("login", self.send(self.client.build_login(credentials)).await)
    }

    /// `POST /register`. Same contract as `login`.
    pub async fn register<C: Serialize + ?Sized>(
        &self,
        registration: &C,
    ) -> Result<Value, ClientError> {
        log_outcome("register", self.send(self.client.build_register(registration)).await)
    }

    /// `PUT /update-user/{id}` for JSON updates, `POST` for multipart ones.
    pub async fn update_user(
        &self,
        user_id: u64,
        update: UserUpdate,
        token: &str,
    ) -> Result<Value, ClientError> {
        let built = self.client.build_update_user(user_id, &update, token);
        log_outcome("update_user", self.send(built).await)
    }

    async fn send(&self, built: Result<HttpRequest, ClientError>) -> Result<Value, ClientError> {
        let request = interceptor::before_send(built.map_err(interceptor::setup_failed)?);
        debug!(method = %request.method, url = %request.url, multipart = request.is_multipart(), "sending request");
        let result = self.transport.execute(request).await;
        if let Ok(response) = &result {
            info!(status = response.status, "received response");
        }
        self.client.parse_response(result)
    }
}

fn log_outcome(operation: &str, result: Result<Value, ClientError>) -> Result<Value, ClientError> {
    match &result {
        Ok(data) => debug!(operation, %data, "request succeeded"),
        Err(e) => warn!(operation, error = %e, "request failed"),
    }
    result
}
