//! Network execution of plain-data requests.
//!
//! # Design
//! `Transport` is the only seam that performs I/O. `ReqwestTransport` is the
//! production implementation; tests plug in in-memory transports. A
//! transport never interprets status codes: every response that arrives is
//! returned as `Ok`, and the interceptor decides what counts as success.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::redirect::Policy;
use tracing::trace;

use crate::config::ConfigError;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, MultipartForm, PartValue, RequestBody};

/// Executes an `HttpRequest` and returns whatever the server answered.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `reqwest`-backed transport.
///
/// Redirects are not followed so 3xx responses reach the caller as
/// failures. No timeout is set beyond reqwest's own defaults.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(ConfigError::Transport)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(reqwest_method(method), url.as_str());
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match body {
            Some(RequestBody::Json(json)) => builder.body(json),
            Some(RequestBody::Multipart(form)) => builder.multipart(multipart_form(form)?),
            None => builder,
        };
        let built = builder.build().map_err(|e| classify(e, method, &url))?;

        trace!(%method, %url, "dispatching request");
        let response = self
            .client
            .execute(built)
            .await
            .map_err(|e| classify(e, method, &url))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    v.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| classify(e, method, &url))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
    }
}

fn multipart_form(form: MultipartForm) -> Result<Form, TransportError> {
    let mut out = Form::new();
    for part in form.parts {
        out = match part.value {
            PartValue::Text(text) => out.text(part.name, text),
            PartValue::File {
                file_name,
                content_type,
                bytes,
            } => {
                let mut file = Part::bytes(bytes).file_name(file_name);
                if let Some(mime) = content_type {
                    file = file.mime_str(&mime).map_err(|e| TransportError::Setup {
                        message: format!("invalid content type for part {:?}: {e}", part.name),
                    })?;
                }
                out.part(part.name, file)
            }
        };
    }
    Ok(out)
}

/// Builder errors mean nothing was sent; everything else happened on the wire.
fn classify(err: reqwest::Error, method: HttpMethod, url: &str) -> TransportError {
    if err.is_builder() {
        TransportError::Setup {
            message: err.to_string(),
        }
    } else {
        TransportError::NoResponse {
            method,
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}
