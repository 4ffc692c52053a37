//! Request payloads for the auth API.
//!
//! # Design
//! Service functions accept any `Serialize` payload; these are the shapes the
//! auth routes document. Response bodies are returned as `serde_json::Value`
//! because this layer does not validate them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::MultipartForm;

/// Body of `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Body of `POST /register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Payload of a profile update. The variant decides the wire format:
/// JSON goes out as `PUT`, multipart (file uploads) as `POST`.
#[derive(Debug, Clone, PartialEq)]
pub enum UserUpdate {
    Json(Value),
    Multipart(MultipartForm),
}

impl UserUpdate {
    /// JSON update from any serializable value.
    pub fn json<T: Serialize + ?Sized>(fields: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(fields).map(UserUpdate::Json)
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self, UserUpdate::Multipart(_))
    }
}

impl From<MultipartForm> for UserUpdate {
    fn from(form: MultipartForm) -> Self {
        UserUpdate::Multipart(form)
    }
}
