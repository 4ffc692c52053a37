//! Client configuration.
//!
//! The only input is the API base address, supplied explicitly or read from
//! the `API_URL` environment variable.

use thiserror::Error;
use url::Url;

/// Environment variable holding the API base address.
pub const BASE_URL_ENV: &str = "API_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API_URL is not set")]
    MissingBaseUrl,

    #[error("invalid base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP transport: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Immutable configuration shared by every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingBaseUrl);
        }
        Url::parse(trimmed).map_err(|source| ConfigError::InvalidBaseUrl {
            url: trimmed.to_string(),
            source,
        })?;
        Ok(Self {
            base_url: trimmed.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(BASE_URL_ENV) {
            Ok(value) => Self::new(&value),
            Err(_) => Err(ConfigError::MissingBaseUrl),
        }
    }

    /// Base address without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
