//! Client configuration and its defaults.
//!
//! `ClientOptions` is the partial, caller-facing form where every field may
//! be left out; `ClientConfig` is what a client actually runs with, resolved
//! once at construction and never mutated afterwards.

use std::fmt;

use serde::Deserialize;

use crate::error::{ApiError, Result};

pub const DEFAULT_API_URL: &str = "https://api.dbhub.io";
pub const DEFAULT_API_ENDPOINT: &str = "/v1/query";
pub const DEFAULT_DB_OWNER: &str = "blakegearin";
pub const DEFAULT_DB_NAME: &str = "hex-to-css-filter-db.sqlite3";

const ENV_PREFIX: &str = "HEX_TO_CSS_FILTER_";

/// Optional overrides for `ClientConfig`. `None` selects the default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientOptions {
    pub api_url: Option<String>,
    pub api_endpoint: Option<String>,
    pub db_owner: Option<String>,
    pub db_name: Option<String>,
}

impl ClientOptions {
    /// Read overrides from `HEX_TO_CSS_FILTER_*` environment variables.
    /// Unset or empty variables stay `None`.
    pub fn from_env() -> Self {
        Self {
            api_url: env_var("API_URL"),
            api_endpoint: env_var("API_ENDPOINT"),
            db_owner: env_var("DB_OWNER"),
            db_name: env_var("DB_NAME"),
        }
    }
}

/// Resolved, immutable client configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_key: String,
    pub api_url: String,
    pub api_endpoint: String,
    pub db_owner: String,
    pub db_name: String,
}

impl ClientConfig {
    /// Resolve `options` against the defaults.
    ///
    /// Fails with `InvalidArgument` when `api_key` is empty or blank.
    pub fn new(api_key: &str, options: ClientOptions) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(ApiError::InvalidArgument("api_key"));
        }
        let api_url = options
            .api_url
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Ok(Self {
            api_key: api_key.to_string(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_endpoint: options
                .api_endpoint
                .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string()),
            db_owner: options
                .db_owner
                .unwrap_or_else(|| DEFAULT_DB_OWNER.to_string()),
            db_name: options
                .db_name
                .unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
        })
    }

    /// Build a configuration entirely from `HEX_TO_CSS_FILTER_*` variables.
    pub fn from_env() -> Result<Self> {
        let api_key = env_var("API_KEY").ok_or(ApiError::InvalidArgument("api_key"))?;
        Self::new(&api_key, ClientOptions::from_env())
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Full URL of the query endpoint.
    pub fn query_url(&self) -> String {
        format!("{}{}", self.api_url, self.api_endpoint)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("api_endpoint", &self.api_endpoint)
            .field("db_owner", &self.db_owner)
            .field("db_name", &self.db_name)
            .finish()
    }
}

fn env_var(suffix: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{suffix}"))
        .ok()
        .filter(|v| !v.is_empty())
}
