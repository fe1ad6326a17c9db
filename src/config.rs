//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

use crate::net::retry::RetryPolicy;

pub const API_URL_VAR: &str = "ESTATE_API_URL";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_STORE_FILE: &str = ".estate-session.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),

    #[error("invalid API base URL '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: &'static str },

    #[error("http client build failed: {0}")]
    HttpClientBuild(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl HttpTimeouts {
    #[must_use]
    pub fn request(self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend origin without a trailing slash, e.g. `https://api.example.com`.
    pub api_url: String,
    /// Where `FileStorage` keeps the session record.
    pub store_path: PathBuf,
    pub timeouts: HttpTimeouts,
    pub retry: RetryPolicy,
    /// OAuth client id handed to the identity provider widget.
    pub google_client_id: Option<String>,
}

impl ClientConfig {
    /// Config for `api_url` with every other setting at its default.
    ///
    /// # Errors
    ///
    /// Returns an error if `api_url` is not an acceptable base URL.
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: validate_api_url(api_url)?,
            store_path: default_store_path(),
            timeouts: HttpTimeouts::default(),
            retry: RetryPolicy::default(),
            google_client_id: None,
        })
    }

    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `ESTATE_API_URL`: backend origin (`https://`, or `http://` for loopback)
    ///
    /// Optional: see [`ClientConfig::with_env_overrides`].
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = std::env::var(API_URL_VAR).map_err(|_| ConfigError::Missing(API_URL_VAR))?;
        Ok(Self::new(&api_url)?.with_env_overrides())
    }

    /// Apply optional environment settings on top of `self`.
    ///
    /// - `ESTATE_STORE_PATH`: session file location
    /// - `ESTATE_REQUEST_TIMEOUT_SECS`: default 30
    /// - `ESTATE_CONNECT_TIMEOUT_SECS`: default 10
    /// - `ESTATE_RETRY_MAX_ATTEMPTS`: default 3
    /// - `ESTATE_GOOGLE_CLIENT_ID`
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var("ESTATE_STORE_PATH") {
            if !path.trim().is_empty() {
                self.store_path = PathBuf::from(path);
            }
        }
        self.timeouts = HttpTimeouts {
            request_secs: env_parse_u64("ESTATE_REQUEST_TIMEOUT_SECS", self.timeouts.request_secs),
            connect_secs: env_parse_u64("ESTATE_CONNECT_TIMEOUT_SECS", self.timeouts.connect_secs),
        };
        if let Some(attempts) = std::env::var("ESTATE_RETRY_MAX_ATTEMPTS").ok().and_then(|v| v.parse::<u32>().ok()) {
            self.retry = self.retry.with_max_attempts(attempts);
        }
        if let Ok(client_id) = std::env::var("ESTATE_GOOGLE_CLIENT_ID") {
            if !client_id.trim().is_empty() {
                self.google_client_id = Some(client_id);
            }
        }
        self
    }

    #[must_use]
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Absolute URL for an API path starting with `/`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn default_store_path() -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) if !home.is_empty() => PathBuf::from(home).join(DEFAULT_STORE_FILE),
        _ => PathBuf::from(DEFAULT_STORE_FILE),
    }
}

/// Normalize a backend origin. Plain `http` is only accepted for loopback
/// hosts; everything else must be `https`.
///
/// # Errors
///
/// Returns an error for a missing scheme, empty host, or non-loopback `http`.
pub fn validate_api_url(raw: &str) -> Result<String, ConfigError> {
    let url = raw.trim().trim_end_matches('/').to_owned();
    let invalid = |reason| ConfigError::InvalidApiUrl { url: raw.to_owned(), reason };

    let (scheme, rest) = url.split_once("://").ok_or_else(|| invalid("missing scheme"))?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = host_of(authority);
    if host.is_empty() {
        return Err(invalid("missing host"));
    }

    match scheme.to_ascii_lowercase().as_str() {
        "https" => Ok(url),
        "http" if is_loopback(host) => Ok(url),
        "http" => Err(invalid("plain http is only allowed for loopback hosts")),
        _ => Err(invalid("scheme must be https")),
    }
}

fn host_of(authority: &str) -> &str {
    let authority = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    if let Some(rest) = authority.strip_prefix('[') {
        return rest.split(']').next().unwrap_or_default();
    }
    authority.split(':').next().unwrap_or_default()
}

fn is_loopback(host: &str) -> bool {
    host.eq_ignore_ascii_case("localhost")
        || host
            .parse::<std::net::IpAddr>()
            .is_ok_and(|ip| ip.is_loopback())
}
