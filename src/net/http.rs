//! Shared request plumbing for the REST clients.
//!
//! ERROR HANDLING
//! ==============
//! Responses are reduced to `(status, body)` before interpretation so status
//! mapping and message extraction stay pure and testable. Transport errors
//! and 5xx become `AuthError::Network`; 4xx become `AuthError::Server` with
//! the backend's own message when it sent one.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use reqwest::header::AUTHORIZATION;

use crate::config::{ClientConfig, ConfigError};
use crate::error::{AuthError, AuthResult};
use crate::net::retry::RetryPolicy;
use crate::token_store::TokenStore;

/// Status and body text of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Configured HTTP client plus base URL and retry policy.
#[derive(Clone)]
pub struct ApiTransport {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiTransport {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|e| ConfigError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.config.retry
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http.get(self.config.endpoint(path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http.post(self.config.endpoint(path))
    }

    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.http.put(self.config.endpoint(path))
    }

    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.http.delete(self.config.endpoint(path))
    }

    /// Send and read the full body. Fails only on transport errors.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unreachable` if no connection could be made, or
    /// `AuthError::Network` if the request failed after connecting.
    pub async fn send(&self, request: reqwest::RequestBuilder) -> AuthResult<ApiResponse> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(ApiResponse { status, body })
    }

    /// Send with the stored bearer token attached.
    ///
    /// A missing token fails before any request is sent; a 401 clears the
    /// store so no stale credential survives.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionInvalid` when there is no token or the
    /// backend rejects it, or `AuthError::Network` on transport failure.
    pub async fn send_authorized(
        &self,
        store: &TokenStore,
        request: reqwest::RequestBuilder,
    ) -> AuthResult<ApiResponse> {
        let token = store.token().ok_or(AuthError::SessionInvalid)?;
        let response = self.send(request.header(AUTHORIZATION, bearer(&token))).await?;
        if response.status == 401 {
            tracing::info!("bearer token rejected; clearing stored session");
            store.clear();
            return Err(AuthError::SessionInvalid);
        }
        Ok(response)
    }
}

pub(crate) fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Pull a human-readable message out of an error body.
///
/// JSON bodies are searched for each of `keys` in order; a short non-JSON
/// body is taken as the message itself.
pub fn error_message(body: &str, keys: &[&str]) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => keys
            .iter()
            .filter_map(|key| map.get(*key))
            .filter_map(serde_json::Value::as_str)
            .map(str::trim)
            .find(|message| !message.is_empty())
            .map(str::to_owned),
        Ok(serde_json::Value::String(message)) if !message.trim().is_empty() => Some(message),
        Ok(_) => None,
        Err(_) if trimmed.len() <= 200 && !trimmed.starts_with('<') => Some(trimmed.to_owned()),
        Err(_) => None,
    }
}

/// Map a non-2xx response to an error. `fallback` is used when the body
/// carries no message.
#[must_use]
pub fn classify_failure(response: &ApiResponse, keys: &[&str], fallback: &str) -> AuthError {
    let status = response.status;
    if status >= 500 {
        return AuthError::Network(format!("server unavailable (status {status})"));
    }
    let message = error_message(&response.body, keys).unwrap_or_else(|| fallback.to_owned());
    AuthError::Server { status, message }
}

/// Decode a 2xx body, treating a malformed payload as a backend fault.
///
/// # Errors
///
/// Returns `AuthError::Server` if the body does not match `T`.
pub fn parse_body<T: serde::de::DeserializeOwned>(response: &ApiResponse) -> AuthResult<T> {
    serde_json::from_str(&response.body).map_err(|e| {
        tracing::warn!(status = response.status, error = %e, "unexpected response body");
        AuthError::Server { status: response.status, message: "Unexpected response from server".to_owned() }
    })
}
