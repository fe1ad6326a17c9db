//! Failure taxonomy shared by the API clients and the session.
//!
//! ERROR HANDLING
//! ==============
//! Variants are split by who made the call: local input checks
//! (`Validation`), the backend (`InvalidCredentials`, `Server`,
//! `SessionInvalid`) and the transport (`Network`). Only transport failures
//! are retried; everything else is a definitive answer.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use crate::storage::StorageError;

/// Message shown for any transport-level failure.
pub const NETWORK_RETRY_MESSAGE: &str = "Unable to reach the server. Please try again.";

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Input was rejected locally; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// The backend refused the username/password pair.
    #[error("{0}")]
    InvalidCredentials(String),

    /// The backend rejected the request and said why.
    #[error("server rejected request ({status}): {message}")]
    Server { status: u16, message: String },

    /// Broken connection, timeout, or a 5xx from the backend. The request
    /// may have reached the server.
    #[error("network error: {0}")]
    Network(String),

    /// The connection was never established, so the request was not sent.
    #[error("server unreachable: {0}")]
    Unreachable(String),

    /// The stored token was missing or refused on an authenticated call.
    #[error("session is no longer valid")]
    SessionInvalid,

    /// The session could not be persisted locally.
    #[error("session storage failed: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Whether repeating the same request could plausibly succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Unreachable(_))
    }

    /// Whether the request provably never left this process. Only these
    /// failures are safe to repeat for non-idempotent requests.
    #[must_use]
    pub fn is_unsent(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }

    /// Text suitable for an inline form message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) | Self::InvalidCredentials(message) | Self::Server { message, .. } => {
                message.clone()
            }
            Self::Network(_) | Self::Unreachable(_) => NETWORK_RETRY_MESSAGE.to_owned(),
            Self::SessionInvalid => "Your session has expired. Please sign in again.".to_owned(),
            Self::Storage(_) => "Could not save your session on this device.".to_owned(),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            return Self::Unreachable(err.to_string());
        }
        Self::Network(err.to_string())
    }
}
