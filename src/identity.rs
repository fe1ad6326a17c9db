//! Seam for third-party sign-in widgets.
//!
//! DESIGN
//! ======
//! The session layer never talks to an identity SDK directly. A provider is
//! initialized with its client id and hands every credential it produces to
//! registered handlers, which typically forward it to
//! `Session::google_login`. Credentials are opaque: nothing here decodes or
//! verifies them.

#[cfg(test)]
#[path = "identity_test.rs"]
mod identity_test;

use crate::config::ClientConfig;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityConfig {
    pub client_id: String,
}

impl IdentityConfig {
    /// Identity settings carried by the client configuration, if any.
    #[must_use]
    pub fn from_client_config(config: &ClientConfig) -> Option<Self> {
        config.google_client_id.clone().map(|client_id| Self { client_id })
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("identity provider used before initialize()")]
    NotInitialized,

    #[error("identity provider client id is empty")]
    MissingClientId,

    #[error("identity provider produced an empty credential")]
    EmptyCredential,
}

pub type CredentialHandler = Box<dyn Fn(String) + Send + Sync>;

pub trait IdentityProvider {
    /// Configure the provider. Must be called before credentials flow.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is unusable.
    fn initialize(&mut self, config: IdentityConfig) -> Result<(), IdentityError>;

    /// Register a handler invoked with each credential, verbatim.
    fn on_credential(&mut self, handler: CredentialHandler);
}

/// Provider for credentials obtained out of band, e.g. an ID token pasted
/// from a browser sign-in.
#[derive(Default)]
pub struct CredentialRelay {
    config: Option<IdentityConfig>,
    handlers: Vec<CredentialHandler>,
}

impl CredentialRelay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn client_id(&self) -> Option<&str> {
        self.config.as_ref().map(|c| c.client_id.as_str())
    }

    /// Hand `credential` to every registered handler. Returns how many ran.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay is not initialized or the credential is
    /// blank.
    pub fn deliver(&self, credential: &str) -> Result<usize, IdentityError> {
        if self.config.is_none() {
            return Err(IdentityError::NotInitialized);
        }
        if credential.trim().is_empty() {
            return Err(IdentityError::EmptyCredential);
        }
        for handler in &self.handlers {
            handler(credential.to_owned());
        }
        tracing::debug!(handlers = self.handlers.len(), "identity credential delivered");
        Ok(self.handlers.len())
    }
}

impl IdentityProvider for CredentialRelay {
    fn initialize(&mut self, config: IdentityConfig) -> Result<(), IdentityError> {
        if config.client_id.trim().is_empty() {
            return Err(IdentityError::MissingClientId);
        }
        self.config = Some(config);
        Ok(())
    }

    fn on_credential(&mut self, handler: CredentialHandler) {
        self.handlers.push(handler);
    }
}
