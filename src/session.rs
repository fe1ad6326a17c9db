//! Observable authentication state for the running client.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `Session` per process. It owns the only writer of `SessionState`;
//! pages, guards and the CLI hold `watch::Receiver`s and re-read on change.
//!
//! DESIGN
//! ======
//! Every transition is a single `send_replace`/`send_modify` of the whole
//! value, so a receiver never observes a user from one attempt paired with
//! the error of another. Overlapping calls are not serialized: whichever
//! resolves last publishes last.
//!
//! ERROR HANDLING
//! ==============
//! Sign-in operations publish their outcome and also return it. Failures land
//! in `SessionState::error` as the user-facing text from
//! `AuthError::user_message`. A failed attempt also clears the token store so
//! the persisted session and the published state agree.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::error::AuthResult;
use crate::net::auth::AuthApi;
use crate::token_store::TokenStore;
use crate::types::{Registration, Role, UserProfile};

/// Snapshot published to subscribers.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SessionState {
    pub user: Option<UserProfile>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    /// State before startup validation has finished.
    #[must_use]
    pub fn initializing() -> Self {
        Self { user: None, loading: true, error: None }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    #[must_use]
    pub fn is_customer(&self) -> bool {
        self.role() == Some(Role::Customer)
    }

    #[must_use]
    pub fn is_developer(&self) -> bool {
        self.role() == Some(Role::Developer)
    }

    fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }
}

pub struct Session {
    api: Arc<dyn AuthApi>,
    store: TokenStore,
    state: watch::Sender<SessionState>,
}

impl Session {
    /// Create a session in the initializing state. Call [`Session::init`]
    /// before trusting the published user.
    pub fn new(api: Arc<dyn AuthApi>, store: TokenStore) -> Self {
        let (state, _) = watch::channel(SessionState::initializing());
        Self { api, store, state }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Restore a persisted session and revalidate it against the backend.
    ///
    /// The cached profile is published first (still loading) so the UI can
    /// render optimistically; it is dropped if the backend rejects it.
    pub async fn init(&self) {
        let Some((_, cached)) = self.store.load() else {
            tracing::debug!("no persisted session");
            self.state.send_replace(SessionState::default());
            return;
        };

        self.state.send_replace(SessionState { user: Some(cached.clone()), loading: true, error: None });

        match self.api.fetch_current_user().await {
            Ok(current) => {
                tracing::info!(username = %current.username, "session restored");
                self.state.send_replace(SessionState { user: Some(cached), loading: false, error: None });
            }
            Err(e) => {
                tracing::warn!(error = %e, "persisted session rejected, signing out");
                self.store.clear();
                self.state.send_replace(SessionState::default());
            }
        }
    }

    /// # Errors
    ///
    /// Returns the sign-in failure after publishing it as the anonymous state.
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<UserProfile> {
        self.begin();
        let result = self.api.login(username, password).await;
        self.finish(result)
    }

    /// Create an account, then sign in with the same credentials.
    ///
    /// # Errors
    ///
    /// Returns the registration or sign-in failure after publishing it.
    pub async fn register(&self, registration: &Registration) -> AuthResult<UserProfile> {
        self.begin();
        let result = match self.api.register(registration).await {
            Ok(()) => self.api.login(&registration.username, &registration.password).await,
            Err(e) => Err(e),
        };
        self.finish(result)
    }

    /// Exchange an identity-provider credential for a session.
    ///
    /// # Errors
    ///
    /// Returns the exchange failure after publishing it.
    pub async fn google_login(&self, credential: &str) -> AuthResult<UserProfile> {
        self.begin();
        let result = self.api.exchange_google_credential(credential).await;
        self.finish(result)
    }

    /// Forget the session locally. No network call.
    pub fn logout(&self) {
        self.store.clear();
        self.state.send_replace(SessionState::default());
        tracing::info!("signed out");
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|state| state.error.take().is_some());
    }

    /// Tear down the session. Subscribers see the channel close.
    pub fn dispose(self) {
        tracing::debug!(subscribers = self.state.receiver_count(), "session disposed");
    }

    fn begin(&self) {
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });
    }

    fn finish(&self, result: AuthResult<UserProfile>) -> AuthResult<UserProfile> {
        match &result {
            Ok(user) => {
                self.state.send_replace(SessionState { user: Some(user.clone()), loading: false, error: None });
            }
            Err(e) => {
                tracing::warn!(error = %e, "authentication failed");
                self.store.clear();
                self.state.send_replace(SessionState { user: None, loading: false, error: Some(e.user_message()) });
            }
        }
        result
    }
}
