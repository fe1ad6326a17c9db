//! Authentication API client.
//!
//! SYSTEM CONTEXT
//! ==============
//! `Session` drives sign-in through the [`AuthApi`] trait; [`AuthClient`] is
//! the HTTP implementation. Successful sign-ins persist `{token, profile}`
//! to the `TokenStore` before returning, so callers never hold a profile the
//! store does not know about.
//!
//! ERROR HANDLING
//! ==============
//! Inputs are validated before any request. Network failures are retried per
//! the configured policy, except registration, which is only repeated when
//! the connection never opened. Backend rejections are returned on first
//! sight.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{ClientConfig, ConfigError};
use crate::error::{AuthError, AuthResult};
use crate::net::http::{ApiResponse, ApiTransport, classify_failure, error_message, parse_body};
use crate::net::retry::{with_retry, with_retry_unsent};
use crate::token_store::TokenStore;
use crate::types::{Registration, Role, UserProfile};
use crate::validate;

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const GOOGLE_PATH: &str = "/auth/google";
pub const ME_PATH: &str = "/auth/me";

/// Operations the session needs from an authentication backend.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange username/password for a session and persist it.
    async fn login(&self, username: &str, password: &str) -> AuthResult<UserProfile>;

    /// Create an account. Does not sign in.
    async fn register(&self, registration: &Registration) -> AuthResult<()>;

    /// Exchange an identity-provider credential for a session and persist it.
    async fn exchange_google_credential(&self, credential: &str) -> AuthResult<UserProfile>;

    /// Confirm the stored token is still accepted.
    async fn fetch_current_user(&self) -> AuthResult<UserProfile>;
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct GoogleRequest<'a> {
    credential: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    username: String,
    name: String,
    email: String,
    role: Role,
}

#[derive(Deserialize)]
struct GoogleResponse {
    token: String,
    user: UserProfile,
}

/// `/auth/me` may omit `username`; the backend identifies users by email.
#[derive(Deserialize)]
struct MeResponse {
    #[serde(default)]
    username: Option<String>,
    name: String,
    email: String,
    role: Role,
}

// =============================================================================
// PARSING
// =============================================================================

fn require_token(token: String, response: &ApiResponse) -> AuthResult<String> {
    if token.trim().is_empty() {
        return Err(AuthError::Server { status: response.status, message: "Server did not issue a token".to_owned() });
    }
    Ok(token)
}

fn parse_login(response: &ApiResponse) -> AuthResult<(String, UserProfile)> {
    let body: LoginResponse = parse_body(response)?;
    let token = require_token(body.token, response)?;
    Ok((token, UserProfile { username: body.username, name: body.name, email: body.email, role: body.role }))
}

fn parse_google(response: &ApiResponse) -> AuthResult<(String, UserProfile)> {
    let body: GoogleResponse = parse_body(response)?;
    let token = require_token(body.token, response)?;
    Ok((token, body.user))
}

fn parse_me(response: &ApiResponse) -> AuthResult<UserProfile> {
    let body: MeResponse = parse_body(response)?;
    let username = body.username.filter(|u| !u.trim().is_empty()).unwrap_or_else(|| body.email.clone());
    Ok(UserProfile { username, name: body.name, email: body.email, role: body.role })
}

fn login_failure(response: &ApiResponse) -> AuthError {
    if response.status == 401 {
        let message =
            error_message(&response.body, &["message"]).unwrap_or_else(|| "Invalid username or password".to_owned());
        return AuthError::InvalidCredentials(message);
    }
    classify_failure(response, &["message"], "Login failed")
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP implementation of [`AuthApi`].
#[derive(Clone)]
pub struct AuthClient {
    transport: ApiTransport,
    store: TokenStore,
}

impl AuthClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig, store: TokenStore) -> Result<Self, ConfigError> {
        Ok(Self { transport: ApiTransport::new(config)?, store })
    }

    #[must_use]
    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    fn persist(&self, token: &str, user: &UserProfile) -> AuthResult<()> {
        self.store.save(token, user)?;
        Ok(())
    }

    async fn login_once(&self, request: &LoginRequest<'_>) -> AuthResult<(String, UserProfile)> {
        let response = self.transport.send(self.transport.post(LOGIN_PATH).json(request)).await?;
        if !response.is_success() {
            return Err(login_failure(&response));
        }
        parse_login(&response)
    }

    async fn register_once(&self, registration: &Registration) -> AuthResult<()> {
        let response = self.transport.send(self.transport.post(REGISTER_PATH).json(registration)).await?;
        if !response.is_success() {
            return Err(classify_failure(&response, &["message"], "Registration failed"));
        }
        Ok(())
    }

    async fn google_once(&self, request: &GoogleRequest<'_>) -> AuthResult<(String, UserProfile)> {
        let response = self.transport.send(self.transport.post(GOOGLE_PATH).json(request)).await?;
        if !response.is_success() {
            return Err(classify_failure(&response, &["error", "message"], "Google authentication failed"));
        }
        parse_google(&response)
    }

    async fn me_once(&self) -> AuthResult<UserProfile> {
        let response = self.transport.send_authorized(&self.store, self.transport.get(ME_PATH)).await?;
        if response.status == 403 {
            self.store.clear();
            return Err(AuthError::SessionInvalid);
        }
        if !response.is_success() {
            return Err(classify_failure(&response, &["message"], "Failed to get user info"));
        }
        parse_me(&response)
    }
}

#[async_trait]
impl AuthApi for AuthClient {
    async fn login(&self, username: &str, password: &str) -> AuthResult<UserProfile> {
        validate::credentials(username, password)?;
        let request = LoginRequest { username: username.trim(), password };
        let (token, user) =
            with_retry(self.transport.retry_policy(), "login", || self.login_once(&request)).await?;
        self.persist(&token, &user)?;
        tracing::info!(username = %user.username, role = %user.role, "signed in");
        Ok(user)
    }

    async fn register(&self, registration: &Registration) -> AuthResult<()> {
        validate::registration(registration)?;
        // The account may already exist if a 5xx or timeout follows the insert.
        with_retry_unsent(self.transport.retry_policy(), "register", || self.register_once(registration)).await?;
        tracing::info!(username = %registration.username, role = %registration.role, "account registered");
        Ok(())
    }

    async fn exchange_google_credential(&self, credential: &str) -> AuthResult<UserProfile> {
        validate::identity_credential(credential)?;
        let request = GoogleRequest { credential };
        let (token, user) =
            with_retry(self.transport.retry_policy(), "google_exchange", || self.google_once(&request)).await?;
        self.persist(&token, &user)?;
        tracing::info!(username = %user.username, role = %user.role, "signed in with identity provider");
        Ok(user)
    }

    async fn fetch_current_user(&self) -> AuthResult<UserProfile> {
        with_retry(self.transport.retry_policy(), "fetch_current_user", || self.me_once()).await
    }
}
