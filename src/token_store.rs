//! Persisted bearer token + cached profile.
//!
//! SYSTEM CONTEXT
//! ==============
//! The token and the profile are only meaningful together: the session
//! restores the profile at startup and the API clients send the token. Both
//! live in one record under `SESSION_KEY`, so there is no write ordering in
//! which one exists without the other.
//!
//! TRADE-OFFS
//! ==========
//! Older clients kept the two halves under separate `token` / `user` keys. A
//! complete legacy pair is migrated on read; a lone half is treated as no
//! session at all rather than as an error.

#[cfg(test)]
#[path = "token_store_test.rs"]
mod token_store_test;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::storage::{MemoryStorage, Storage, StorageError};
use crate::types::UserProfile;

pub const SESSION_KEY: &str = "session";
pub const LEGACY_TOKEN_KEY: &str = "token";
pub const LEGACY_USER_KEY: &str = "user";

#[derive(Serialize)]
struct StoredSessionRef<'a> {
    token: &'a str,
    user: &'a UserProfile,
}

#[derive(Deserialize)]
struct StoredSession {
    token: String,
    user: UserProfile,
}

/// Handle to the persisted session. Clones share the same backend.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn Storage>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Store backed by a fresh process-local map.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Persist token and profile as one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be encoded or written.
    pub fn save(&self, token: &str, user: &UserProfile) -> Result<(), StorageError> {
        let record = serde_json::to_string(&StoredSessionRef { token, user })?;
        self.storage.set(SESSION_KEY, &record)?;
        self.remove_quietly(LEGACY_TOKEN_KEY);
        self.remove_quietly(LEGACY_USER_KEY);
        Ok(())
    }

    /// Both halves of the session, or nothing.
    pub fn load(&self) -> Option<(String, UserProfile)> {
        match self.storage.get(SESSION_KEY) {
            Ok(Some(raw)) => return parse_record(&raw),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "session record unreadable; treating as signed out");
                return None;
            }
        }
        self.load_legacy()
    }

    /// Remove every session key. Never fails; storage errors are logged.
    ///
    /// If the record cannot be removed it is overwritten with an empty value,
    /// which `load` treats as signed out and which also masks legacy keys.
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(SESSION_KEY) {
            tracing::warn!(error = %e, "failed to remove session record; overwriting it");
            if let Err(e) = self.storage.set(SESSION_KEY, "") {
                tracing::warn!(error = %e, "failed to overwrite session record");
            }
        }
        self.remove_quietly(LEGACY_TOKEN_KEY);
        self.remove_quietly(LEGACY_USER_KEY);
        if self.load().is_some() {
            tracing::error!("session still present after clear; storage is not writable");
        }
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        self.load().is_some()
    }

    /// Bearer token for authenticated requests.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.load().map(|(token, _)| token)
    }

    fn remove_quietly(&self, key: &str) {
        if let Err(e) = self.storage.remove(key) {
            tracing::warn!(key, error = %e, "failed to remove session key");
        }
    }

    fn load_legacy(&self) -> Option<(String, UserProfile)> {
        let token = self.storage.get(LEGACY_TOKEN_KEY).ok().flatten()?;
        let raw_user = self.storage.get(LEGACY_USER_KEY).ok().flatten()?;
        let user: UserProfile = serde_json::from_str(&raw_user).ok()?;
        if token.is_empty() {
            return None;
        }
        tracing::debug!(username = %user.username, "migrating legacy session keys");
        if let Err(e) = self.save(&token, &user) {
            tracing::warn!(error = %e, "legacy session migration failed");
        }
        Some((token, user))
    }
}

fn parse_record(raw: &str) -> Option<(String, UserProfile)> {
    let record: StoredSession = serde_json::from_str(raw).ok()?;
    if record.token.is_empty() {
        return None;
    }
    Some((record.token, record.user))
}
