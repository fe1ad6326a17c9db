//! Navigation decision for role-protected views.
//!
//! Pure function of a `SessionState` snapshot; `resolve` only adds the wait
//! for startup validation to finish.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use serde::Serialize;
use tokio::sync::watch;

use crate::session::SessionState;
use crate::types::Role;

/// Application entry point, where anonymous users are sent.
pub const ENTRY_PATH: &str = "/";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "path", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Session is still being restored; show a loading placeholder.
    Placeholder,
    Redirect(&'static str),
    Render,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouteGuard {
    required: Option<Role>,
}

impl RouteGuard {
    /// Any signed-in user may pass.
    #[must_use]
    pub fn authenticated() -> Self {
        Self { required: None }
    }

    #[must_use]
    pub fn require(role: Role) -> Self {
        Self { required: Some(role) }
    }

    #[must_use]
    pub fn required(&self) -> Option<Role> {
        self.required
    }

    #[must_use]
    pub fn check(&self, state: &SessionState) -> GuardDecision {
        if state.loading {
            return GuardDecision::Placeholder;
        }
        let Some(user) = &state.user else {
            return GuardDecision::Redirect(ENTRY_PATH);
        };
        match self.required {
            Some(required) if user.role != required => {
                GuardDecision::Redirect(user.role.dashboard_path().unwrap_or(ENTRY_PATH))
            }
            _ => GuardDecision::Render,
        }
    }

    /// Wait until the session stops loading, then decide. A closed session
    /// channel sends the user to the entry point.
    pub async fn resolve(&self, session: &mut watch::Receiver<SessionState>) -> GuardDecision {
        match session.wait_for(|state| !state.loading).await {
            Ok(state) => self.check(&state),
            Err(_) => GuardDecision::Redirect(ENTRY_PATH),
        }
    }
}
