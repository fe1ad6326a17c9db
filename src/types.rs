//! Identity DTOs shared by the token store, API clients and session.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const CUSTOMER_DASHBOARD_PATH: &str = "/customer/dashboard";
pub const DEVELOPER_DASHBOARD_PATH: &str = "/developer/dashboard";

/// Account role as issued by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Customer,
    Developer,
    /// Any role string this client does not know about.
    #[serde(other)]
    Unknown,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "CUSTOMER",
            Self::Developer => "DEVELOPER",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Landing dashboard for this role, if it has one.
    #[must_use]
    pub fn dashboard_path(self) -> Option<&'static str> {
        match self {
            Self::Customer => Some(CUSTOMER_DASHBOARD_PATH),
            Self::Developer => Some(DEVELOPER_DASHBOARD_PATH),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "CUSTOMER" => Ok(Self::Customer),
            "DEVELOPER" => Ok(Self::Developer),
            other => Err(format!("unknown role '{other}' (expected CUSTOMER or DEVELOPER)")),
        }
    }
}

/// Cached identity of the signed-in user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Login identifier. OAuth accounts use their email here.
    pub username: String,
    /// Display name.
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Sign-up form payload, sent as-is to `POST /auth/register`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}
