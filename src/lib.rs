//! Session layer for the Prime Properties listing client.
//!
//! ARCHITECTURE
//! ============
//! Leaf to root: `storage` persists raw key/value pairs, `token_store` keeps
//! the bearer token and cached profile as one record, `net` talks to the REST
//! backend, `session` owns the observable auth state, and `guard` turns that
//! state into a navigation decision. `identity` is the seam for third-party
//! sign-in widgets.

pub mod config;
pub mod error;
pub mod guard;
pub mod identity;
pub mod net;
pub mod session;
pub mod storage;
pub mod token_store;
pub mod types;
pub mod validate;

pub use config::{ClientConfig, ConfigError};
pub use error::{AuthError, AuthResult};
pub use guard::{GuardDecision, RouteGuard};
pub use net::auth::{AuthApi, AuthClient};
pub use net::properties::{Property, PropertyClient, PropertyDraft, PropertyFilter};
pub use net::retry::RetryPolicy;
pub use session::{Session, SessionState};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use token_store::TokenStore;
pub use types::{Registration, Role, UserProfile};
