//! HTTP clients for the listing backend.

pub mod auth;
pub mod http;
pub mod properties;
pub mod retry;
