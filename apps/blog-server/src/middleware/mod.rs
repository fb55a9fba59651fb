//! Middleware modules.

pub mod error;
pub mod rate_limit;
pub mod request_id;

#[cfg(feature = "auth")]
pub mod auth;
