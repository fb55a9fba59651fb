//! # Inkpost Infrastructure
//!
//! Concrete implementations of the ports defined in `inkpost-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - In-memory store and console mailer only
//! - `postgres` - PostgreSQL storage via SeaORM
//! - `auth` - JWT + Argon2 authentication
//! - `rate-limit` - Per-client rate limiting via governor
//! - `smtp` - SMTP mail delivery via lettre

pub mod database;
pub mod mail;
pub mod store;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-exports - In-Memory
pub use mail::{ConsoleMailer, InMemoryMailer};
pub use store::InMemoryBlogStore;

pub use database::DatabaseConfig;

#[cfg(feature = "postgres")]
pub use database::DatabaseConnections;

#[cfg(feature = "smtp")]
pub use mail::{SmtpConfig, SmtpMailer};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};
