//! # Inkpost Shared
//!
//! Wire types of the admin JSON API, kept free of domain dependencies so
//! API clients can depend on them alone.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse, Paginated};
