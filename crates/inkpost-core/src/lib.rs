//! # Inkpost Core
//!
//! The domain layer of the Inkpost blog.
//! Entities, form validation, pagination and the ports the infrastructure
//! layer implements. No database, HTTP or mail dependencies live here.

pub mod admin;
pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod search;
pub mod share;
pub mod similar;
pub mod slug;

pub use error::{DomainError, RepoError};
