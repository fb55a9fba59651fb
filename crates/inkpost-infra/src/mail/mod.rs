//! Mail delivery implementations.

mod console;
mod memory;

pub use console::ConsoleMailer;
pub use memory::InMemoryMailer;

#[cfg(feature = "smtp")]
mod smtp;
#[cfg(feature = "smtp")]
pub use smtp::{SmtpConfig, SmtpMailer};

/// Mask the local part of an address for logging.
pub(crate) fn mask_address(address: &str) -> String {
    match address.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        None => "***".to_string(),
    }
}
