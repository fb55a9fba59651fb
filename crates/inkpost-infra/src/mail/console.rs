//! Console mailer - logs messages instead of delivering them.

use async_trait::async_trait;

use inkpost_core::ports::{EmailMessage, MailError, Mailer};

/// Development mailer: every message is written to the log.
#[derive(Debug, Default)]
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        let recipients: Vec<String> = message.to.iter().map(|a| super::mask_address(a)).collect();
        tracing::info!(
            from = %message.from,
            to = ?recipients,
            subject = %message.subject,
            "Email (console delivery)\n{}",
            message.body
        );
        Ok(())
    }
}
