//! In-memory mailer - keeps an outbox for inspection.

use async_trait::async_trait;
use tokio::sync::Mutex;

use inkpost_core::ports::{EmailMessage, MailError, Mailer};

/// Mailer that records messages instead of sending them.
#[derive(Debug, Default)]
pub struct InMemoryMailer {
    outbox: Mutex<Vec<EmailMessage>>,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, oldest first.
    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.outbox.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        if message.to.is_empty() {
            return Err(MailError::InvalidAddress("no recipients".to_string()));
        }
        self.outbox.lock().await.push(message);
        Ok(())
    }
}
