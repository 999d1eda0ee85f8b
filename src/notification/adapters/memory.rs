//! Mailer that keeps sent messages in memory.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::notification::ports::{MailMessage, Mailer, MailerError, MailerResult};

/// Collects messages instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMailer {
    outbox: Arc<RwLock<Vec<MailMessage>>>,
}

impl InMemoryMailer {
    /// Creates an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every message sent so far.
    ///
    /// # Errors
    ///
    /// Returns [`MailerError::Transport`] when the outbox lock is poisoned.
    pub fn sent(&self) -> MailerResult<Vec<MailMessage>> {
        self.outbox
            .read()
            .map(|outbox| outbox.clone())
            .map_err(|err| MailerError::transport(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl Mailer for InMemoryMailer {
    async fn send(&self, message: &MailMessage) -> MailerResult<()> {
        if message.to.is_empty() {
            return Err(MailerError::NoRecipients);
        }
        self.outbox
            .write()
            .map_err(|err| MailerError::transport(std::io::Error::other(err.to_string())))?
            .push(message.clone());
        Ok(())
    }
}
