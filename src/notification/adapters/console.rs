//! Mailer that writes messages to the log.

use async_trait::async_trait;
use tracing::info;

use crate::notification::ports::{MailMessage, Mailer, MailerError, MailerResult};

/// Logs each message at `info` level instead of delivering it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMailer;

#[async_trait]
impl Mailer for ConsoleMailer {
    async fn send(&self, message: &MailMessage) -> MailerResult<()> {
        if message.to.is_empty() {
            return Err(MailerError::NoRecipients);
        }
        info!(
            from = %message.from,
            to = %message.to.join(", "),
            subject = %message.subject,
            body = %message.body,
            "mail message"
        );
        Ok(())
    }
}
