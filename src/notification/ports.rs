//! Mail transport port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Result type for mail delivery.
pub type MailerResult<T> = Result<T, MailerError>;

/// A rendered plain-text message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    /// Sender address.
    pub from: String,
    /// Recipient addresses.
    pub to: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

impl MailMessage {
    /// Creates a message.
    #[must_use]
    pub fn new(
        from: impl Into<String>,
        to: Vec<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to,
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Delivers mail.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends one message.
    async fn send(&self, message: &MailMessage) -> MailerResult<()>;
}

/// Errors raised by mail delivery.
#[derive(Debug, Clone, Error)]
pub enum MailerError {
    /// The message has no recipients.
    #[error("message has no recipients")]
    NoRecipients,
    /// A template failed to render.
    #[error("mail template failed: {0}")]
    Template(String),
    /// The transport rejected the message.
    #[error("mail transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl MailerError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
