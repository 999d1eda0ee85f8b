//! Outgoing mail: task change notifications and administrator alerts.

pub mod adapters;
pub mod notifier;
pub mod ports;
pub mod recipients;

pub use notifier::{AdminMailer, TaskNotifier};
pub use ports::{MailMessage, Mailer, MailerError, MailerResult};
pub use recipients::{RecipientError, RecipientResolver};
