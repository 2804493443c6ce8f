mod http;
mod memory;
mod null;

pub use http::HttpNotifier;
pub use memory::{MemoryNotifier, SentMail};
pub use null::NullNotifier;

use std::sync::Arc;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("send failed: {0}")]
    Send(String),
}

/// Outbound email capability. Sends are one-shot; failures are reported
/// to the caller and never retried here.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), NotifyError>;
}

/// Configuration for the mail transport and notification recipients.
#[derive(Debug, Clone, Default)]
pub struct NotifierConfig {
    /// Mail-delivery API endpoint. When `None`, sends are logged and dropped.
    pub mail_api_url: Option<String>,
    /// Bearer key for the mail-delivery API.
    pub mail_api_key: Option<String>,
    /// Sender address.
    pub mail_from: Option<String>,
    /// Fixed recipient for task status notifications.
    pub operator_email: Option<String>,
    /// Recipient for due-soon reminders.
    pub reminder_email: Option<String>,
}

impl NotifierConfig {
    pub fn from_env() -> Self {
        Self {
            mail_api_url: std::env::var("TASKDECK_MAIL_API_URL").ok(),
            mail_api_key: std::env::var("TASKDECK_MAIL_API_KEY").ok(),
            mail_from: std::env::var("TASKDECK_MAIL_FROM").ok(),
            operator_email: std::env::var("TASKDECK_OPERATOR_EMAIL").ok(),
            reminder_email: std::env::var("TASKDECK_REMINDER_EMAIL").ok(),
        }
    }
}

/// Create a `Notifier` from configuration. Without a mail API endpoint the
/// null transport is used, so notification paths stay exercisable in
/// development.
pub fn create_notifier(config: &NotifierConfig) -> Arc<dyn Notifier> {
    match &config.mail_api_url {
        Some(url) => Arc::new(HttpNotifier::new(
            url,
            config.mail_api_key.clone(),
            config.mail_from.clone(),
        )),
        None => Arc::new(NullNotifier),
    }
}
