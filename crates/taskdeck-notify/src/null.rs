use async_trait::async_trait;
use tracing::info;

use crate::{Notifier, NotifyError};

/// Transport used when no mail API is configured: logs the send and drops it.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> Result<(), NotifyError> {
        info!("mail transport unconfigured, dropping mail to {to}: {subject}");
        Ok(())
    }
}
