use std::sync::Mutex;

use async_trait::async_trait;

use crate::{Notifier, NotifyError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Notifier that records every send in memory. Used by the service and
/// server tests to assert on notification behavior.
#[derive(Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<SentMail>>,
    fail: Mutex<bool>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail, for exercising swallow-on-failure paths.
    pub fn fail_sends(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), NotifyError> {
        if *self.fail.lock().unwrap() {
            return Err(NotifyError::Send("simulated failure".into()));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_sends_in_order() {
        let notifier = MemoryNotifier::new();
        notifier.send("a@b.c", "first", "<p>1</p>").await.unwrap();
        notifier.send("a@b.c", "second", "<p>2</p>").await.unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].subject, "first");
        assert_eq!(sent[1].subject, "second");
    }

    #[tokio::test]
    async fn fail_sends_errors() {
        let notifier = MemoryNotifier::new();
        notifier.fail_sends(true);
        assert!(notifier.send("a@b.c", "s", "b").await.is_err());
        assert_eq!(notifier.sent_count(), 0);
    }
}
