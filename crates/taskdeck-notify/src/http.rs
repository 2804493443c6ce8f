use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::{Notifier, NotifyError};

#[derive(Serialize)]
struct MailRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<&'a str>,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Notifier that posts messages to an HTTP mail-delivery API.
pub struct HttpNotifier {
    endpoint: String,
    client: Client,
    api_key: Option<String>,
    from: Option<String>,
}

impl HttpNotifier {
    pub fn new(endpoint: &str, api_key: Option<String>, from: Option<String>) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client: Client::new(),
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), NotifyError> {
        let body = MailRequest {
            from: self.from.as_deref(),
            to,
            subject,
            html: html_body,
        };
        let mut builder = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }
        let resp = builder
            .send()
            .await
            .map_err(|e| NotifyError::Send(e.to_string()))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(NotifyError::Send(format!(
                "mail api answered {}",
                resp.status()
            )))
        }
    }
}
