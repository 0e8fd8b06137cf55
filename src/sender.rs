use crate::error::DeliveryError;
use crate::event::EventRecord;
use crate::utils::redact_endpoint;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// What the endpoint answered. Any status, 2xx or not, lands here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResult {
    pub status_code: u16,
    pub body: String,
}

impl SendResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, endpoint_url: &str, record: &EventRecord)
        -> Result<SendResult, DeliveryError>;
}

/// Delivers event records with one HTTP POST per call. Never retries.
#[derive(Debug, Clone)]
pub struct WebhookSender {
    client: Client,
    timeout: Option<Duration>,
}

impl WebhookSender {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            timeout: None,
        }
    }

    /// Bounds the whole request, connect through body read.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout: Some(timeout),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for WebhookSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for WebhookSender {
    async fn send(
        &self,
        endpoint_url: &str,
        record: &EventRecord,
    ) -> Result<SendResult, DeliveryError> {
        let body = record.to_json()?;
        let endpoint = redact_endpoint(endpoint_url);
        // reqwest errors embed the full request URL; only the redacted form
        // may reach the message.
        let transport = |source: reqwest::Error| DeliveryError::Transport {
            endpoint: endpoint.clone(),
            source: source.without_url(),
        };

        debug!(endpoint = %endpoint, bytes = body.len(), "posting event record");

        let mut request = self
            .client
            .post(endpoint_url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(transport)?;
        let status_code = response.status().as_u16();
        let body = response.text().await.map_err(transport)?;

        debug!(endpoint = %endpoint, status_code, "endpoint responded");
        Ok(SendResult { status_code, body })
    }
}
