use crate::error::DeliveryError;
use crate::event::EventRecord;
use crate::sender::{Notifier, SendResult};
use crate::utils::{redact_endpoint, truncate_for_log};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::fs::{create_dir_all, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// One send outcome as seen by hooks. Carries no payload contents beyond the
/// issue type, so logs stay free of customer details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub sent_at: DateTime<Utc>,
    pub endpoint: String,
    pub issue_type: String,
    pub event_timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl DeliveryReport {
    pub fn new(
        endpoint_url: &str,
        record: &EventRecord,
        outcome: &Result<SendResult, DeliveryError>,
    ) -> Self {
        let (status_code, error) = match outcome {
            Ok(result) => (Some(result.status_code), None),
            Err(err) => (None, Some(err.to_string())),
        };
        Self {
            sent_at: Utc::now(),
            endpoint: redact_endpoint(endpoint_url),
            issue_type: record.issue_type().to_string(),
            event_timestamp: record.timestamp(),
            status_code,
            error,
        }
    }
}

#[async_trait]
pub trait DeliveryHook: Send + Sync {
    async fn on_delivery(&self, report: &DeliveryReport) -> Result<()>;
}

/// Runs every hook after each send. Hooks only observe: a failing hook is
/// logged and the send outcome is returned untouched.
pub struct HookedSender {
    inner: Arc<dyn Notifier>,
    hooks: Vec<Arc<dyn DeliveryHook>>,
}

impl HookedSender {
    pub fn new(inner: Arc<dyn Notifier>, hooks: Vec<Arc<dyn DeliveryHook>>) -> Self {
        Self { inner, hooks }
    }
}

#[async_trait]
impl Notifier for HookedSender {
    async fn send(
        &self,
        endpoint_url: &str,
        record: &EventRecord,
    ) -> Result<SendResult, DeliveryError> {
        let outcome = self.inner.send(endpoint_url, record).await;
        let report = DeliveryReport::new(endpoint_url, record, &outcome);

        for hook in &self.hooks {
            if let Err(error) = hook.on_delivery(&report).await {
                warn!("delivery hook failed: {:#}", error);
            }
        }

        outcome
    }
}

pub struct JsonlDeliveryLog {
    writer: Mutex<File>,
}

impl JsonlDeliveryLog {
    pub async fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)
                    .await
                    .with_context(|| format!("creating delivery log directory {}", parent.display()))?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .with_context(|| format!("opening delivery log {}", path.display()))?;

        Ok(Self {
            writer: Mutex::new(file),
        })
    }
}

#[async_trait]
impl DeliveryHook for JsonlDeliveryLog {
    async fn on_delivery(&self, report: &DeliveryReport) -> Result<()> {
        let serialized = serde_json::to_string(report).context("serializing delivery report")?;
        let mut writer = self.writer.lock().await;
        writer.write_all(serialized.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Hooks for one run: the console summary, plus the JSONL log when a path
/// is configured. A log that cannot be opened is skipped with a warning so
/// delivery still happens.
pub async fn delivery_hooks(delivery_log: Option<&Path>) -> Vec<Arc<dyn DeliveryHook>> {
    let mut hooks: Vec<Arc<dyn DeliveryHook>> = vec![Arc::new(ConsoleReportHook)];
    if let Some(path) = delivery_log {
        match JsonlDeliveryLog::new(path).await {
            Ok(log) => hooks.push(Arc::new(log)),
            Err(error) => warn!("delivery log disabled: {:#}", error),
        }
    }
    hooks
}

pub struct ConsoleReportHook;

#[async_trait]
impl DeliveryHook for ConsoleReportHook {
    async fn on_delivery(&self, report: &DeliveryReport) -> Result<()> {
        match (report.status_code, &report.error) {
            (Some(code), _) if (200..300).contains(&code) => info!(
                endpoint = %report.endpoint,
                issue_type = %report.issue_type,
                status_code = code,
                "case delivered"
            ),
            (Some(code), _) => warn!(
                endpoint = %report.endpoint,
                issue_type = %report.issue_type,
                status_code = code,
                "endpoint answered with a non-success status"
            ),
            (None, error) => warn!(
                endpoint = %report.endpoint,
                issue_type = %report.issue_type,
                "delivery failed: {}",
                truncate_for_log(error.as_deref().unwrap_or("unknown error"), 500)
            ),
        }
        Ok(())
    }
}
