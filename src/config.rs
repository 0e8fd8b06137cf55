use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

pub const ENDPOINT_ENV: &str = "CASEHOOK_WEBHOOK_URL";

#[derive(Debug, Deserialize, Default)]
pub struct CasehookConfig {
    pub webhook: Option<WebhookConfig>,
    pub log: Option<LogConfig>,
}

#[derive(Debug, Deserialize, Default)]
pub struct WebhookConfig {
    pub url: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LogConfig {
    pub delivery_log: Option<PathBuf>,
}

/// Values that override the config file, already read from the command line
/// and environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub env_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub delivery_log: Option<PathBuf>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Settings {
    pub endpoint_url: Option<String>,
    pub timeout: Option<Duration>,
    pub delivery_log: Option<PathBuf>,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("casehook").join("config.toml"))
}

/// A missing file is normal. An unreadable or invalid one is reported and
/// then treated as missing.
pub fn load_config(path: &Path) -> Option<CasehookConfig> {
    let raw = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) => {
            if error.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to read config file at {}: {}", path.display(), error);
            }
            return None;
        }
    };

    match toml::from_str::<CasehookConfig>(&raw) {
        Ok(config) => Some(config),
        Err(error) => {
            warn!("failed to parse config file at {}: {}", path.display(), error);
            None
        }
    }
}

pub fn resolve_settings(config: Option<&CasehookConfig>, overrides: Overrides) -> Settings {
    let webhook = config.and_then(|c| c.webhook.as_ref());

    let endpoint_url = non_blank(overrides.url)
        .or_else(|| non_blank(overrides.env_url))
        .or_else(|| non_blank(webhook.and_then(|w| w.url.clone())));

    let timeout = overrides
        .timeout_seconds
        .or_else(|| webhook.and_then(|w| w.timeout_seconds))
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);

    let delivery_log = overrides.delivery_log.or_else(|| {
        config
            .and_then(|c| c.log.as_ref())
            .and_then(|l| l.delivery_log.clone())
    });

    Settings {
        endpoint_url,
        timeout,
        delivery_log,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
