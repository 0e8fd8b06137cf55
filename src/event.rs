use crate::error::ValidationError;
use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, SubsecRound, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

pub const MIN_VEHICLE_YEAR: i32 = 1900;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VehicleInfo {
    pub make: String,
    pub model: String,
    pub year: i32,
}

impl VehicleInfo {
    pub fn new(make: impl Into<String>, model: impl Into<String>, year: i32) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            year,
        }
    }
}

/// Everything a caller supplies about a case. The timestamp is added by
/// [`EventRecord::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseDetails {
    pub user_email: String,
    pub issue_type: String,
    pub subscription_tier: String,
    pub vehicle_info: VehicleInfo,
    #[serde(default)]
    pub symptoms: Vec<String>,
}

impl CaseDetails {
    /// Demonstration case sent when the CLI is run without a case file.
    pub fn sample() -> Self {
        Self {
            user_email: "driver@example.com".to_string(),
            issue_type: "engine_noise".to_string(),
            subscription_tier: "Pro".to_string(),
            vehicle_info: VehicleInfo::new("Honda", "Civic", 2015),
            symptoms: vec![
                "Rattling sound when accelerating".to_string(),
                "Check engine light on".to_string(),
            ],
        }
    }

    pub async fn from_json_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read case file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid case JSON in {}", path.display()))
    }
}

/// The payload POSTed to the webhook. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    user_email: String,
    issue_type: String,
    subscription_tier: String,
    #[serde(with = "utc_offset")]
    timestamp: DateTime<Utc>,
    vehicle_info: VehicleInfo,
    symptoms: Vec<String>,
}

impl EventRecord {
    pub fn new(details: CaseDetails) -> Result<Self, ValidationError> {
        validate(&details)?;
        let CaseDetails {
            user_email,
            issue_type,
            subscription_tier,
            vehicle_info,
            symptoms,
        } = details;

        // Wire format carries microseconds; stamp at that precision so a
        // decoded record compares equal to the original.
        let timestamp = Utc::now().trunc_subsecs(6);

        Ok(Self {
            user_email,
            issue_type,
            subscription_tier,
            timestamp,
            vehicle_info,
            symptoms,
        })
    }

    pub fn user_email(&self) -> &str {
        &self.user_email
    }

    pub fn issue_type(&self) -> &str {
        &self.issue_type
    }

    pub fn subscription_tier(&self) -> &str {
        &self.subscription_tier
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn vehicle_info(&self) -> &VehicleInfo {
        &self.vehicle_info
    }

    pub fn symptoms(&self) -> &[String] {
        &self.symptoms
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("email pattern is a valid regex")
    })
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

fn validate(details: &CaseDetails) -> Result<(), ValidationError> {
    require(&details.user_email, "user_email")?;
    if !email_pattern().is_match(&details.user_email) {
        return Err(ValidationError::InvalidEmail(details.user_email.clone()));
    }
    require(&details.issue_type, "issue_type")?;
    require(&details.subscription_tier, "subscription_tier")?;
    require(&details.vehicle_info.make, "vehicle_info.make")?;
    require(&details.vehicle_info.model, "vehicle_info.model")?;

    let max = Utc::now().year() + 1;
    let year = details.vehicle_info.year;
    if !(MIN_VEHICLE_YEAR..=max).contains(&year) {
        return Err(ValidationError::YearOutOfRange {
            year,
            min: MIN_VEHICLE_YEAR,
            max,
        });
    }
    Ok(())
}

/// RFC 3339 with an explicit `+00:00` offset, e.g.
/// `2024-01-01T00:00:00.000000+00:00`.
mod utc_offset {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, false))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
