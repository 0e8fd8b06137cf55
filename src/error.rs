use thiserror::Error;

/// Raised while building an [`EventRecord`](crate::event::EventRecord); no
/// network activity has happened yet when this is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("field '{0}' is required")]
    MissingField(&'static str),
    #[error("vehicle year {year} is outside {min}..={max}")]
    YearOutOfRange { year: i32, min: i32, max: i32 },
}

/// A send that never produced an interpretable HTTP response.
///
/// Non-2xx statuses are not errors; they come back inside
/// [`SendResult`](crate::sender::SendResult).
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to serialize event record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("delivery to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

impl DeliveryError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DeliveryError::Transport { source, .. } if source.is_timeout())
    }

    pub fn is_connect(&self) -> bool {
        matches!(self, DeliveryError::Transport { source, .. } if source.is_connect())
    }
}
