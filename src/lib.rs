//! Webhook notifications for diagnostic cases: build a validated event
//! record, POST it to an endpoint, report what came back.

pub mod config;
pub mod error;
pub mod event;
pub mod hooks;
#[cfg(test)]
mod mock_endpoint;
pub mod report;
pub mod sender;
pub mod utils;

pub use error::{DeliveryError, ValidationError};
pub use event::{CaseDetails, EventRecord, VehicleInfo};
pub use sender::{Notifier, SendResult, WebhookSender};
