use crate::error::DeliveryError;
use crate::event::EventRecord;
use crate::sender::{Notifier, SendResult};
use crate::utils::redact_endpoint;

/// Sends one record and returns the lines to show the user. A failed
/// delivery becomes an `ERROR` line, never an error value.
pub async fn deliver_and_describe(
    sender: &dyn Notifier,
    endpoint_url: &str,
    record: &EventRecord,
) -> Vec<String> {
    let mut lines = vec![format!(
        "Sending case data ({}) to {}...",
        record.issue_type(),
        redact_endpoint(endpoint_url)
    )];
    let outcome = sender.send(endpoint_url, record).await;
    lines.extend(describe_outcome(&outcome));
    lines
}

pub fn describe_outcome(outcome: &Result<SendResult, DeliveryError>) -> Vec<String> {
    match outcome {
        Ok(result) => {
            let mut lines = vec![
                format!("Webhook sent! Status code: {}", result.status_code),
                format!("Response: {}", result.body),
            ];
            if !result.is_success() {
                lines.push("Note: the endpoint did not report success.".to_string());
            }
            lines
        }
        Err(error) => vec![format!("ERROR sending webhook: {}", error)],
    }
}
