use reqwest::Url;

/// Webhook URLs usually embed their secret in the path, so only scheme, host
/// and port are ever shown in logs and error messages.
pub fn redact_endpoint(endpoint: &str) -> String {
    let url = match Url::parse(endpoint.trim()) {
        Ok(url) => url,
        Err(_) => return "<invalid endpoint>".to_string(),
    };

    let mut redacted = format!("{}://", url.scheme());
    if let Some(host) = url.host_str() {
        redacted.push_str(host);
    }
    if let Some(port) = url.port() {
        redacted.push_str(&format!(":{}", port));
    }

    let has_path = !url.path().is_empty() && url.path() != "/";
    if has_path || url.query().is_some() {
        redacted.push_str("/***");
    }
    redacted
}

pub fn truncate_for_log(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }

    input.chars().take(max_chars).collect::<String>() + "..."
}
