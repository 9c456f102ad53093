use std::time::Duration;

use reqwest::blocking::{Client, Response};

use super::ProviderError;

/// Error bodies are cut to this many bytes before they land in an error.
const MAX_ERROR_BODY_BYTES: usize = 200;

/// Build a blocking HTTP client with a hard request timeout.
pub fn build_client(timeout_secs: u64) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ProviderError::HttpClient(format!("Failed to create HTTP client: {e}")))
}

/// Classify a transport failure the way the caller needs to report it.
pub fn map_send_error(err: reqwest::Error, base_url: &str, timeout_secs: u64) -> ProviderError {
    if err.is_connect() {
        ProviderError::Connection(base_url.to_string())
    } else if err.is_timeout() {
        ProviderError::Timeout(timeout_secs)
    } else {
        ProviderError::HttpClient(err.to_string())
    }
}

/// Pass successful responses through; turn anything else into `ProviderError::Http`.
pub fn ensure_success(response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(ProviderError::Http {
        status: status.as_u16(),
        body: truncate_body(&body).to_string(),
    })
}

/// Truncate on a char boundary so multi-byte text never panics.
pub fn truncate_body(body: &str) -> &str {
    if body.len() <= MAX_ERROR_BODY_BYTES {
        return body;
    }
    let mut end = MAX_ERROR_BODY_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
