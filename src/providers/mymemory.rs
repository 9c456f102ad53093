//! MyMemory translation adapter.
//!
//! MyMemory is a free REST translation memory. Anonymous callers get a small
//! daily quota; passing a contact e-mail (`de=`) raises it.

use reqwest::blocking::Client;
use serde::Deserialize;

use super::http::{build_client, ensure_success, map_send_error};
use super::{ProviderError, TranslationProvider};

pub const DEFAULT_ENDPOINT: &str = "https://api.mymemory.translated.net/get";

/// Prefix MyMemory puts into `translatedText` when the quota is exhausted.
const QUOTA_WARNING: &str = "MYMEMORY WARNING";

pub struct MyMemoryTranslator {
    endpoint: String,
    contact_email: Option<String>,
    client: Client,
    timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    response_data: Option<MyMemoryData>,
    /// Number on success, sometimes a string on failure.
    response_status: serde_json::Value,
    #[serde(default)]
    response_details: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryData {
    translated_text: Option<String>,
}

impl MyMemoryTranslator {
    pub fn new(
        endpoint: &str,
        contact_email: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            endpoint: endpoint.to_string(),
            contact_email,
            client: build_client(timeout_secs)?,
            timeout_secs,
        })
    }

    fn language_pair(from: &str, to: &str) -> String {
        format!("{from}|{to}")
    }
}

/// Pull the translated text out of a raw MyMemory response body.
fn parse_response(body: &str) -> Result<String, ProviderError> {
    let parsed: MyMemoryResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::ResponseParsing(e.to_string()))?;

    let status = match &parsed.response_status {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    if status != Some(200) {
        let detail = match &parsed.response_details {
            serde_json::Value::String(s) if !s.is_empty() => s.clone(),
            _ => format!("status {}", parsed.response_status),
        };
        return Err(ProviderError::Rejected(detail));
    }

    let text = parsed
        .response_data
        .and_then(|d| d.translated_text)
        .ok_or(ProviderError::EmptyResponse)?;

    if text.starts_with(QUOTA_WARNING) {
        return Err(ProviderError::Rejected(text));
    }
    Ok(text)
}

impl TranslationProvider for MyMemoryTranslator {
    fn translate(&self, text: &str, from: &str, to: &str) -> Result<String, ProviderError> {
        let pair = Self::language_pair(from, to);
        let mut query: Vec<(&str, &str)> = vec![("q", text), ("langpair", pair.as_str())];
        if let Some(ref email) = self.contact_email {
            query.push(("de", email.as_str()));
        }

        tracing::debug!(langpair = %pair, chars = text.chars().count(), "MyMemory request");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&query)
            .send()
            .map_err(|e| map_send_error(e, &self.endpoint, self.timeout_secs))?;

        let body = ensure_success(response)?
            .text()
            .map_err(|e| ProviderError::ResponseParsing(e.to_string()))?;

        parse_response(&body)
    }
}
