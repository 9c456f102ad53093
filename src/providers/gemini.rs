//! Google Gemini reasoning adapter.
//!
//! Thin blocking wrapper around the `generateContent` endpoint, text in and
//! text out.

use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::Deserialize;

use super::http::{build_client, ensure_success, map_send_error};
use super::{ProviderError, ReasoningService};

pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";

pub struct GeminiReasoner {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

// -- Response types --

#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

impl GeminiReasoner {
    pub fn new(api_key: &str, model: &str, timeout_secs: u64) -> Result<Self, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey("GEMINI_API_KEY"));
        }
        Ok(Self {
            client: build_client(timeout_secs)?,
            endpoint: GEMINI_ENDPOINT.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn build_request_body(prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "contents": [{
                "parts": [{"text": prompt}]
            }]
        })
    }

    /// Concatenate the text parts of the first candidate.
    pub fn extract_text(response: &GeminiResponse) -> Option<String> {
        let content = response.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl ReasoningService for GeminiReasoner {
    fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!("{}/{}:generateContent", self.endpoint, self.model);
        let body = Self::build_request_body(prompt);

        tracing::info!(model = %self.model, prompt_chars = prompt.len(), "Gemini generate");

        let api_key = HeaderValue::from_str(&self.api_key)
            .map_err(|e| ProviderError::HttpClient(format!("Invalid API key header: {e}")))?;

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .map_err(|e| map_send_error(e, &self.endpoint, self.timeout_secs))?;

        let parsed: GeminiResponse = ensure_success(response)?
            .json()
            .map_err(|e| ProviderError::ResponseParsing(e.to_string()))?;

        Self::extract_text(&parsed).ok_or(ProviderError::EmptyResponse)
    }
}
