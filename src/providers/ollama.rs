use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::http::{build_client, ensure_success, map_send_error};
use super::{ProviderError, ReasoningService};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "medgemma";

/// Reasoning backed by a local Ollama instance.
pub struct OllamaReasoner {
    base_url: String,
    model: String,
    client: Client,
    timeout_secs: u64,
}

impl OllamaReasoner {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, ProviderError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client: build_client(timeout_secs)?,
            timeout_secs,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl ReasoningService for OllamaReasoner {
    fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        tracing::info!(model = %self.model, prompt_chars = prompt.len(), "Ollama generate");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| map_send_error(e, &self.base_url, self.timeout_secs))?;

        let parsed: OllamaGenerateResponse = ensure_success(response)?
            .json()
            .map_err(|e| ProviderError::ResponseParsing(e.to_string()))?;

        if parsed.response.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(parsed.response)
    }
}
