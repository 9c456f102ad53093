//! Google Cloud Speech-to-Text adapter (synchronous `speech:recognize`).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::audio::AudioClip;
use super::http::{build_client, ensure_success, map_send_error};
use super::{ProviderError, SpeechToText};

pub const DEFAULT_ENDPOINT: &str = "https://speech.googleapis.com/v1/speech:recognize";

pub struct GoogleSpeechRecognizer {
    client: Client,
    endpoint: String,
    api_key: String,
    timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
}

impl GoogleSpeechRecognizer {
    pub fn new(endpoint: &str, api_key: &str, timeout_secs: u64) -> Result<Self, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey("GOOGLE_SPEECH_API_KEY"));
        }
        Ok(Self {
            client: build_client(timeout_secs)?,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            timeout_secs,
        })
    }

    pub fn build_request_body(clip: &AudioClip, language_tag: &str) -> serde_json::Value {
        serde_json::json!({
            "config": {
                "encoding": "LINEAR16",
                "sampleRateHertz": clip.sample_rate,
                "languageCode": language_tag,
            },
            "audio": {
                "content": BASE64.encode(clip.to_le_bytes()),
            }
        })
    }
}

/// Join the top alternative of every result. Nothing recognised gives `None`.
fn transcript_from(response: &RecognizeResponse) -> Option<String> {
    let transcript = response
        .results
        .iter()
        .filter_map(|r| r.alternatives.first())
        .map(|a| a.transcript.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if transcript.is_empty() {
        None
    } else {
        Some(transcript)
    }
}

impl SpeechToText for GoogleSpeechRecognizer {
    fn recognize(
        &self,
        clip: &AudioClip,
        language_tag: &str,
    ) -> Result<Option<String>, ProviderError> {
        if clip.samples.is_empty() {
            return Ok(None);
        }

        tracing::info!(
            language = %language_tag,
            secs = clip.duration_secs(),
            "Speech recognition request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::build_request_body(clip, language_tag))
            .send()
            .map_err(|e| map_send_error(e, &self.endpoint, self.timeout_secs))?;

        let parsed: RecognizeResponse = ensure_success(response)?
            .json()
            .map_err(|e| ProviderError::ResponseParsing(e.to_string()))?;

        Ok(transcript_from(&parsed))
    }
}
