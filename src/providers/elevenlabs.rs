//! ElevenLabs text-to-speech adapter.

use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, ACCEPT};

use super::http::{build_client, ensure_success, map_send_error};
use super::{ProviderError, TextToSpeech};
use crate::config::VoiceProfile;

pub const ELEVENLABS_ENDPOINT: &str = "https://api.elevenlabs.io/v1/text-to-speech";

pub struct ElevenLabsSynthesizer {
    client: Client,
    endpoint: String,
    api_key: String,
    timeout_secs: u64,
}

impl ElevenLabsSynthesizer {
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, ProviderError> {
        if api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey("ELEVENLABS_API_KEY"));
        }
        Ok(Self {
            client: build_client(timeout_secs)?,
            endpoint: ELEVENLABS_ENDPOINT.to_string(),
            api_key: api_key.to_string(),
            timeout_secs,
        })
    }

    pub fn build_request_body(text: &str, voice: &VoiceProfile) -> serde_json::Value {
        serde_json::json!({
            "text": text,
            "model_id": voice.model_id,
            "voice_settings": {
                "stability": voice.stability,
                "similarity_boost": voice.similarity_boost,
            }
        })
    }

    fn voice_url(&self, voice: &VoiceProfile) -> String {
        format!("{}/{}", self.endpoint, voice.voice_id)
    }
}

impl TextToSpeech for ElevenLabsSynthesizer {
    fn synthesize(&self, text: &str, voice: &VoiceProfile) -> Result<Vec<u8>, ProviderError> {
        let api_key = HeaderValue::from_str(&self.api_key)
            .map_err(|e| ProviderError::HttpClient(format!("Invalid API key header: {e}")))?;

        tracing::info!(
            voice = %voice.voice_id,
            model = %voice.model_id,
            chars = text.chars().count(),
            "Speech synthesis request"
        );

        let response = self
            .client
            .post(self.voice_url(voice))
            .header("xi-api-key", api_key)
            .header(ACCEPT, HeaderValue::from_static("audio/mpeg"))
            .json(&Self::build_request_body(text, voice))
            .send()
            .map_err(|e| map_send_error(e, &self.endpoint, self.timeout_secs))?;

        let audio = ensure_success(response)?
            .bytes()
            .map_err(|e| ProviderError::ResponseParsing(e.to_string()))?;

        if audio.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(audio.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_voice_settings() {
        let voice = VoiceProfile::default();
        let body = ElevenLabsSynthesizer::build_request_body("வணக்கம்", &voice);
        assert_eq!(body["text"], "வணக்கம்");
        assert_eq!(body["model_id"], "eleven_multilingual_v2");
        assert_eq!(body["voice_settings"]["stability"], 0.5);
        assert_eq!(body["voice_settings"]["similarity_boost"], 0.75);
    }

    #[test]
    fn url_includes_voice_id() {
        let synth = ElevenLabsSynthesizer::new("key", 30).unwrap();
        let voice = VoiceProfile {
            voice_id: "abc123".into(),
            ..VoiceProfile::default()
        };
        assert_eq!(
            synth.voice_url(&voice),
            "https://api.elevenlabs.io/v1/text-to-speech/abc123"
        );
    }

    #[test]
    fn missing_key_rejected() {
        assert!(matches!(
            ElevenLabsSynthesizer::new("", 30),
            Err(ProviderError::MissingApiKey("ELEVENLABS_API_KEY"))
        ));
    }
}
