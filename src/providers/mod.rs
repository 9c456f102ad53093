//! External collaborators of the query pipeline.
//!
//! The pipeline never talks to a network service directly. Each collaborator
//! sits behind a trait so production code can inject the HTTP adapters in this
//! module while tests inject in-memory mocks.

pub mod audio;
pub mod document;
pub mod elevenlabs;
pub mod gemini;
pub mod google_speech;
pub mod http;
pub mod mymemory;
pub mod ollama;

pub use audio::AudioClip;
pub use document::*;
pub use elevenlabs::ElevenLabsSynthesizer;
pub use gemini::GeminiReasoner;
pub use google_speech::GoogleSpeechRecognizer;
pub use mymemory::MyMemoryTranslator;
pub use ollama::OllamaReasoner;

use thiserror::Error;

use crate::config::VoiceProfile;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Service is not reachable at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Service returned error (status {status}): {body}")]
    Http { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Request rejected by provider: {0}")]
    Rejected(String),

    #[error("Provider returned an empty response")]
    EmptyResponse,

    #[error("Missing API key: set {0}")]
    MissingApiKey(&'static str),

    #[error("Audio error: {0}")]
    Audio(String),
}

/// Machine translation between two language codes (ISO 639-1, e.g. "ta", "en").
pub trait TranslationProvider {
    fn translate(&self, text: &str, from: &str, to: &str) -> Result<String, ProviderError>;
}

/// Free-form prompt in, free-form text out.
pub trait ReasoningService {
    fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Speech recognition. `Ok(None)` means the audio was heard but nothing
/// intelligible came back.
pub trait SpeechToText {
    fn recognize(
        &self,
        clip: &AudioClip,
        language_tag: &str,
    ) -> Result<Option<String>, ProviderError>;
}

/// Speech synthesis returning playable audio bytes.
pub trait TextToSpeech {
    fn synthesize(&self, text: &str, voice: &VoiceProfile) -> Result<Vec<u8>, ProviderError>;
}
