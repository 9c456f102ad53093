use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::providers::{gemini, google_speech, mymemory, ollama};

/// Application-level constants
pub const APP_NAME: &str = "MedBridge";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fixed-width chunk size used by the translation pipeline.
pub const DEFAULT_CHUNK_SIZE: usize = 400;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variables holding provider secrets.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const ELEVENLABS_API_KEY_VAR: &str = "ELEVENLABS_API_KEY";
pub const GOOGLE_SPEECH_API_KEY_VAR: &str = "GOOGLE_SPEECH_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed config file {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Missing API key: set the {0} environment variable")]
    MissingApiKey(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Default tracing filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "medbridge_lib=info,medbridge=info"
}

/// Get the application data directory (~/.medbridge/)
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".medbridge"))
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join("config.json"))
}

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// User-facing language and the pivot language the reasoning runs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguagePair {
    pub source: String,
    pub pivot: String,
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self {
            source: "ta".into(),
            pivot: "en".into(),
        }
    }
}

/// How guarded text is cut into translation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStrategy {
    /// Exact fixed-width slices. May cut words and placeholders in half.
    Fixed,
    /// Whole words packed up to the limit; placeholders are never cut.
    #[default]
    WordBoundary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    pub endpoint: String,
    /// Raises the MyMemory daily quota when set.
    pub contact_email: Option<String>,
    pub chunk_size: usize,
    pub chunking: ChunkStrategy,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            endpoint: mymemory::DEFAULT_ENDPOINT.into(),
            contact_email: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunking: ChunkStrategy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningBackend {
    #[default]
    Gemini,
    Ollama,
}

impl std::str::FromStr for ReasoningBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::Invalid(format!(
                "unknown reasoning backend '{other}'"
            ))),
        }
    }
}

impl ReasoningBackend {
    /// Model requested when the config names none.
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => gemini::DEFAULT_MODEL,
            Self::Ollama => ollama::DEFAULT_MODEL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningSettings {
    pub backend: ReasoningBackend,
    /// Explicit model name. Unset means the backend's own default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub ollama_url: String,
}

impl ReasoningSettings {
    pub fn model(&self) -> &str {
        match self.model.as_deref() {
            Some(model) if !model.trim().is_empty() => model,
            _ => self.backend.default_model(),
        }
    }
}

impl Default for ReasoningSettings {
    fn default() -> Self {
        Self {
            backend: ReasoningBackend::Gemini,
            model: None,
            ollama_url: ollama::DEFAULT_OLLAMA_URL.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    /// BCP-47 tag passed to the recognizer.
    pub language_tag: String,
    pub endpoint: String,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            language_tag: "ta-IN".into(),
            endpoint: google_speech::DEFAULT_ENDPOINT.into(),
        }
    }
}

/// Voice used for spoken answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceProfile {
    pub voice_id: String,
    pub model_id: String,
    pub stability: f32,
    pub similarity_boost: f32,
}

impl Default for VoiceProfile {
    fn default() -> Self {
        Self {
            voice_id: "21m00Tcm4TlvDq8ikWAM".into(),
            model_id: "eleven_multilingual_v2".into(),
            stability: 0.5,
            similarity_boost: 0.75,
        }
    }
}

/// Complete application configuration. Every field has a default so a
/// partial JSON file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub languages: LanguagePair,
    pub translation: TranslationSettings,
    pub reasoning: ReasoningSettings,
    pub speech: SpeechSettings,
    pub voice: VoiceProfile,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            languages: LanguagePair::default(),
            translation: TranslationSettings::default(),
            reasoning: ReasoningSettings::default(),
            speech: SpeechSettings::default(),
            voice: VoiceProfile::default(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Loading
// ═══════════════════════════════════════════════════════════

impl AppConfig {
    /// Load configuration: explicit path > ~/.medbridge/config.json > defaults,
    /// then environment overrides, then validation.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Apply `MEDBRIDGE_*` overrides. `lookup` is `std::env::var` in production.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(source) = lookup("MEDBRIDGE_SOURCE_LANG") {
            self.languages.source = source;
        }
        if let Some(pivot) = lookup("MEDBRIDGE_PIVOT_LANG") {
            self.languages.pivot = pivot;
        }
        if let Some(backend) = lookup("MEDBRIDGE_REASONING_BACKEND") {
            self.reasoning.backend = backend.parse()?;
        }
        if let Some(model) = lookup("MEDBRIDGE_REASONING_MODEL") {
            self.reasoning.model = Some(model);
        }
        if let Some(secs) = lookup("MEDBRIDGE_TIMEOUT_SECS") {
            self.request_timeout_secs = secs.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("MEDBRIDGE_TIMEOUT_SECS is not a number: {secs}"))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.translation.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk_size must be at least 1".into()));
        }
        if self.languages.source.trim().is_empty() || self.languages.pivot.trim().is_empty() {
            return Err(ConfigError::Invalid("language codes must not be empty".into()));
        }
        if self.languages.source == self.languages.pivot {
            return Err(ConfigError::Invalid(format!(
                "source and pivot languages are both '{}'",
                self.languages.source
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be at least 1".into()));
        }
        for (name, value) in [
            ("stability", self.voice.stability),
            ("similarity_boost", self.voice.similarity_boost),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "voice {name} must be within 0.0..=1.0, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Read a provider secret from the environment.
pub fn api_key(var: &'static str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(ConfigError::MissingApiKey(var)),
    }
}
