use crate::config::{ChunkStrategy, TranslationSettings};
use crate::providers::TranslationProvider;

use super::chunker::split_chunks;
use super::numeric_guard::{protect_numbers, restore_numbers};

/// Outcome of one translation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    /// Non-blank chunks submitted to the provider.
    pub chunks_sent: usize,
    /// Chunks where the provider failed and the original text was kept.
    pub chunks_failed: usize,
}

impl Translation {
    /// At least one chunk came back untranslated.
    pub fn is_degraded(&self) -> bool {
        self.chunks_failed > 0
    }
}

/// Numeric-preserving, chunked translation over any provider.
///
/// Never fails: a chunk the provider cannot translate is passed through in
/// its original language and the rest of the text still gets translated.
pub struct ChunkedTranslator<'a, P: TranslationProvider + ?Sized> {
    provider: &'a P,
    chunk_size: usize,
    strategy: ChunkStrategy,
}

impl<'a, P: TranslationProvider + ?Sized> ChunkedTranslator<'a, P> {
    pub fn new(provider: &'a P, chunk_size: usize, strategy: ChunkStrategy) -> Self {
        Self {
            provider,
            chunk_size: chunk_size.max(1),
            strategy,
        }
    }

    pub fn from_settings(provider: &'a P, settings: &TranslationSettings) -> Self {
        Self::new(provider, settings.chunk_size, settings.chunking)
    }

    pub fn translate(&self, text: &str, from: &str, to: &str) -> String {
        self.translate_detailed(text, from, to).text
    }

    pub fn translate_detailed(&self, text: &str, from: &str, to: &str) -> Translation {
        // One placeholder map for the whole call
        let (guarded, map) = protect_numbers(text);

        let mut outputs: Vec<String> = Vec::new();
        let mut chunks_sent = 0;
        let mut chunks_failed = 0;

        for (i, chunk) in split_chunks(&guarded, self.chunk_size, self.strategy)
            .iter()
            .enumerate()
        {
            let chunk = chunk.trim();
            if chunk.is_empty() {
                continue;
            }
            chunks_sent += 1;

            match self.provider.translate(chunk, from, to) {
                Ok(translated) => outputs.push(translated.trim().to_string()),
                Err(e) => {
                    tracing::warn!(chunk = i, from, to, error = %e, "Chunk translation failed, keeping original");
                    chunks_failed += 1;
                    outputs.push(chunk.to_string());
                }
            }
        }

        let joined = outputs
            .iter()
            .filter(|o| !o.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        let restored = restore_numbers(&joined, &map);
        let text = collapse_whitespace(&restored);

        tracing::debug!(
            from,
            to,
            numbers = map.len(),
            chunks_sent,
            chunks_failed,
            "Translation complete"
        );

        Translation {
            text,
            chunks_sent,
            chunks_failed,
        }
    }
}

/// Collapse every whitespace run to one space and trim both ends.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
