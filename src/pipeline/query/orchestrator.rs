use serde::Serialize;

use super::prompt::build_reasoning_prompt;
use crate::config::{AppConfig, LanguagePair};
use crate::pipeline::conversation::ConversationHistory;
use crate::pipeline::report::Report;
use crate::pipeline::translation::ChunkedTranslator;
use crate::providers::{ReasoningService, TranslationProvider};

/// Language the caller's question is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuestionLanguage {
    /// User-facing language; translated to the pivot before reasoning.
    #[default]
    Source,
    /// Already in the pivot language; inbound translation is skipped.
    Pivot,
}

/// Result of one question/answer turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryAnswer {
    /// Answer in the source language, ready to show or speak.
    pub answer: String,
    pub pivot_question: String,
    pub pivot_answer: String,
    /// The reasoning service failed and the pivot question was echoed back.
    pub degraded: bool,
    /// Chunks left untranslated across both directions.
    pub untranslated_chunks: usize,
}

/// Query pipeline: translate in → reason → translate out → record turn.
///
/// Providers are borrowed, so one set of clients built at startup can serve
/// every session.
pub struct QueryOrchestrator<'a, T, R>
where
    T: TranslationProvider + ?Sized,
    R: ReasoningService + ?Sized,
{
    translator: ChunkedTranslator<'a, T>,
    reasoner: &'a R,
    languages: LanguagePair,
}

impl<'a, T, R> QueryOrchestrator<'a, T, R>
where
    T: TranslationProvider + ?Sized,
    R: ReasoningService + ?Sized,
{
    pub fn new(translator: ChunkedTranslator<'a, T>, reasoner: &'a R, languages: LanguagePair) -> Self {
        Self {
            translator,
            reasoner,
            languages,
        }
    }

    pub fn from_config(translation: &'a T, reasoner: &'a R, config: &AppConfig) -> Self {
        Self::new(
            ChunkedTranslator::from_settings(translation, &config.translation),
            reasoner,
            config.languages.clone(),
        )
    }

    pub fn languages(&self) -> &LanguagePair {
        &self.languages
    }

    /// Ask a source-language question against `report`.
    ///
    /// The pivot-language question and answer are appended to `history`
    /// exactly as they were sent and received, even when reasoning fails.
    pub fn ask(
        &self,
        question: &str,
        report: &Report,
        history: &mut ConversationHistory,
    ) -> QueryAnswer {
        self.ask_in(question, QuestionLanguage::Source, report, history)
    }

    pub fn ask_in(
        &self,
        question: &str,
        language: QuestionLanguage,
        report: &Report,
        history: &mut ConversationHistory,
    ) -> QueryAnswer {
        let LanguagePair { source, pivot } = &self.languages;
        let mut untranslated_chunks = 0;

        // Step 1: Bring the question into the pivot language
        let pivot_question = match language {
            QuestionLanguage::Source => {
                let inbound = self.translator.translate_detailed(question, source, pivot);
                untranslated_chunks += inbound.chunks_failed;
                inbound.text
            }
            QuestionLanguage::Pivot => question.to_string(),
        };

        // Step 2: Reason over report + prior turns
        let prompt = build_reasoning_prompt(&pivot_question, report, history, pivot);
        tracing::info!(
            question_chars = pivot_question.len(),
            records = report.len(),
            history_turns = history.len(),
            "Querying reasoning service"
        );
        tracing::debug!(%prompt, "Reasoning prompt");

        let (pivot_answer, degraded) = match self.reasoner.generate(&prompt) {
            Ok(text) => (text, false),
            Err(e) => {
                tracing::warn!(error = %e, "Reasoning failed, echoing question");
                (pivot_question.clone(), true)
            }
        };

        // Step 3: Back to the user's language
        let outbound = self.translator.translate_detailed(&pivot_answer, pivot, source);
        untranslated_chunks += outbound.chunks_failed;

        // Step 4: Record the turn in pivot language
        history.push_question(pivot_question.clone());
        let shown_answer = pivot_answer.trim().to_string();
        history.push_answer(pivot_answer);

        tracing::info!(
            answer_chars = outbound.text.len(),
            degraded,
            untranslated_chunks,
            "Query answered"
        );

        QueryAnswer {
            answer: outbound.text,
            pivot_question,
            pivot_answer: shown_answer,
            degraded,
            untranslated_chunks,
        }
    }
}
