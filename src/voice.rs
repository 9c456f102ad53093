//! Spoken turns: speech in, speech out, query pipeline in between.

use thiserror::Error;

use crate::config::{SpeechSettings, VoiceProfile};
use crate::pipeline::query::{QueryAnswer, QueryOrchestrator, QuestionLanguage};
use crate::providers::{
    AudioClip, ProviderError, ReasoningService, SpeechToText, TextToSpeech, TranslationProvider,
};
use crate::session::QuerySession;

/// A spoken turn that could not start. The session is left untouched.
#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("Speech recognition failed: {0}")]
    Recognition(#[from] ProviderError),

    #[error("Could not understand the audio")]
    Unintelligible,

    #[error("No speech recognizer is configured")]
    NoRecognizer,
}

/// Speech in front of the query pipeline and speech behind it.
///
/// Either side may be absent: without a recognizer spoken questions are
/// refused, without a synthesizer answers stay text-only.
pub struct VoiceAssistant<'a, S, V>
where
    S: SpeechToText + ?Sized,
    V: TextToSpeech + ?Sized,
{
    recognizer: Option<&'a S>,
    synthesizer: Option<&'a V>,
    language_tag: String,
    voice: VoiceProfile,
}

impl<'a, S, V> VoiceAssistant<'a, S, V>
where
    S: SpeechToText + ?Sized,
    V: TextToSpeech + ?Sized,
{
    pub fn new(language_tag: &str, voice: VoiceProfile) -> Self {
        Self {
            recognizer: None,
            synthesizer: None,
            language_tag: language_tag.to_string(),
            voice,
        }
    }

    pub fn from_settings(speech: &SpeechSettings, voice: &VoiceProfile) -> Self {
        Self::new(&speech.language_tag, voice.clone())
    }

    pub fn with_recognizer(mut self, recognizer: &'a S) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: &'a V) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn can_listen(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn can_speak(&self) -> bool {
        self.synthesizer.is_some()
    }

    /// Recognize a clip. Blank transcripts count as unintelligible.
    pub fn listen(&self, clip: &AudioClip) -> Result<String, VoiceError> {
        let recognizer = self.recognizer.ok_or(VoiceError::NoRecognizer)?;
        tracing::info!(
            seconds = clip.duration_secs(),
            language = %self.language_tag,
            "Recognizing speech"
        );
        match recognizer.recognize(clip, &self.language_tag)? {
            Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            _ => Err(VoiceError::Unintelligible),
        }
    }

    /// Recognize a spoken question and run it as a normal turn.
    pub fn ask_spoken<T, R>(
        &self,
        orchestrator: &QueryOrchestrator<'_, T, R>,
        clip: &AudioClip,
        session: &mut QuerySession,
    ) -> Result<QueryAnswer, VoiceError>
    where
        T: TranslationProvider + ?Sized,
        R: ReasoningService + ?Sized,
    {
        let question = self.listen(clip)?;
        Ok(session.ask(orchestrator, &question, QuestionLanguage::Source))
    }

    /// Synthesize an answer. Failures are logged and produce no audio; the
    /// text answer stands on its own.
    pub fn speak(&self, text: &str) -> Option<Vec<u8>> {
        let synthesizer = self.synthesizer?;
        if text.trim().is_empty() {
            return None;
        }
        match synthesizer.synthesize(text, &self.voice) {
            Ok(audio) if !audio.is_empty() => {
                tracing::info!(bytes = audio.len(), "Speech synthesized");
                Some(audio)
            }
            Ok(_) => {
                tracing::warn!("Speech synthesis returned no audio");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Speech synthesis failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChunkStrategy, LanguagePair};
    use crate::pipeline::report::parse_report;
    use crate::pipeline::translation::ChunkedTranslator;
    use std::cell::RefCell;

    struct ScriptedRecognizer(Result<Option<&'static str>, ()>);

    impl SpeechToText for ScriptedRecognizer {
        fn recognize(&self, _clip: &AudioClip, language_tag: &str) -> Result<Option<String>, ProviderError> {
            assert_eq!(language_tag, "ta-IN");
            match self.0 {
                Ok(text) => Ok(text.map(str::to_string)),
                Err(()) => Err(ProviderError::Http { status: 403, body: "denied".into() }),
            }
        }
    }

    #[derive(Default)]
    struct RecordingSynthesizer {
        spoken: RefCell<Vec<(String, String)>>,
        fail: bool,
    }

    impl TextToSpeech for RecordingSynthesizer {
        fn synthesize(&self, text: &str, voice: &VoiceProfile) -> Result<Vec<u8>, ProviderError> {
            if self.fail {
                return Err(ProviderError::MissingApiKey("ELEVENLABS_API_KEY"));
            }
            self.spoken
                .borrow_mut()
                .push((text.to_string(), voice.voice_id.clone()));
            Ok(b"ID3audio".to_vec())
        }
    }

    struct Identity;

    impl TranslationProvider for Identity {
        fn translate(&self, text: &str, _from: &str, _to: &str) -> Result<String, ProviderError> {
            Ok(text.to_string())
        }
    }

    struct Fixed;

    impl ReasoningService for Fixed {
        fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
            Ok("Your HDL is low.".into())
        }
    }

    fn clip() -> AudioClip {
        AudioClip::new(vec![0; 1600], 16_000)
    }

    fn assistant<'a>(
        recognizer: &'a ScriptedRecognizer,
        synthesizer: &'a RecordingSynthesizer,
    ) -> VoiceAssistant<'a, ScriptedRecognizer, RecordingSynthesizer> {
        VoiceAssistant::new("ta-IN", VoiceProfile::default())
            .with_recognizer(recognizer)
            .with_synthesizer(synthesizer)
    }

    #[test]
    fn spoken_question_runs_a_turn() {
        let recognizer = ScriptedRecognizer(Ok(Some(" HDL? ")));
        let synthesizer = RecordingSynthesizer::default();
        let assistant = assistant(&recognizer, &synthesizer);
        let orchestrator = QueryOrchestrator::new(
            ChunkedTranslator::new(&Identity, 400, ChunkStrategy::WordBoundary),
            &Fixed,
            LanguagePair::default(),
        );
        let mut session = QuerySession::new(parse_report("HDL: 35 (40-60)"));

        let answer = assistant.ask_spoken(&orchestrator, &clip(), &mut session).unwrap();

        assert_eq!(answer.pivot_question, "HDL?");
        assert_eq!(answer.answer, "Your HDL is low.");
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn unintelligible_audio_leaves_session_untouched() {
        for recognizer in [ScriptedRecognizer(Ok(None)), ScriptedRecognizer(Ok(Some("   ")))] {
            let synthesizer = RecordingSynthesizer::default();
            let assistant = assistant(&recognizer, &synthesizer);
            let orchestrator = QueryOrchestrator::new(
                ChunkedTranslator::new(&Identity, 400, ChunkStrategy::WordBoundary),
                &Fixed,
                LanguagePair::default(),
            );
            let mut session = QuerySession::new(parse_report("HDL: 35"));

            let result = assistant.ask_spoken(&orchestrator, &clip(), &mut session);

            assert!(matches!(result, Err(VoiceError::Unintelligible)));
            assert!(session.history().is_empty());
        }
    }

    #[test]
    fn recognizer_error_is_recognition_failure() {
        let recognizer = ScriptedRecognizer(Err(()));
        let synthesizer = RecordingSynthesizer::default();
        let assistant = assistant(&recognizer, &synthesizer);

        let result = assistant.listen(&clip());
        assert!(matches!(
            result,
            Err(VoiceError::Recognition(ProviderError::Http { status: 403, .. }))
        ));
    }

    #[test]
    fn speak_uses_configured_voice() {
        let recognizer = ScriptedRecognizer(Ok(None));
        let synthesizer = RecordingSynthesizer::default();
        let assistant = assistant(&recognizer, &synthesizer);

        let audio = assistant.speak("உங்கள் HDL குறைவாக உள்ளது");

        assert_eq!(audio.as_deref(), Some(&b"ID3audio"[..]));
        let spoken = synthesizer.spoken.borrow();
        assert_eq!(spoken[0].0, "உங்கள் HDL குறைவாக உள்ளது");
        assert_eq!(spoken[0].1, VoiceProfile::default().voice_id);
    }

    #[test]
    fn synthesis_failure_yields_no_audio() {
        let recognizer = ScriptedRecognizer(Ok(None));
        let synthesizer = RecordingSynthesizer {
            fail: true,
            ..Default::default()
        };
        let assistant = assistant(&recognizer, &synthesizer);

        assert!(assistant.speak("answer").is_none());
    }

    #[test]
    fn blank_text_is_not_synthesized() {
        let recognizer = ScriptedRecognizer(Ok(None));
        let synthesizer = RecordingSynthesizer::default();
        let assistant = assistant(&recognizer, &synthesizer);

        assert!(assistant.speak("  ").is_none());
        assert!(synthesizer.spoken.borrow().is_empty());
    }

    #[test]
    fn missing_sides_degrade() {
        let assistant: VoiceAssistant<'_, ScriptedRecognizer, RecordingSynthesizer> =
            VoiceAssistant::new("ta-IN", VoiceProfile::default());

        assert!(!assistant.can_listen());
        assert!(!assistant.can_speak());
        assert!(matches!(assistant.listen(&clip()), Err(VoiceError::NoRecognizer)));
        assert!(assistant.speak("answer").is_none());
    }

    #[test]
    fn works_through_trait_objects() {
        let recognizer = ScriptedRecognizer(Ok(Some("HDL?")));
        let assistant = VoiceAssistant::<dyn SpeechToText, dyn TextToSpeech>::from_settings(
            &SpeechSettings::default(),
            &VoiceProfile::default(),
        )
        .with_recognizer(&recognizer);

        assert_eq!(assistant.listen(&clip()).unwrap(), "HDL?");
        assert!(!assistant.can_speak());
    }
}
