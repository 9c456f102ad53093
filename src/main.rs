use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use medbridge_lib::config::{self, AppConfig, ReasoningBackend};
use medbridge_lib::pipeline::query::{QueryAnswer, QueryOrchestrator, QuestionLanguage};
use medbridge_lib::pipeline::report::{parse_report, Report};
use medbridge_lib::pipeline::translation::ChunkedTranslator;
use medbridge_lib::providers::{
    extract_file, AudioClip, AutoExtractor, ElevenLabsSynthesizer, GeminiReasoner,
    GoogleSpeechRecognizer, MyMemoryTranslator, OllamaReasoner, ReasoningService, SpeechToText,
    TextToSpeech,
};
use medbridge_lib::session::QuerySession;
use medbridge_lib::voice::VoiceAssistant;

/// Ask questions about a medical report in your own language
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.medbridge/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract and parse a report, print it as JSON
    Parse {
        /// Report file (PDF, text or JSON)
        file: PathBuf,
    },

    /// Translate text, keeping numbers intact
    Translate {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        text: String,
    },

    /// Ask a single question about a report
    Ask {
        #[arg(long)]
        report: PathBuf,

        /// The question is already in the pivot language
        #[arg(long)]
        pivot: bool,

        /// Also write the spoken answer to this MP3 file
        #[arg(long, value_name = "OUT.mp3")]
        speak: Option<PathBuf>,

        question: String,
    },

    /// Interactive conversation about a report
    Chat {
        #[arg(long)]
        report: PathBuf,

        /// Write each spoken answer into this directory
        #[arg(long, value_name = "DIR")]
        speak_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    medbridge_lib::init_tracing(cli.verbose);

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    info!(
        source = %config.languages.source,
        pivot = %config.languages.pivot,
        backend = ?config.reasoning.backend,
        "Configuration loaded"
    );

    match cli.command {
        Command::Parse { file } => run_parse(&file),
        Command::Translate { from, to, text } => run_translate(&config, &from, &to, &text),
        Command::Ask {
            report,
            pivot,
            speak,
            question,
        } => run_ask(&config, &report, pivot, speak.as_deref(), &question),
        Command::Chat { report, speak_dir } => run_chat(&config, &report, speak_dir.as_deref()),
    }
}

// ═══════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════

fn run_parse(file: &Path) -> Result<()> {
    let report = load_report(file)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_translate(config: &AppConfig, from: &str, to: &str, text: &str) -> Result<()> {
    let provider = build_translator(config)?;
    let translator = ChunkedTranslator::from_settings(&provider, &config.translation);
    let result = translator.translate_detailed(text, from, to);
    if result.is_degraded() {
        eprintln!(
            "warning: {} of {} chunks could not be translated",
            result.chunks_failed, result.chunks_sent
        );
    }
    println!("{}", result.text);
    Ok(())
}

fn run_ask(
    config: &AppConfig,
    report_path: &Path,
    pivot: bool,
    speak: Option<&Path>,
    question: &str,
) -> Result<()> {
    let report = load_report(report_path)?;
    let translation = build_translator(config)?;
    let reasoner = build_reasoner(config)?;
    let orchestrator = QueryOrchestrator::from_config(&translation, &*reasoner, config);

    let synthesizer = match speak {
        Some(_) => Some(build_synthesizer(config)?),
        None => None,
    };

    let mut session = QuerySession::new(report);
    let language = if pivot {
        QuestionLanguage::Pivot
    } else {
        QuestionLanguage::Source
    };
    let answer = session.ask(&orchestrator, question, language);
    print_answer(&answer);

    if let (Some(path), Some(synthesizer)) = (speak, synthesizer.as_ref()) {
        let assistant =
            VoiceAssistant::<dyn SpeechToText, dyn TextToSpeech>::from_settings(&config.speech, &config.voice)
                .with_synthesizer(synthesizer);
        save_speech(&assistant, &answer.answer, path)?;
    }
    Ok(())
}

fn run_chat(config: &AppConfig, report_path: &Path, speak_dir: Option<&Path>) -> Result<()> {
    let report = load_report(report_path)?;
    let translation = build_translator(config)?;
    let reasoner = build_reasoner(config)?;
    let orchestrator = QueryOrchestrator::from_config(&translation, &*reasoner, config);

    let synthesizer = match speak_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create {}", dir.display()))?;
            Some(build_synthesizer(config)?)
        }
        None => None,
    };
    let recognizer = optional_recognizer(config);

    let mut assistant =
        VoiceAssistant::<dyn SpeechToText, dyn TextToSpeech>::from_settings(&config.speech, &config.voice);
    if let Some(recognizer) = recognizer.as_ref() {
        assistant = assistant.with_recognizer(recognizer);
    }
    if let Some(synthesizer) = synthesizer.as_ref() {
        assistant = assistant.with_synthesizer(synthesizer);
    }

    let mut session = QuerySession::new(report);
    let pivot_prefix = format!("@{} ", config.languages.pivot);
    let mut answered = 0usize;

    println!(
        "{} records loaded. Ask in '{}', prefix '{}' to ask in '{}'.",
        session.report().len(),
        config.languages.source,
        pivot_prefix.trim_end(),
        config.languages.pivot
    );
    println!("Commands: /history  /reset  /listen <file.wav>  /quit");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break };
        let line = line.context("Failed to read from stdin")?;
        let input = line.trim();

        let answer = match input {
            "" => continue,
            "/quit" | "/exit" => break,
            "/history" => {
                if session.history().is_empty() {
                    println!("(no turns yet)");
                } else {
                    println!("{}", session.history().render());
                }
                continue;
            }
            "/reset" => {
                session.reset();
                println!("Conversation cleared.");
                continue;
            }
            _ if input.starts_with("/listen") => {
                let path = input.trim_start_matches("/listen").trim();
                if path.is_empty() {
                    eprintln!("usage: /listen <file.wav>");
                    continue;
                }
                let clip = match AudioClip::from_wav_file(Path::new(path)) {
                    Ok(clip) => clip,
                    Err(e) => {
                        eprintln!("error: {e}");
                        continue;
                    }
                };
                match assistant.ask_spoken(&orchestrator, &clip, &mut session) {
                    Ok(answer) => answer,
                    Err(e) => {
                        eprintln!("error: {e}");
                        continue;
                    }
                }
            }
            _ => match input.strip_prefix(&pivot_prefix) {
                Some(question) => session.ask(&orchestrator, question, QuestionLanguage::Pivot),
                None => session.ask(&orchestrator, input, QuestionLanguage::Source),
            },
        };

        answered += 1;
        print_answer(&answer);

        if let Some(dir) = speak_dir {
            let path = dir.join(format!("answer-{answered:03}.mp3"));
            if let Err(e) = save_speech(&assistant, &answer.answer, &path) {
                warn!(error = %e, "Could not save spoken answer");
            }
        }
    }

    info!(session = %session.id(), turns = session.history().len(), "Chat ended");
    Ok(())
}

// ═══════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════

fn load_report(path: &Path) -> Result<Report> {
    let text = extract_file(&AutoExtractor, path)
        .with_context(|| format!("Cannot read report {}", path.display()))?;
    let report = parse_report(&text);
    if report.is_empty() {
        warn!(path = %path.display(), "No test records found in report");
    }
    info!(records = report.len(), "Report parsed");
    Ok(report)
}

fn build_translator(config: &AppConfig) -> Result<MyMemoryTranslator> {
    MyMemoryTranslator::new(
        &config.translation.endpoint,
        config.translation.contact_email.clone(),
        config.request_timeout_secs,
    )
    .context("Failed to build translation client")
}

fn build_reasoner(config: &AppConfig) -> Result<Box<dyn ReasoningService>> {
    let timeout = config.request_timeout_secs;
    let reasoner: Box<dyn ReasoningService> = match config.reasoning.backend {
        ReasoningBackend::Gemini => {
            let key = config::api_key(config::GEMINI_API_KEY_VAR)?;
            Box::new(GeminiReasoner::new(&key, config.reasoning.model(), timeout)?)
        }
        ReasoningBackend::Ollama => Box::new(OllamaReasoner::new(
            &config.reasoning.ollama_url,
            config.reasoning.model(),
            timeout,
        )?),
    };
    Ok(reasoner)
}

fn build_synthesizer(config: &AppConfig) -> Result<ElevenLabsSynthesizer> {
    let key = config::api_key(config::ELEVENLABS_API_KEY_VAR)?;
    ElevenLabsSynthesizer::new(&key, config.request_timeout_secs)
        .context("Failed to build speech synthesis client")
}

/// Spoken questions are optional in chat; a missing key only disables them.
fn optional_recognizer(config: &AppConfig) -> Option<GoogleSpeechRecognizer> {
    let key = match config::api_key(config::GOOGLE_SPEECH_API_KEY_VAR) {
        Ok(key) => key,
        Err(e) => {
            info!("Spoken questions disabled: {e}");
            return None;
        }
    };
    match GoogleSpeechRecognizer::new(&config.speech.endpoint, &key, config.request_timeout_secs) {
        Ok(recognizer) => Some(recognizer),
        Err(e) => {
            warn!(error = %e, "Speech recognizer unavailable");
            None
        }
    }
}

fn save_speech<S, V>(assistant: &VoiceAssistant<'_, S, V>, text: &str, path: &Path) -> Result<()>
where
    S: SpeechToText + ?Sized,
    V: TextToSpeech + ?Sized,
{
    match assistant.speak(text) {
        Some(audio) => {
            std::fs::write(path, audio)
                .with_context(|| format!("Cannot write {}", path.display()))?;
            eprintln!("Audio saved as {}", path.display());
        }
        None => eprintln!("warning: no audio produced for this answer"),
    }
    Ok(())
}

fn print_answer(answer: &QueryAnswer) {
    if answer.degraded {
        eprintln!("warning: the reasoning service did not answer; showing your question instead");
    }
    if answer.untranslated_chunks > 0 {
        eprintln!(
            "warning: {} part(s) could not be translated",
            answer.untranslated_chunks
        );
    }
    println!("{}", answer.answer);
}
