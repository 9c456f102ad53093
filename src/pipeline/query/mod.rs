pub mod orchestrator;
pub mod prompt;

pub use orchestrator::{QueryAnswer, QueryOrchestrator, QuestionLanguage};
pub use prompt::build_reasoning_prompt;
