use crate::pipeline::conversation::ConversationHistory;
use crate::pipeline::report::Report;

pub const ASSISTANT_PERSONA: &str =
    "You are a medical assistant. Analyze the medical report and respond to the user's question";

/// Rules appended to every reasoning request, numbered in order.
pub const ANSWER_REQUIREMENTS: &[&str] = &[
    "Respond only if the question relates to the medical report",
    "Keep the response under 500 words",
    "Use simple, non-medical language",
    "Focus on answering the specific question",
    "Avoid greetings, signatures, and repetitive headers",
];

/// English display name for the language codes we ship defaults for.
pub fn language_name(code: &str) -> &str {
    match code {
        "ta" => "Tamil",
        "en" => "English",
        "hi" => "Hindi",
        "te" => "Telugu",
        "ml" => "Malayalam",
        "kn" => "Kannada",
        other => other,
    }
}

/// Build the single free-form prompt sent to the reasoning service.
pub fn build_reasoning_prompt(
    question: &str,
    report: &Report,
    history: &ConversationHistory,
    pivot_lang: &str,
) -> String {
    let language = language_name(pivot_lang);
    let mut prompt = format!("{ASSISTANT_PERSONA} in {language}.\n\n");

    prompt.push_str(&format!("User's question: {question}\n"));

    if !history.is_empty() {
        prompt.push_str("\nPrevious conversation:\n");
        prompt.push_str(&history.render());
        prompt.push('\n');
    }

    prompt.push_str("\nRequirements:\n");
    for (i, requirement) in ANSWER_REQUIREMENTS.iter().enumerate() {
        prompt.push_str(&format!("{}. {requirement}\n", i + 1));
    }
    prompt.push_str(&format!(
        "{}. Respond in {language}\n",
        ANSWER_REQUIREMENTS.len() + 1
    ));

    prompt.push_str("\nMedical Report:\n");
    if report.is_empty() {
        prompt.push_str("(no report records)\n");
    } else {
        prompt.push_str(&report.render());
        prompt.push('\n');
    }

    prompt
}
