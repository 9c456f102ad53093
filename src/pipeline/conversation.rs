use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Question,
    Answer,
}

impl Role {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Question => "Q:",
            Self::Answer => "A:",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
    pub timestamp: NaiveDateTime,
}

impl ConversationTurn {
    /// `Q: text` or `A: text`.
    pub fn render(&self) -> String {
        format!("{} {}", self.role.prefix(), self.text)
    }
}

/// Append-only transcript of one session, oldest turn first.
///
/// Turns are never reordered or removed individually; `clear` is the only
/// way to shrink it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, role: Role, text: impl Into<String>) {
        self.turns.push(ConversationTurn {
            role,
            text: text.into(),
            timestamp: Local::now().naive_local(),
        });
    }

    pub fn push_question(&mut self, text: impl Into<String>) {
        self.append(Role::Question, text);
    }

    pub fn push_answer(&mut self, text: impl Into<String>) {
        self.append(Role::Answer, text);
    }

    /// Newline-joined transcript in insertion order.
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(ConversationTurn::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
