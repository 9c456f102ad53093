//! Session context for the query pipeline.
//!
//! A session owns one report and the conversation about it. Hosts that serve
//! several users keep one `QuerySession` per user in a `SessionStore`; nothing
//! is shared between sessions.

use std::collections::HashMap;

use chrono::{Local, NaiveDateTime};
use uuid::Uuid;

use crate::pipeline::conversation::ConversationHistory;
use crate::pipeline::query::{QueryAnswer, QueryOrchestrator, QuestionLanguage};
use crate::pipeline::report::Report;
use crate::providers::{ReasoningService, TranslationProvider};

// ═══════════════════════════════════════════════════════════
// QuerySession — one report, one conversation
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct QuerySession {
    id: Uuid,
    started_at: NaiveDateTime,
    report: Report,
    history: ConversationHistory,
}

impl QuerySession {
    /// Start a session on a freshly parsed report.
    pub fn new(report: Report) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Local::now().naive_local(),
            report,
            history: ConversationHistory::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> NaiveDateTime {
        self.started_at
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Replace the report wholesale. The old conversation no longer applies,
    /// so history is cleared too.
    pub fn load_report(&mut self, report: Report) {
        tracing::info!(session = %self.id, records = report.len(), "Report loaded");
        self.report = report;
        self.history.clear();
    }

    /// Explicit restart: keep the report, drop the conversation.
    pub fn reset(&mut self) {
        tracing::info!(session = %self.id, turns = self.history.len(), "Conversation reset");
        self.history.clear();
    }

    /// Run one turn against this session's report and history.
    pub fn ask<T, R>(
        &mut self,
        orchestrator: &QueryOrchestrator<'_, T, R>,
        question: &str,
        language: QuestionLanguage,
    ) -> QueryAnswer
    where
        T: TranslationProvider + ?Sized,
        R: ReasoningService + ?Sized,
    {
        orchestrator.ask_in(question, language, &self.report, &mut self.history)
    }
}

// ═══════════════════════════════════════════════════════════
// SessionStore — isolated sessions keyed by id
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<Uuid, QuerySession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session for `report` and return its id.
    pub fn create(&mut self, report: Report) -> Uuid {
        let session = QuerySession::new(report);
        let id = session.id();
        self.sessions.insert(id, session);
        tracing::debug!(session = %id, open = self.sessions.len(), "Session created");
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<&QuerySession> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut QuerySession> {
        self.sessions.get_mut(id)
    }

    pub fn remove(&mut self, id: &Uuid) -> Option<QuerySession> {
        self.sessions.remove(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
