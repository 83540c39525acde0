//! Scripted conversation interface.
//!
//! [`QueryConsole`] drives one conversation against a [`QueryService`] and
//! keeps a transcript. It backs the binary's console mode and the
//! scenario tests.
//!
//! # Example
//!
//! ```ignore
//! use waterwatch_core::headless::QueryConsole;
//!
//! let mut console = QueryConsole::new(service);
//! console.send("northern");
//! console.send("chiang mai");
//! let reply = console.send("mae rim 2025-09-01");
//! println!("{}", reply.response);
//! ```

use crate::dialog::{ConversationState, Step};
use crate::service::{QueryReply, QueryService};
use crate::session::ConversationId;
use chrono::NaiveDate;
use std::sync::Arc;

/// An entry in the conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    /// Turn number, starting at 1.
    pub turn: usize,
    /// What the user sent.
    pub input: String,
    /// What the service answered.
    pub response: String,
}

/// One conversation driven programmatically.
pub struct QueryConsole {
    service: Arc<QueryService>,
    id: ConversationId,
    today: Option<NaiveDate>,
    transcript: Vec<TranscriptEntry>,
}

impl QueryConsole {
    /// Start a conversation with a fresh random identity.
    pub fn new(service: Arc<QueryService>) -> Self {
        Self::with_id(service, ConversationId::new_random())
    }

    pub fn with_id(service: Arc<QueryService>, id: ConversationId) -> Self {
        Self {
            service,
            id,
            today: None,
            transcript: Vec::new(),
        }
    }

    /// Pin the date used when a message names none.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Send a message and record the exchange.
    pub fn send(&mut self, input: &str) -> QueryReply {
        let reply = match self.today {
            Some(today) => self.service.handle_message_on(&self.id, input, today),
            None => self.service.handle_message(&self.id, input),
        };
        self.record(input, &reply);
        reply
    }

    /// Send a message with an explicit "today".
    pub fn send_on(&mut self, input: &str, today: NaiveDate) -> QueryReply {
        let reply = self.service.handle_message_on(&self.id, input, today);
        self.record(input, &reply);
        reply
    }

    fn record(&mut self, input: &str, reply: &QueryReply) {
        self.transcript.push(TranscriptEntry {
            turn: self.transcript.len() + 1,
            input: input.to_string(),
            response: reply.response.clone(),
        });
    }

    /// Current conversation state.
    pub fn state(&self) -> ConversationState {
        self.service.state(&self.id).unwrap_or_default()
    }

    pub fn step(&self) -> Step {
        self.state().step()
    }

    pub fn conversation_id(&self) -> &ConversationId {
        &self.id
    }

    /// Get the transcript of all exchanges.
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// Get the last response, if any.
    pub fn last_response(&self) -> Option<&str> {
        self.transcript.last().map(|e| e.response.as_str())
    }

    /// Render the transcript as plain text.
    pub fn transcript_text(&self) -> String {
        self.transcript
            .iter()
            .map(|e| format!("[{}] > {}\n{}\n", e.turn, e.input, e.response))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn service(&self) -> &Arc<QueryService> {
        &self.service
    }
}
