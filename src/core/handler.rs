//! One ask-and-display cycle: validate the input, show a placeholder, ask the
//! server, show the answer or a fixed error.

use tracing::{debug, info, warn};

use crate::core::api::{AskRequest, AskTransport};
use crate::core::error::FETCH_ERROR_TEXT;

pub const EMPTY_PROMPT_TEXT: &str = "Please enter a question.";
pub const PROCESSING_TEXT: &str = "Processing...";

/// Trimmed, non-empty question text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    /// Returns `None` when nothing but whitespace is left after trimming.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_request(self) -> AskRequest {
        AskRequest { query: self.0 }
    }
}

/// Write-only slot the handler renders into.
pub trait ResponseSlot {
    fn show(&mut self, text: &str);
}

/// Terminal state of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Prompted,
    Answered(String),
    Failed,
}

/// The fixed strings the handler displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messages {
    pub empty_prompt: String,
    pub processing: String,
    pub fetch_error: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            empty_prompt: EMPTY_PROMPT_TEXT.to_string(),
            processing: PROCESSING_TEXT.to_string(),
            fetch_error: FETCH_ERROR_TEXT.to_string(),
        }
    }
}

pub struct QueryHandler<T> {
    transport: T,
    messages: Messages,
}

impl<T: AskTransport> QueryHandler<T> {
    pub fn new(transport: T) -> Self {
        Self::with_messages(transport, Messages::default())
    }

    pub fn with_messages(transport: T, messages: Messages) -> Self {
        Self {
            transport,
            messages,
        }
    }

    pub async fn handle<S>(&self, raw_input: &str, slot: &mut S) -> Outcome
    where
        S: ResponseSlot + Send,
    {
        let Some(query) = Query::parse(raw_input) else {
            debug!("empty question, not sending");
            slot.show(&self.messages.empty_prompt);
            return Outcome::Prompted;
        };

        slot.show(&self.messages.processing);
        debug!(query_len = query.as_str().len(), "sending question");

        match self.transport.ask(&query.into_request()).await {
            Ok(reply) => {
                info!(response_len = reply.response.len(), "answer received");
                slot.show(&reply.response);
                Outcome::Answered(reply.response)
            }
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "ask failed");
                slot.show(&self.messages.fetch_error);
                Outcome::Failed
            }
        }
    }
}
