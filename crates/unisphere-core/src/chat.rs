//! Chat widget session state.
//!
//! A [`ChatSession`] is owned by whoever mounts the chat and threaded through
//! each exchange: [`ChatSession::prepare`] builds the request,
//! [`ChatSession::complete`] records the outcome and hands the session back.

use std::collections::VecDeque;
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ModelError;
use crate::model::RecordId;

/// Most recent messages kept in a session.
pub const MAX_HISTORY: usize = 10;

/// Reply recorded when an exchange fails.
pub const CHAT_ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";

pub const SUGGESTED_QUESTIONS: [&str; 10] = [
    "What security requirements are in this RFP?",
    "How does Vendor A compare to Vendor B?",
    "Summarize the key requirements in this RFP",
    "What are the risks associated with Vendor C's bid?",
    "Does this bid comply with FISMA requirements?",
    "What are the strengths and weaknesses of this proposal?",
    "How many technical requirements are in this RFP?",
    "What is the sentiment analysis of this vendor's bid?",
    "Are there any gaps between this RFP and the vendor's proposal?",
    "What is the overall compliance score for this bid?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Body of `POST /api/chatbot`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rfp_id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid_id: Option<RecordId>,
    pub chat_history: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderInfo {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub success: bool,
}

/// Response of `POST /api/chatbot`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub provider_info: Option<ProviderInfo>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatSession {
    history: VecDeque<ChatMessage>,
    rfp_id: Option<RecordId>,
    bid_id: Option<RecordId>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session whose questions are about one RFP and, optionally, one bid.
    pub fn with_context(rfp_id: Option<RecordId>, bid_id: Option<RecordId>) -> Self {
        Self {
            rfp_id,
            bid_id,
            ..Self::default()
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &ChatMessage> {
        self.history.iter()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    fn push(&mut self, message: ChatMessage) {
        self.history.push_back(message);
        while self.history.len() > MAX_HISTORY {
            self.history.pop_front();
        }
    }

    /// History as the backend expects it: strictly alternating turns starting
    /// with the user. Messages out of turn are dropped.
    pub fn alternating_history(&self) -> Vec<ChatMessage> {
        self.history
            .iter()
            .enumerate()
            .filter(|(i, m)| {
                let expected = if i % 2 == 0 {
                    ChatRole::User
                } else {
                    ChatRole::Assistant
                };
                m.role == expected
            })
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Build the request for `message` without touching the history.
    pub fn prepare(&self, message: &str) -> Result<ChatRequest, ModelError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ModelError::EmptyMessage);
        }
        Ok(ChatRequest {
            message: message.to_string(),
            rfp_id: self.rfp_id,
            bid_id: self.bid_id,
            chat_history: self.alternating_history(),
        })
    }

    /// Record one exchange and return the session with the text to show.
    pub fn complete<E: Display>(
        mut self,
        request: &ChatRequest,
        outcome: Result<ChatReply, E>,
    ) -> (Self, String) {
        let reply = match outcome {
            Ok(reply) => reply.response,
            Err(err) => {
                warn!(error = %err, "chat request failed");
                CHAT_ERROR_REPLY.to_string()
            }
        };
        self.push(ChatMessage::user(request.message.clone()));
        self.push(ChatMessage::assistant(reply.clone()));
        (self, reply)
    }
}
