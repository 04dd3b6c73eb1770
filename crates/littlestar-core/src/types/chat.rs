//! Chat types for the AI teacher conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who said a chat message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChatRole {
    /// The student at the keyboard.
    Student,
    /// The AI teacher persona.
    Teacher,
}

/// One message in the teacher chat.
///
/// The conversation is an append-only list; message order is the only
/// invariant the rest of the system relies on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    /// When the message was appended.
    pub at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn student(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Student,
            text: text.into(),
            at: Utc::now(),
        }
    }

    pub fn teacher(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Teacher,
            text: text.into(),
            at: Utc::now(),
        }
    }
}
