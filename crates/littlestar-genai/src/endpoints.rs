//! Endpoint implementations: lesson generation, speech synthesis, chat.

pub mod chat;
pub mod lesson;
pub mod speech;
