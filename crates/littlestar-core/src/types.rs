//! Core domain types for Little Star English.

pub mod chat;
pub mod lesson;
pub mod topic;

pub use chat::{ChatMessage, ChatRole};
pub use lesson::{Lesson, QuizQuestion, VocabularyItem};
pub use topic::Topic;
