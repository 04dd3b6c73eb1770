//! Lesson topics a student can pick from.

use serde::{Deserialize, Serialize};

/// A lesson topic (e.g. "Animals", "My Family").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Topic {
    /// Stable identifier used in prompts and logs.
    pub id: String,
    /// Display title shown to the student.
    pub title: String,
    /// Emoji decorating the menu entry.
    pub emoji: String,
}

impl Topic {
    pub fn new(id: impl Into<String>, title: impl Into<String>, emoji: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            emoji: emoji.into(),
        }
    }

    /// The built-in starter topics for a first-time student.
    pub fn starters() -> Vec<Self> {
        vec![
            Self::new("animals", "Animals", "🐱"),
            Self::new("colors", "Colors", "🌈"),
            Self::new("family", "My Family", "👨‍👩‍👧"),
            Self::new("food", "Yummy Food", "🍎"),
            Self::new("school", "At School", "🏫"),
            Self::new("weather", "The Weather", "☀️"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starters_have_unique_ids() {
        let topics = Topic::starters();
        assert!(!topics.is_empty());

        let mut ids: Vec<_> = topics.iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), topics.len());
    }
}
