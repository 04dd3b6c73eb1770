//! Session state for one run of the app.

use littlestar_core::{Lesson, Topic};
use littlestar_genai::{ChatSession, GenAiClient};

/// What the student is currently working with.
pub struct Session {
    /// The most recently generated lesson, if any.
    pub lesson: Option<Lesson>,
    /// The running teacher conversation.
    pub chat: ChatSession,
    /// Topics offered in the menu.
    pub topics: Vec<Topic>,
}

impl Session {
    pub fn new(client: GenAiClient) -> Self {
        Self {
            lesson: None,
            chat: ChatSession::new(client),
            topics: Topic::starters(),
        }
    }

    /// Look up a topic by its 1-based menu number.
    pub fn topic_by_number(&self, number: usize) -> Option<&Topic> {
        number.checked_sub(1).and_then(|i| self.topics.get(i))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use littlestar_genai::ClientConfig;

    #[test]
    fn test_topic_lookup_is_one_based() {
        let client = GenAiClient::new(ClientConfig::new("k")).unwrap();
        let session = Session::new(client);

        assert!(session.topic_by_number(0).is_none());
        assert_eq!(
            session.topic_by_number(1).map(|t| t.id.as_str()),
            Some("animals")
        );
        assert!(session.topic_by_number(99).is_none());
    }
}
