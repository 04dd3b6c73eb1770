//! Multi-turn chat with the teacher persona.

use littlestar_core::{ChatMessage, ChatRole, Error, Result};
use tracing::debug;

use crate::types::{Content, GenerateContentRequest};
use crate::GenAiClient;

/// System instruction for the chat persona.
const TEACHER_PERSONA: &str = "You are Star, a cheerful English teacher for \
young children. Answer in one or two short, simple sentences. Gently correct \
mistakes, praise effort, and always end with a small question that keeps the \
child talking.";

/// A conversation with the AI teacher.
///
/// The history is append-only; messages are posted to the model in order on
/// every turn, which is what makes the conversation multi-turn.
pub struct ChatSession {
    client: GenAiClient,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(client: GenAiClient) -> Self {
        Self {
            client,
            history: Vec::new(),
        }
    }

    /// The full conversation so far, oldest first.
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Send a student message and return the teacher's reply.
    ///
    /// The student message is appended before the call and stays in the
    /// history even if the call fails.
    pub async fn send(&mut self, text: impl Into<String>) -> Result<ChatMessage> {
        let message = ChatMessage::student(text);
        self.history.push(message);
        debug!("Chat turn {} sent", self.history.len());

        let request = GenerateContentRequest {
            contents: build_contents(&self.history),
            system_instruction: Some(Content::system(TEACHER_PERSONA)),
            generation_config: None,
        };

        let response = self
            .client
            .generate(self.client.config.text_model(), &request)
            .await
            .map_err(|e| Error::GenAi(format!("chat turn failed: {e}")))?;

        let reply = ChatMessage::teacher(response.into_text()?);
        self.history.push(reply.clone());
        Ok(reply)
    }
}

/// Map the chat history onto API content turns.
fn build_contents(history: &[ChatMessage]) -> Vec<Content> {
    history
        .iter()
        .map(|message| match message.role {
            ChatRole::Student => Content::user(message.text.clone()),
            ChatRole::Teacher => Content::model(message.text.clone()),
        })
        .collect()
}
