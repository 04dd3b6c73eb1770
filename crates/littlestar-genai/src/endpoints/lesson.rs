//! Structured lesson generation.

use littlestar_core::{Error, Lesson, QuizQuestion, Result, Topic, VocabularyItem};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::types::{Content, GenerateContentRequest, GenerationConfig};
use crate::GenAiClient;

/// System instruction for the lesson writer.
const LESSON_INSTRUCTION: &str = "You are writing an English lesson for a \
primary-school child who is just starting to learn English. Use short, \
simple sentences. Be warm and encouraging. Give meanings in the child's \
first language where asked.";

/// The JSON shape the model is asked to produce.
fn lesson_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "vocabulary": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "word": { "type": "STRING" },
                        "meaning": { "type": "STRING" },
                        "example": { "type": "STRING" }
                    },
                    "required": ["word", "meaning", "example"]
                }
            },
            "story": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            },
            "quiz": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "question": { "type": "STRING" },
                        "options": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "answerIndex": { "type": "INTEGER" }
                    },
                    "required": ["question", "options", "answerIndex"]
                }
            }
        },
        "required": ["title", "vocabulary", "story", "quiz"]
    })
}

/// Lesson as the model returns it, before validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LessonPayload {
    title: String,
    vocabulary: Vec<VocabularyPayload>,
    story: Vec<String>,
    quiz: Vec<QuizPayload>,
}

#[derive(Debug, Deserialize)]
struct VocabularyPayload {
    word: String,
    meaning: String,
    example: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuizPayload {
    question: String,
    options: Vec<String>,
    answer_index: usize,
}

impl LessonPayload {
    fn into_lesson(self, topic_id: &str) -> Lesson {
        Lesson {
            title: self.title,
            topic_id: topic_id.to_string(),
            vocabulary: self
                .vocabulary
                .into_iter()
                .map(|v| VocabularyItem::new(v.word, v.meaning, v.example))
                .collect(),
            story: self.story,
            quiz: self
                .quiz
                .into_iter()
                .map(|q| QuizQuestion {
                    question: q.question,
                    options: q.options,
                    answer_index: q.answer_index,
                })
                .collect(),
        }
    }
}

impl GenAiClient {
    /// Generate a complete lesson for a topic.
    ///
    /// The model is constrained to the lesson JSON schema; the parsed result
    /// is still validated before it reaches the student.
    pub async fn generate_lesson(&self, topic: &Topic) -> Result<Lesson> {
        let prompt = format!(
            "Write a lesson about the topic \"{}\". Include 5 vocabulary \
             words, a story of 3 short paragraphs that uses those words, and \
             3 quiz questions with 3 options each.",
            topic.title
        );

        let request = GenerateContentRequest {
            contents: vec![Content::user(prompt)],
            system_instruction: Some(Content::system(LESSON_INSTRUCTION)),
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".into()),
                response_schema: Some(lesson_schema()),
                ..Default::default()
            }),
        };

        let response = self
            .generate(self.config.text_model(), &request)
            .await
            .map_err(|e| Error::GenAi(format!("lesson generation failed: {e}")))?;

        let text = response.into_text()?;
        let payload: LessonPayload = serde_json::from_str(&text)
            .map_err(|e| Error::ParseError(format!("lesson JSON is malformed: {e}")))?;

        let lesson = payload.into_lesson(&topic.id);
        lesson.validate()?;

        info!(
            "Generated lesson \"{}\": {} words, {} quiz questions",
            lesson.title,
            lesson.vocabulary.len(),
            lesson.quiz.len()
        );
        Ok(lesson)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_requires_all_sections() {
        let schema = lesson_schema();
        let required: Vec<_> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, vec!["title", "vocabulary", "story", "quiz"]);
    }

    #[test]
    fn test_payload_maps_to_lesson() {
        let payload: LessonPayload = serde_json::from_value(serde_json::json!({
            "title": "Fun with Colors",
            "vocabulary": [
                {"word": "red", "meaning": "rojo", "example": "The apple is red."}
            ],
            "story": ["Once upon a time there was a red balloon."],
            "quiz": [
                {"question": "What color is the balloon?",
                 "options": ["Red", "Blue"],
                 "answerIndex": 0}
            ]
        }))
        .unwrap();

        let lesson = payload.into_lesson("colors");
        assert_eq!(lesson.topic_id, "colors");
        assert_eq!(lesson.vocabulary[0].word, "red");
        assert_eq!(lesson.quiz[0].answer_index, 0);
        assert!(lesson.validate().is_ok());
    }

    #[test]
    fn test_malformed_payload_fails_validation() {
        let payload: LessonPayload = serde_json::from_value(serde_json::json!({
            "title": "Broken",
            "vocabulary": [
                {"word": "cat", "meaning": "gato", "example": "A cat."}
            ],
            "story": ["A story."],
            "quiz": [
                {"question": "Q?", "options": ["A", "B"], "answerIndex": 7}
            ]
        }))
        .unwrap();

        assert!(payload.into_lesson("animals").validate().is_err());
    }
}
