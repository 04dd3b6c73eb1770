//! Lesson types: vocabulary, story, and quiz.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A complete generated lesson for one topic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Lesson {
    /// Lesson title (e.g. "Fun with Animals").
    pub title: String,
    /// Id of the topic this lesson was generated for.
    pub topic_id: String,
    /// Words to learn, with meanings and example sentences.
    pub vocabulary: Vec<VocabularyItem>,
    /// A short story using the vocabulary, one paragraph per entry.
    pub story: Vec<String>,
    /// Comprehension quiz.
    pub quiz: Vec<QuizQuestion>,
}

impl Lesson {
    /// Check the structural invariants of a generated lesson.
    ///
    /// The generative model is asked for this shape via a response schema,
    /// but the output is still untrusted until validated.
    pub fn validate(&self) -> Result<()> {
        if self.vocabulary.is_empty() {
            return Err(Error::ParseError("lesson has no vocabulary".into()));
        }
        if self.story.iter().all(String::is_empty) {
            return Err(Error::ParseError("lesson has no story".into()));
        }
        for (i, question) in self.quiz.iter().enumerate() {
            if !question.is_valid() {
                return Err(Error::ParseError(format!(
                    "quiz question {i} is malformed: {:?}",
                    question.question
                )));
            }
        }
        Ok(())
    }

    /// All lesson text in reading order, for read-aloud playback.
    pub fn narration(&self) -> String {
        let mut parts = vec![self.title.clone()];
        parts.extend(self.vocabulary.iter().map(|v| v.word.clone()));
        parts.extend(self.story.iter().cloned());
        parts.join(". ")
    }
}

/// A single vocabulary entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VocabularyItem {
    /// The English word being taught.
    pub word: String,
    /// Meaning in the student's first language.
    pub meaning: String,
    /// A simple example sentence using the word.
    pub example: String,
}

impl VocabularyItem {
    pub fn new(
        word: impl Into<String>,
        meaning: impl Into<String>,
        example: impl Into<String>,
    ) -> Self {
        Self {
            word: word.into(),
            meaning: meaning.into(),
            example: example.into(),
        }
    }
}

/// A multiple-choice quiz question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuizQuestion {
    /// The question prompt.
    pub question: String,
    /// Candidate answers.
    pub options: Vec<String>,
    /// Index of the correct answer within `options`.
    pub answer_index: usize,
}

impl QuizQuestion {
    /// A question needs at least two options and an in-range answer.
    pub fn is_valid(&self) -> bool {
        self.options.len() >= 2 && self.answer_index < self.options.len()
    }

    /// The correct answer text, if the question is well-formed.
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.answer_index).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_lesson() -> Lesson {
        Lesson {
            title: "Fun with Animals".into(),
            topic_id: "animals".into(),
            vocabulary: vec![VocabularyItem::new("cat", "猫", "The cat is sleeping.")],
            story: vec!["A little cat lived in a big house.".into()],
            quiz: vec![QuizQuestion {
                question: "What is sleeping?".into(),
                options: vec!["The cat".into(), "The dog".into()],
                answer_index: 0,
            }],
        }
    }

    #[test]
    fn test_valid_lesson() {
        assert!(sample_lesson().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_answer_rejected() {
        let mut lesson = sample_lesson();
        lesson.quiz[0].answer_index = 5;
        assert!(lesson.validate().is_err());
        assert!(lesson.quiz[0].correct_option().is_none());
    }

    #[test]
    fn test_empty_vocabulary_rejected() {
        let mut lesson = sample_lesson();
        lesson.vocabulary.clear();
        assert!(lesson.validate().is_err());
    }

    #[test]
    fn test_narration_contains_story() {
        let lesson = sample_lesson();
        let narration = lesson.narration();
        assert!(narration.contains("Fun with Animals"));
        assert!(narration.contains("A little cat lived"));
    }
}
