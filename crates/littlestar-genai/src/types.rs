//! Wire types for the generative language REST API.

use littlestar_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Request body for a `generateContent` call.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

/// One turn of content, a sequence of parts with an optional role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

impl Content {
    /// A user-role text turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".into()),
            parts: vec![Part::text(text)],
        }
    }

    /// A model-role text turn.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Some("model".into()),
            parts: vec![Part::text(text)],
        }
    }

    /// A role-less turn, used for system instructions.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenated text of all text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect()
    }
}

/// A single content part: text or inline binary data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }
}

/// Base64-encoded binary payload with its mime type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Generation tuning knobs. Only the fields this app uses are modeled.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    /// OpenAPI-subset schema constraining structured JSON output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_config: Option<SpeechConfig>,
}

/// Speech synthesis configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    pub voice_config: VoiceConfig,
}

impl SpeechConfig {
    pub fn prebuilt_voice(name: impl Into<String>) -> Self {
        Self {
            voice_config: VoiceConfig {
                prebuilt_voice_config: PrebuiltVoiceConfig {
                    voice_name: name.into(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

/// Response body for a `generateContent` call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, or a [`Error::Blocked`] explaining why
    /// there is none.
    pub fn into_text(self) -> Result<String> {
        if let Some(feedback) = &self.prompt_feedback {
            if let Some(reason) = &feedback.block_reason {
                return Err(Error::Blocked(format!("prompt blocked: {reason}")));
            }
        }

        let text = self
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.text())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(Error::Blocked("response has no text candidate".into()));
        }
        Ok(text)
    }

    /// Inline data of the first candidate (the TTS audio payload).
    pub fn into_inline_data(self) -> Result<InlineData> {
        self.candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().find_map(|p| p.inline_data))
            .ok_or_else(|| Error::Blocked("response has no inline data".into()))
    }
}

/// Synthesized speech: a base64 PCM payload at a known sample rate and
/// channel count, ready for the audio pipeline.
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    /// Base64-encoded signed 16-bit little-endian PCM.
    pub data: String,
    pub sample_rate: u32,
    pub channels: u16,
}

impl SpeechAudio {
    /// Sample rate assumed when the mime type does not carry one.
    pub const FALLBACK_RATE: u32 = 24000;

    /// Build from an inline payload, reading the rate from a mime type of
    /// the form `audio/L16;codec=pcm;rate=24000`.
    pub fn from_inline(inline: InlineData) -> Self {
        let sample_rate = parse_l16_rate(&inline.mime_type).unwrap_or(Self::FALLBACK_RATE);
        Self {
            data: inline.data,
            sample_rate,
            channels: 1,
        }
    }
}

/// Extract the `rate=` parameter from an `audio/L16` mime type.
fn parse_l16_rate(mime: &str) -> Option<u32> {
    mime.split(';')
        .map(str::trim)
        .find_map(|param| param.strip_prefix("rate="))
        .and_then(|rate| rate.parse().ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serializes_camel_case() {
        let request = GenerateContentRequest {
            contents: vec![Content::user("hello")],
            system_instruction: Some(Content::system("be kind")),
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".into()),
                ..Default::default()
            }),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert!(value["systemInstruction"].is_object());
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        // Unset options stay off the wire entirely.
        assert!(value["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn test_speech_config_shape() {
        let config = GenerationConfig {
            response_modalities: Some(vec!["AUDIO".into()]),
            speech_config: Some(SpeechConfig::prebuilt_voice("Kore")),
            ..Default::default()
        };

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Kore"
        );
    }

    #[test]
    fn test_response_text_extraction() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{"text": "Hello, "}, {"text": "student!"}]
                },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        assert_eq!(response.into_text().unwrap(), "Hello, student!");
    }

    #[test]
    fn test_blocked_prompt_reported() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();

        assert!(matches!(response.into_text(), Err(Error::Blocked(_))));
    }

    #[test]
    fn test_inline_data_extraction() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "parts": [{
                        "inlineData": {
                            "mimeType": "audio/L16;codec=pcm;rate=24000",
                            "data": "AAAA"
                        }
                    }]
                }
            }]
        }))
        .unwrap();

        let audio = SpeechAudio::from_inline(response.into_inline_data().unwrap());
        assert_eq!(audio.sample_rate, 24000);
        assert_eq!(audio.channels, 1);
        assert_eq!(audio.data, "AAAA");
    }

    #[test]
    fn test_mime_rate_parsing() {
        assert_eq!(parse_l16_rate("audio/L16;codec=pcm;rate=24000"), Some(24000));
        assert_eq!(parse_l16_rate("audio/L16; rate=16000"), Some(16000));
        assert_eq!(parse_l16_rate("audio/L16"), None);
        assert_eq!(parse_l16_rate("audio/L16;rate=abc"), None);
    }
}
