//! Client configuration.

use littlestar_core::{Error, HttpError, Result};
use url::Url;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model for lesson generation and chat.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Default model for speech synthesis.
pub const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";

/// Default prebuilt voice for the teacher persona.
pub const DEFAULT_VOICE: &str = "Kore";

/// Environment variable consulted by [`ClientConfig::from_env`].
pub const API_KEY_ENV: &str = "LITTLESTAR_API_KEY";

/// Configuration for a [`crate::GenAiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    api_key: String,
    base_url: Url,
    text_model: String,
    tts_model: String,
    voice: String,
}

impl ClientConfig {
    /// Create a config with the given API key and all defaults.
    #[allow(clippy::unwrap_used)] // The default URL is a valid literal
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Url::parse(DEFAULT_BASE_URL).unwrap(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
        }
    }

    /// Read the API key from the `LITTLESTAR_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let key = std::env::var(API_KEY_ENV)
            .map_err(|_| Error::InvalidArgument(format!("{API_KEY_ENV} is not set")))?;
        Ok(Self::new(key))
    }

    /// Override the API base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = Url::parse(base_url)
            .map_err(|e| Error::Http(HttpError::InvalidUrl(format!("{base_url}: {e}"))))?;
        Ok(self)
    }

    /// Override the lesson/chat model.
    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    /// Override the speech model.
    pub fn with_tts_model(mut self, model: impl Into<String>) -> Self {
        self.tts_model = model.into();
        self
    }

    /// Override the synthesis voice.
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn text_model(&self) -> &str {
        &self.text_model
    }

    pub fn tts_model(&self) -> &str {
        &self.tts_model
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("test-key");
        assert_eq!(config.api_key(), "test-key");
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.voice(), DEFAULT_VOICE);
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = ClientConfig::new("k").with_base_url("not a url");
        assert!(matches!(
            result,
            Err(Error::Http(HttpError::InvalidUrl(_)))
        ));
    }

    #[test]
    fn test_builders() {
        let config = ClientConfig::new("k")
            .with_text_model("test-text")
            .with_tts_model("test-tts")
            .with_voice("Puck");

        assert_eq!(config.text_model(), "test-text");
        assert_eq!(config.tts_model(), "test-tts");
        assert_eq!(config.voice(), "Puck");
    }
}
