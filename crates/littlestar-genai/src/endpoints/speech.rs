//! Text-to-speech synthesis.

use littlestar_core::{Error, Result};
use tracing::{debug, info};

use crate::types::{Content, GenerateContentRequest, GenerationConfig, SpeechAudio, SpeechConfig};
use crate::GenAiClient;

impl GenAiClient {
    /// Synthesize speech for a piece of lesson text.
    ///
    /// Returns the base64 PCM payload with its sample rate and channel
    /// count; feeding it to the audio pipeline is the caller's job.
    pub async fn synthesize(&self, text: &str) -> Result<SpeechAudio> {
        if text.trim().is_empty() {
            return Err(Error::InvalidArgument("nothing to synthesize".into()));
        }

        debug!("Synthesizing {} characters", text.len());

        let request = GenerateContentRequest {
            contents: vec![Content::user(text)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".into()]),
                speech_config: Some(SpeechConfig::prebuilt_voice(self.config.voice())),
                ..Default::default()
            }),
        };

        let response = self
            .generate(self.config.tts_model(), &request)
            .await
            .map_err(|e| Error::GenAi(format!("speech synthesis failed: {e}")))?;

        let audio = SpeechAudio::from_inline(response.into_inline_data()?);
        info!(
            "Synthesized audio: {} base64 chars at {} Hz",
            audio.data.len(),
            audio.sample_rate
        );
        Ok(audio)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ClientConfig;

    #[tokio::test]
    async fn test_empty_text_rejected_before_network() {
        let client = GenAiClient::new(ClientConfig::new("k")).unwrap();
        let result = client.synthesize("   ").await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
}
