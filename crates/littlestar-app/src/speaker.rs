//! Speech service connecting the API client to the audio pipeline.

use littlestar_audio::{decode_base64, decode_pcm16, AudioContext, PlaybackHandle};
use littlestar_core::Result;
use littlestar_genai::GenAiClient;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

/// Turns text into audible speech.
///
/// Synthesis and playback failures are logged and swallowed; decode errors
/// (a malformed payload) are surfaced to the caller. Starting a new
/// utterance cancels the previous one.
pub struct Speaker {
    client: GenAiClient,
    context: Option<AudioContext>,
    current: Mutex<Option<PlaybackHandle>>,
}

impl Speaker {
    /// Create a speaker. `context` may be `None` for muted operation.
    pub fn new(client: GenAiClient, context: Option<AudioContext>) -> Self {
        if context.is_none() {
            info!("Speaker running muted");
        }
        Self {
            client,
            context,
            current: Mutex::new(None),
        }
    }

    /// Unlock audio output after the first user interaction.
    pub fn resume_audio(&self) {
        if let Some(context) = &self.context {
            context.resume();
        }
    }

    /// Speak `text`, replacing whatever is currently playing.
    ///
    /// Returns `Ok` even when synthesis or playback fails; only a payload
    /// that cannot be decoded is reported as an error.
    pub async fn speak(&self, text: &str) -> Result<()> {
        let Some(context) = &self.context else {
            debug!("Muted, skipping speech");
            return Ok(());
        };

        let audio = match self.client.synthesize(text).await {
            Ok(audio) => audio,
            Err(e) => {
                warn!("Speech synthesis failed, continuing silently: {e}");
                return Ok(());
            }
        };

        let bytes = decode_base64(&audio.data)?;
        let frame = decode_pcm16(&bytes, audio.sample_rate, audio.channels)?;

        self.stop();

        match context.play(frame) {
            Ok(handle) => {
                *self.current.lock() = Some(handle);
            }
            Err(e) => {
                warn!("Playback failed, continuing silently: {e}");
            }
        }

        Ok(())
    }

    /// Speak and suspend until the utterance has fully played out.
    pub async fn speak_and_wait(&self, text: &str) -> Result<()> {
        self.speak(text).await?;

        let handle = self.current.lock().take();
        if let Some(handle) = handle {
            let outcome = handle.wait().await;
            debug!("Utterance resolved: {outcome:?}");
        }
        Ok(())
    }

    /// Cancel the current utterance, if any.
    pub fn stop(&self) {
        let previous = self.current.lock().take();
        if let Some(previous) = previous {
            previous.cancel();
        }
    }
}

impl Drop for Speaker {
    fn drop(&mut self) {
        self.stop();
    }
}
