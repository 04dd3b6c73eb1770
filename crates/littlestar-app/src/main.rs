//! # Little Star English
//!
//! An AI English tutor for primary-school children: pick a topic, get a
//! generated lesson, hear it read aloud, and chat with the teacher.

mod session;
mod shell;
mod speaker;

use anyhow::Result;
use clap::Parser;
use littlestar_audio::AudioContext;
use littlestar_genai::{ClientConfig, GenAiClient};
use speaker::Speaker;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line options.
#[derive(Parser, Debug)]
#[command(name = "littlestar", about = "Little Star English - an AI English tutor for kids")]
struct Args {
    /// API key for the generative language API.
    #[arg(long, env = littlestar_genai::config::API_KEY_ENV)]
    api_key: String,

    /// Base URL override for the generative language API.
    #[arg(long)]
    base_url: Option<String>,

    /// Model used for lessons and chat.
    #[arg(long)]
    text_model: Option<String>,

    /// Model used for speech synthesis.
    #[arg(long)]
    tts_model: Option<String>,

    /// Synthesis voice name.
    #[arg(long)]
    voice: Option<String>,

    /// Run without audio output.
    #[arg(long)]
    mute: bool,
}

impl Args {
    fn into_config(self) -> Result<(ClientConfig, bool)> {
        let mut config = ClientConfig::new(self.api_key);
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url)?;
        }
        if let Some(model) = self.text_model {
            config = config.with_text_model(model);
        }
        if let Some(model) = self.tts_model {
            config = config.with_tts_model(model);
        }
        if let Some(voice) = self.voice {
            config = config.with_voice(voice);
        }
        Ok((config, self.mute))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "littlestar=info,littlestar_audio=info".into()),
        )
        .init();

    info!("Starting Little Star English v{}", env!("CARGO_PKG_VERSION"));

    let (config, mute) = Args::parse().into_config()?;
    let client = GenAiClient::new(config)?;

    // Audio is optional: a lesson with no sound is better than no lesson.
    let context = if mute {
        None
    } else {
        match AudioContext::new() {
            Ok(context) => Some(context),
            Err(e) => {
                warn!("Audio unavailable, continuing muted: {e}");
                None
            }
        }
    };

    let speaker = Speaker::new(client.clone(), context);
    shell::run(client, speaker).await
}
