//! # littlestar-genai
//!
//! Client for the generative language API behind Little Star English.
//!
//! Three operations matter to the app: structured lesson generation,
//! text-to-speech synthesis (returning base64 PCM), and multi-turn chat
//! with the teacher persona. Each lives in its own endpoint module on
//! [`GenAiClient`].

pub mod client;
pub mod config;
pub mod endpoints;
pub mod types;

pub use client::GenAiClient;
pub use config::ClientConfig;
pub use endpoints::chat::ChatSession;
pub use types::SpeechAudio;
