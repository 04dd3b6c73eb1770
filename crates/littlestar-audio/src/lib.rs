//! # littlestar-audio
//!
//! The audio decode and playback pipeline for Little Star English.
//!
//! A text-to-speech call hands this crate a base64 string of raw 16-bit PCM.
//! The pipeline is: base64 decode → PCM frame interpretation → playback
//! scheduling through the host audio device, with a completion future per
//! playback and explicit cancellation.
//!
//! The [`AudioContext`] is constructed once by the application's composition
//! root and passed to anything that needs to make sound. It starts suspended
//! and must be resumed after the first user interaction, mirroring host
//! environments that gate audio output on a user gesture.

pub mod buffer;
pub mod context;
pub mod frame;
pub mod pcm;
pub mod resample;
pub mod scheduler;
pub mod sink;

pub use context::AudioContext;
pub use frame::AudioFrame;
pub use pcm::{decode_base64, decode_pcm16};
pub use scheduler::{PlaybackHandle, PlaybackOutcome, PlaybackState};
