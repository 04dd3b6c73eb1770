//! The pure decode stages: base64 payload → bytes → normalized frames.
//!
//! The text-to-speech boundary delivers `audio/L16` payloads: base64-encoded
//! raw signed 16-bit little-endian PCM at a known sample rate and channel
//! count. Both stages here are synchronous and side-effect free.

use base64::{engine::general_purpose, Engine as _};
use littlestar_core::{Error, Result};
use tracing::warn;

use crate::frame::AudioFrame;

/// Scale factor for 16-bit PCM normalization.
const PCM16_SCALE: f32 = 32768.0;

/// Decode a standard-alphabet base64 string into raw bytes.
///
/// Padding is accepted. Malformed input fails with [`Error::Decode`].
pub fn decode_base64(input: &str) -> Result<Vec<u8>> {
    general_purpose::STANDARD
        .decode(input)
        .map_err(|e| Error::Decode(format!("invalid base64 payload: {e}")))
}

/// Interpret raw bytes as interleaved signed 16-bit little-endian PCM.
///
/// Each pair of bytes becomes one sample, normalized by 1/32768 and clamped
/// to `[-1.0, 1.0]`. Sample `i` of channel `c` is read at byte offset
/// `(i * channels + c) * 2`.
///
/// Byte lengths that are not a multiple of `2 * channels` are truncated to
/// the last whole frame; the trailing partial frame is dropped and a
/// warning logged. The policy is deterministic across runs.
pub fn decode_pcm16(bytes: &[u8], sample_rate: u32, channels: u16) -> Result<AudioFrame> {
    if channels == 0 {
        return Err(Error::Format("channel count must be at least 1".into()));
    }
    if sample_rate == 0 {
        return Err(Error::Format("sample rate must be nonzero".into()));
    }

    let bytes_per_frame = 2 * usize::from(channels);
    let remainder = bytes.len() % bytes_per_frame;
    if remainder != 0 {
        warn!(
            "PCM payload of {} bytes not aligned to {}-byte frames, truncating {} trailing bytes",
            bytes.len(),
            bytes_per_frame,
            remainder
        );
    }

    let frame_count = bytes.len() / bytes_per_frame;
    let mut samples = vec![Vec::with_capacity(frame_count); usize::from(channels)];

    for frame in 0..frame_count {
        for (c, plane) in samples.iter_mut().enumerate() {
            let offset = frame * bytes_per_frame + c * 2;
            let raw = i16::from_le_bytes([bytes[offset], bytes[offset + 1]]);
            plane.push((f32::from(raw) / PCM16_SCALE).clamp(-1.0, 1.0));
        }
    }

    Ok(AudioFrame::from_planar(sample_rate, samples))
}
