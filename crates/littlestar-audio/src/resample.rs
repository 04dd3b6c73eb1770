//! Adapting decoded frames to the output device format.
//!
//! Speech frames arrive at the synthesis rate (24 kHz mono in practice) and
//! the output device dictates its own rate and channel count, so every
//! playback passes through a channel mix and, when the rates differ, a
//! rubato FFT resample.

use littlestar_core::{Error, Result};
use rubato::{FftFixedIn, Resampler as RubatoResampler};
use tracing::debug;

use crate::frame::AudioFrame;

/// Resampler chunk size in frames.
const CHUNK_SIZE: usize = 1024;

/// Convert a frame into interleaved samples in the device's native format.
pub(crate) fn adapt_to_device(
    frame: &AudioFrame,
    device_rate: u32,
    device_channels: u16,
) -> Result<Vec<f32>> {
    let planes = mix_channels(frame, device_channels);

    if frame.sample_rate() == device_rate {
        return Ok(interleave(&planes));
    }

    let resampled = resample_planar(&planes, frame.sample_rate(), device_rate)?;
    Ok(interleave(&resampled))
}

/// Map the frame's channel planes onto the device channel count.
///
/// Mono fans out to every output channel; extra input channels fold down by
/// averaging. Anything in between maps each output channel to the nearest
/// input plane.
fn mix_channels(frame: &AudioFrame, device_channels: u16) -> Vec<Vec<f32>> {
    let in_channels = usize::from(frame.channels());
    let out_channels = usize::from(device_channels.max(1));

    if out_channels == in_channels {
        return (0..in_channels)
            .map(|c| frame.channel(c).unwrap_or_default().to_vec())
            .collect();
    }

    if out_channels == 1 {
        // Fold down by averaging all input planes.
        let frames = frame.frame_count();
        let mut mono = vec![0.0f32; frames];
        for c in 0..in_channels {
            if let Some(plane) = frame.channel(c) {
                for (slot, sample) in mono.iter_mut().zip(plane) {
                    *slot += sample;
                }
            }
        }
        let scale = 1.0 / in_channels as f32;
        for slot in &mut mono {
            *slot *= scale;
        }
        return vec![mono];
    }

    (0..out_channels)
        .map(|c| {
            let source = c.min(in_channels - 1);
            frame.channel(source).unwrap_or_default().to_vec()
        })
        .collect()
}

/// Resample planar data with rubato, padding the final chunk and trimming
/// the output back to the exact expected length.
fn resample_planar(planes: &[Vec<f32>], input_rate: u32, output_rate: u32) -> Result<Vec<Vec<f32>>> {
    let channels = planes.len();
    let input_frames = planes.first().map_or(0, Vec::len);
    if input_frames == 0 {
        return Ok(vec![Vec::new(); channels]);
    }

    let mut resampler = FftFixedIn::new(
        input_rate as usize,
        output_rate as usize,
        CHUNK_SIZE,
        2,
        channels,
    )
    .map_err(|e| Error::AudioOutput(format!("failed to create resampler: {e}")))?;

    debug!(
        "Resampling {input_frames} frames: {input_rate} Hz -> {output_rate} Hz, {channels} channels"
    );

    let expected_frames =
        (input_frames as f64 * f64::from(output_rate) / f64::from(input_rate)).round() as usize;

    let mut output = vec![Vec::with_capacity(expected_frames); channels];
    let mut cursor = 0;

    while cursor < input_frames {
        let end = (cursor + CHUNK_SIZE).min(input_frames);
        let mut chunk: Vec<Vec<f32>> = planes.iter().map(|p| p[cursor..end].to_vec()).collect();

        // The final chunk is zero-padded up to the fixed input size.
        if end - cursor < CHUNK_SIZE {
            for plane in &mut chunk {
                plane.resize(CHUNK_SIZE, 0.0);
            }
        }

        let resampled = resampler
            .process(&chunk, None)
            .map_err(|e| Error::AudioOutput(format!("resample failed: {e}")))?;

        for (out_plane, res_plane) in output.iter_mut().zip(resampled) {
            out_plane.extend(res_plane);
        }

        cursor = end;
    }

    for plane in &mut output {
        plane.truncate(expected_frames);
    }

    Ok(output)
}

fn interleave(planes: &[Vec<f32>]) -> Vec<f32> {
    let Some(first) = planes.first() else {
        return Vec::new();
    };

    let frames = first.len();
    let mut output = Vec::with_capacity(frames * planes.len());

    for frame in 0..frames {
        for plane in planes {
            output.push(plane[frame]);
        }
    }

    output
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_same_format_passthrough() {
        let frame = AudioFrame::from_interleaved(24000, 1, &[0.1, 0.2, 0.3]);
        let out = adapt_to_device(&frame, 24000, 1).unwrap();
        assert_eq!(out, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_mono_fans_out_to_stereo() {
        let frame = AudioFrame::from_interleaved(24000, 1, &[0.5, -0.5]);
        let out = adapt_to_device(&frame, 24000, 2).unwrap();
        assert_eq!(out, vec![0.5, 0.5, -0.5, -0.5]);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_stereo_folds_down_to_mono() {
        let frame = AudioFrame::from_interleaved(24000, 2, &[1.0, 0.0, -1.0, 0.0]);
        let out = adapt_to_device(&frame, 24000, 1).unwrap();
        assert_eq!(out, vec![0.5, -0.5]);
    }

    #[test]
    fn test_upsampling_doubles_length() {
        let frame = AudioFrame::from_interleaved(24000, 1, &vec![0.25; 24000]);
        let out = adapt_to_device(&frame, 48000, 1).unwrap();
        assert_eq!(out.len(), 48000);
    }

    #[test]
    fn test_resample_and_fan_out_together() {
        let frame = AudioFrame::from_interleaved(24000, 1, &vec![0.1; 2400]);
        let out = adapt_to_device(&frame, 48000, 2).unwrap();
        // 2400 mono frames -> 4800 stereo frames -> 9600 interleaved samples.
        assert_eq!(out.len(), 9600);
    }

    #[test]
    fn test_empty_frame() {
        let frame = AudioFrame::from_interleaved(24000, 1, &[]);
        let out = adapt_to_device(&frame, 48000, 2).unwrap();
        assert!(out.is_empty());
    }
}
