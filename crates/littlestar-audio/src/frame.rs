//! Normalized audio frames.

use std::time::Duration;

/// A decoded block of normalized audio.
///
/// Samples are stored planar: one `Vec<f32>` per channel, every value in
/// `[-1.0, 1.0]`. All channel planes have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    sample_rate: u32,
    channels: u16,
    samples: Vec<Vec<f32>>,
}

impl AudioFrame {
    /// Build a frame from planar channel data.
    ///
    /// Callers must pass one plane per channel with equal lengths; the PCM
    /// interpreter in [`crate::pcm`] is the normal producer and maintains
    /// this by construction.
    pub(crate) fn from_planar(sample_rate: u32, samples: Vec<Vec<f32>>) -> Self {
        debug_assert!(!samples.is_empty());
        debug_assert!(samples.windows(2).all(|w| w[0].len() == w[1].len()));

        Self {
            sample_rate,
            channels: samples.len() as u16,
            samples,
        }
    }

    /// Build a frame from interleaved samples.
    ///
    /// Trailing samples that do not fill a whole frame across all channels
    /// are dropped.
    pub fn from_interleaved(sample_rate: u32, channels: u16, interleaved: &[f32]) -> Self {
        let channel_count = usize::from(channels.max(1));
        let frames = interleaved.len() / channel_count;

        let mut samples = vec![Vec::with_capacity(frames); channel_count];
        for frame in 0..frames {
            for (c, plane) in samples.iter_mut().enumerate() {
                plane.push(interleaved[frame * channel_count + c]);
            }
        }

        Self {
            sample_rate,
            channels: channel_count as u16,
            samples,
        }
    }

    /// Samples per second.
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels.
    pub const fn channels(&self) -> u16 {
        self.channels
    }

    /// Samples per channel.
    pub fn frame_count(&self) -> usize {
        self.samples.first().map_or(0, Vec::len)
    }

    /// True if the frame carries no audio.
    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    /// Audible duration of this frame.
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frame_count() as f64 / f64::from(self.sample_rate))
    }

    /// Borrow one channel plane.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.samples.get(index).map(Vec::as_slice)
    }

    /// Interleave the planes for the output path (L R L R ... for stereo).
    pub fn interleaved(&self) -> Vec<f32> {
        let frames = self.frame_count();
        let mut output = Vec::with_capacity(frames * usize::from(self.channels));

        for frame in 0..frames {
            for plane in &self.samples {
                output.push(plane[frame]);
            }
        }

        output
    }
}
