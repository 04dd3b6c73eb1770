//! Host audio output sinks.
//!
//! A sink drains the context's ring buffer and turns samples into audible
//! output. The default sink is backed by cpal; a simulated sink exists for
//! tests and headless environments. Sinks are constructed inside the
//! scheduler's worker thread through a [`SinkFactory`] because the cpal
//! `Stream` is not `Send`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use littlestar_core::{Error, Result};
use parking_lot::RwLock;
use tracing::{debug, error, info};

use crate::buffer::SharedRingBuffer;

/// Whether the owning context is currently allowed to make sound.
///
/// The context starts suspended; the gate opens on `resume()` and every sink
/// emits silence while it is closed, leaving buffered samples in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextState {
    #[default]
    Suspended,
    Running,
}

/// Gate shared between the context handle and the output callback.
pub type SharedGate = Arc<RwLock<ContextState>>;

/// An active audio output owned by the scheduler worker.
///
/// Dropping a sink stops output. Implementations are not required to be
/// `Send`; they live and die on the worker thread.
pub trait OutputSink {
    /// Native sample rate of the output device.
    fn sample_rate(&self) -> u32;

    /// Native channel count of the output device.
    fn channels(&self) -> u16;

    /// Human-readable device name for logs.
    fn name(&self) -> &str;
}

/// Builds a sink on the worker thread.
pub type SinkFactory =
    Box<dyn FnOnce(SharedRingBuffer, SharedGate) -> Result<Box<dyn OutputSink>> + Send>;

/// The default factory: a cpal stream on the default output device.
pub fn default_sink_factory() -> SinkFactory {
    Box::new(|ring, gate| Ok(Box::new(CpalSink::new(ring, gate)?) as Box<dyn OutputSink>))
}

/// cpal-backed output sink.
pub struct CpalSink {
    _stream: Stream,
    sample_rate: u32,
    channels: u16,
    device_name: String,
}

impl CpalSink {
    /// Open the default output device and start its stream.
    pub fn new(ring: SharedRingBuffer, gate: SharedGate) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::AudioOutput("no output device found".into()))?;

        let device_name = device.name().unwrap_or_else(|_| "unknown".into());
        info!("Using audio output device: {device_name}");

        Self::with_device(device, ring, gate)
    }

    /// Open a specific output device.
    pub fn with_device(device: Device, ring: SharedRingBuffer, gate: SharedGate) -> Result<Self> {
        let device_name = device.name().unwrap_or_else(|_| "unknown".into());

        let supported = device
            .default_output_config()
            .map_err(|e| Error::AudioOutput(format!("failed to get output config: {e}")))?;

        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();

        debug!(
            "Output config: {} Hz, {} channels, format {:?}",
            config.sample_rate.0, config.channels, sample_format
        );

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(&device, &config, ring, gate)?,
            SampleFormat::I16 => Self::build_stream::<i16>(&device, &config, ring, gate)?,
            SampleFormat::U16 => Self::build_stream::<u16>(&device, &config, ring, gate)?,
            other => {
                return Err(Error::AudioOutput(format!(
                    "unsupported sample format: {other:?}"
                )));
            }
        };

        stream
            .play()
            .map_err(|e| Error::AudioOutput(format!("failed to start stream: {e}")))?;

        Ok(Self {
            _stream: stream,
            sample_rate: config.sample_rate.0,
            channels: config.channels,
            device_name,
        })
    }

    fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
        device: &Device,
        config: &StreamConfig,
        ring: SharedRingBuffer,
        gate: SharedGate,
    ) -> Result<Stream> {
        let err_fn = |err| {
            error!("Audio stream error: {err}");
        };

        let mut scratch = vec![0.0f32; 4096];

        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    // A suspended context must neither sound nor consume.
                    if *gate.read() != ContextState::Running {
                        for sample in data.iter_mut() {
                            *sample = T::from_sample(0.0f32);
                        }
                        return;
                    }

                    if scratch.len() < data.len() {
                        scratch.resize(data.len(), 0.0);
                    }

                    let read = ring.read(&mut scratch[..data.len()]);
                    for (i, sample) in data.iter_mut().enumerate() {
                        let value = if i < read { scratch[i] } else { 0.0 };
                        *sample = T::from_sample(value);
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| Error::AudioOutput(format!("failed to build stream: {e}")))?;

        Ok(stream)
    }
}

impl OutputSink for CpalSink {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn name(&self) -> &str {
        &self.device_name
    }
}

/// List available output device names.
pub fn list_output_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();

    let devices: Vec<String> = host
        .output_devices()
        .map_err(|e| Error::AudioOutput(format!("failed to list devices: {e}")))?
        .filter_map(|d| d.name().ok())
        .collect();

    Ok(devices)
}

/// A sink that consumes samples on a background thread without audio
/// hardware. Used by tests and headless environments.
pub struct SimulatedSink {
    stop: Arc<AtomicBool>,
    drain: Option<JoinHandle<()>>,
    sample_rate: u32,
    channels: u16,
}

impl SimulatedSink {
    /// Start a simulated device with the given native format.
    ///
    /// Samples are consumed much faster than real time.
    pub fn start(ring: SharedRingBuffer, gate: SharedGate, sample_rate: u32, channels: u16) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();

        let drain = std::thread::spawn(move || {
            let mut scratch = [0.0f32; 512];
            while !stop_flag.load(Ordering::Relaxed) {
                if *gate.read() == ContextState::Running {
                    ring.read(&mut scratch);
                }
                std::thread::sleep(Duration::from_micros(200));
            }
        });

        Self {
            stop,
            drain: Some(drain),
            sample_rate,
            channels,
        }
    }

    /// A factory producing this sink, for [`crate::AudioContext`] injection.
    pub fn factory(sample_rate: u32, channels: u16) -> SinkFactory {
        Box::new(move |ring, gate| {
            Ok(Box::new(Self::start(ring, gate, sample_rate, channels)) as Box<dyn OutputSink>)
        })
    }
}

impl OutputSink for SimulatedSink {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

impl Drop for SimulatedSink {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.drain.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::shared_ring_buffer;

    #[test]
    fn test_simulated_sink_respects_gate() {
        let ring = shared_ring_buffer(1024);
        let gate: SharedGate = Arc::new(RwLock::new(ContextState::Suspended));
        let sink = SimulatedSink::start(ring.clone(), gate.clone(), 24000, 1);

        ring.write(&[0.5; 256]);
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(ring.available(), 256);

        *gate.write() = ContextState::Running;
        std::thread::sleep(Duration::from_millis(50));
        assert!(ring.is_empty());

        drop(sink);
    }

    #[test]
    fn test_list_devices_does_not_panic() {
        // May legitimately fail on machines without audio hardware.
        let _ = list_output_devices();
    }
}
