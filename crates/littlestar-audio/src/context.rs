//! The audio context: one per process, explicitly constructed and injected.

use std::sync::Arc;

use crossbeam_channel::{bounded, unbounded, Sender};
use littlestar_core::{Error, Result};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::buffer::shared_ring_buffer;
use crate::frame::AudioFrame;
use crate::scheduler::{playback_pair, Command, PlaybackHandle, Worker};
use crate::sink::{default_sink_factory, ContextState, SharedGate, SinkFactory};

/// Ring capacity in samples, about two seconds at 48 kHz stereo.
const RING_CAPACITY: usize = 48000 * 2 * 2;

/// Handle to the process's audio output.
///
/// Created once by the composition root and passed (cloned) to anything that
/// plays audio. The context starts **suspended**: nothing sounds and queued
/// playbacks wait until [`resume`] is called after a user interaction,
/// mirroring hosts that gate audio on a user gesture. `resume` is
/// idempotent.
///
/// Dropping the last clone shuts the scheduler down and resolves any
/// outstanding playback futures as cancelled.
///
/// [`resume`]: AudioContext::resume
#[derive(Clone)]
pub struct AudioContext {
    inner: Arc<Inner>,
}

struct Inner {
    commands: Sender<Command>,
    gate: SharedGate,
    device_rate: u32,
    device_channels: u16,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
    }
}

impl AudioContext {
    /// Create a context playing through the default output device.
    pub fn new() -> Result<Self> {
        Self::with_sink(default_sink_factory())
    }

    /// Create a context with a custom sink, e.g. [`crate::sink::SimulatedSink`]
    /// in tests. The factory runs on the scheduler thread because cpal
    /// streams are not `Send`.
    pub fn with_sink(factory: SinkFactory) -> Result<Self> {
        let ring = shared_ring_buffer(RING_CAPACITY);
        let gate: SharedGate = Arc::new(RwLock::new(ContextState::Suspended));

        let (command_tx, command_rx) = unbounded();
        let (init_tx, init_rx) = bounded(1);

        let worker_gate = gate.clone();
        std::thread::Builder::new()
            .name("playback-scheduler".to_string())
            .spawn(move || match Worker::start(command_rx, ring, worker_gate, factory) {
                Ok(worker) => {
                    let _ = init_tx.send(Ok((worker.device_rate(), worker.device_channels())));
                    worker.run();
                }
                Err(e) => {
                    let _ = init_tx.send(Err(e));
                }
            })
            .map_err(|e| Error::AudioOutput(format!("failed to spawn scheduler thread: {e}")))?;

        let (device_rate, device_channels) = init_rx
            .recv()
            .map_err(|_| Error::AudioOutput("scheduler thread died during startup".into()))??;

        Ok(Self {
            inner: Arc::new(Inner {
                commands: command_tx,
                gate,
                device_rate,
                device_channels,
            }),
        })
    }

    /// Allow audio output. No-op if the context is already running.
    pub fn resume(&self) {
        let mut gate = self.inner.gate.write();
        if *gate == ContextState::Suspended {
            info!("Audio context resumed");
            *gate = ContextState::Running;
        } else {
            debug!("resume() on a running context is a no-op");
        }
    }

    /// True until [`resume`](AudioContext::resume) is first called.
    pub fn is_suspended(&self) -> bool {
        *self.inner.gate.read() == ContextState::Suspended
    }

    /// Schedule a frame for playback.
    ///
    /// Playbacks on one context are serialized in arrival order; the handle
    /// resolves when the device has consumed the last sample. While the
    /// context is suspended the playback stays queued.
    pub fn play(&self, frame: AudioFrame) -> Result<PlaybackHandle> {
        let (playback, handle) = playback_pair(frame, self.inner.commands.clone());

        self.inner
            .commands
            .send(Command::Play(playback))
            .map_err(|_| Error::AudioOutput("playback scheduler is not running".into()))?;

        Ok(handle)
    }

    /// Native sample rate of the output device.
    pub fn device_rate(&self) -> u32 {
        self.inner.device_rate
    }

    /// Native channel count of the output device.
    pub fn device_channels(&self) -> u16 {
        self.inner.device_channels
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::sink::SimulatedSink;

    #[test]
    fn test_starts_suspended_and_resume_is_idempotent() {
        let context = AudioContext::with_sink(SimulatedSink::factory(24000, 1)).unwrap();
        assert!(context.is_suspended());

        context.resume();
        assert!(!context.is_suspended());

        // Repeated resume must not change anything.
        context.resume();
        assert!(!context.is_suspended());
    }

    #[test]
    fn test_reports_device_format() {
        let context = AudioContext::with_sink(SimulatedSink::factory(48000, 2)).unwrap();
        assert_eq!(context.device_rate(), 48000);
        assert_eq!(context.device_channels(), 2);
    }

    #[test]
    fn test_failed_sink_factory_surfaces_error() {
        let result = AudioContext::with_sink(Box::new(|_, _| {
            Err(Error::AudioOutput("no device in test".into()))
        }));
        assert!(matches!(result, Err(Error::AudioOutput(_))));
    }
}
