//! Playback scheduling.
//!
//! The scheduler worker owns the output sink and the ring buffer. Playbacks
//! are queued in arrival order and streamed through the ring one at a time,
//! so successive calls play back-to-back without overlap. Each playback
//! carries a oneshot that resolves exactly once, when the sink has consumed
//! its last sample or when it is cancelled.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use littlestar_core::{Error, Result};
use tokio::sync::oneshot;
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

use crate::buffer::SharedRingBuffer;
use crate::frame::AudioFrame;
use crate::resample::adapt_to_device;
use crate::sink::{ContextState, OutputSink, SharedGate, SinkFactory};

/// Lifecycle of one playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PlaybackState {
    /// Queued behind other playbacks or a suspended context.
    Scheduled = 0,
    /// Samples are flowing to the sink.
    Playing = 1,
    /// The last sample was consumed.
    Finished = 2,
    /// Cancelled before completion.
    Cancelled = 3,
}

impl From<u8> for PlaybackState {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Playing,
            2 => Self::Finished,
            3 => Self::Cancelled,
            _ => Self::Scheduled,
        }
    }
}

/// How a playback future resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Finished,
    Cancelled,
}

/// Commands accepted by the scheduler worker.
pub(crate) enum Command {
    Play(Playback),
    Cancel(Uuid),
    Shutdown,
}

/// One queued playback, owned by the worker.
pub(crate) struct Playback {
    id: Uuid,
    frame: AudioFrame,
    state: Arc<AtomicU8>,
    done: oneshot::Sender<PlaybackOutcome>,
}

impl Playback {
    fn resolve(self, outcome: PlaybackOutcome) {
        let state = match outcome {
            PlaybackOutcome::Finished => PlaybackState::Finished,
            PlaybackOutcome::Cancelled => PlaybackState::Cancelled,
        };
        self.state.store(state as u8, Ordering::Release);
        // The caller may have dropped the handle without waiting.
        let _ = self.done.send(outcome);
    }
}

/// Handle for one in-flight playback.
///
/// Dropping the handle does not stop the audio; call [`cancel`] for that.
///
/// [`cancel`]: PlaybackHandle::cancel
pub struct PlaybackHandle {
    id: Uuid,
    state: Arc<AtomicU8>,
    done: oneshot::Receiver<PlaybackOutcome>,
    commands: Sender<Command>,
}

impl PlaybackHandle {
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PlaybackState {
        self.state.load(Ordering::Acquire).into()
    }

    /// Stop this playback immediately and resolve its future with
    /// [`PlaybackOutcome::Cancelled`]. Idempotent; cancelling a playback
    /// that already finished has no effect.
    pub fn cancel(&self) {
        if self.commands.send(Command::Cancel(self.id)).is_err() {
            trace!("cancel after scheduler shutdown for playback {}", self.id);
        }
    }

    /// Suspend until the playback naturally ends or is cancelled.
    ///
    /// Resolves exactly once. If the scheduler goes away mid-flight the
    /// outcome is `Cancelled` rather than hanging the caller.
    pub async fn wait(self) -> PlaybackOutcome {
        self.done.await.unwrap_or(PlaybackOutcome::Cancelled)
    }
}

/// Create the pieces of a playback: the queued half and the caller's handle.
pub(crate) fn playback_pair(frame: AudioFrame, commands: Sender<Command>) -> (Playback, PlaybackHandle) {
    let id = Uuid::new_v4();
    let state = Arc::new(AtomicU8::new(PlaybackState::Scheduled as u8));
    let (done_tx, done_rx) = oneshot::channel();

    let playback = Playback {
        id,
        frame,
        state: state.clone(),
        done: done_tx,
    };
    let handle = PlaybackHandle {
        id,
        state,
        done: done_rx,
        commands,
    };

    (playback, handle)
}

/// How long the worker sleeps while idle or waiting for ring space.
const IDLE_POLL: Duration = Duration::from_millis(10);
const WRITE_POLL: Duration = Duration::from_micros(500);

/// The scheduler worker. Runs on its own thread because the cpal stream it
/// owns is not `Send`.
pub(crate) struct Worker {
    commands: Receiver<Command>,
    ring: SharedRingBuffer,
    gate: SharedGate,
    sink: Box<dyn OutputSink>,
    queue: VecDeque<Playback>,
}

impl Worker {
    /// Build the sink and return a running worker, or the factory error.
    pub(crate) fn start(
        commands: Receiver<Command>,
        ring: SharedRingBuffer,
        gate: SharedGate,
        factory: SinkFactory,
    ) -> Result<Self> {
        let sink = factory(ring.clone(), gate.clone())?;
        info!(
            "Playback scheduler started: {} Hz, {} channels, device: {}",
            sink.sample_rate(),
            sink.channels(),
            sink.name()
        );

        Ok(Self {
            commands,
            ring,
            gate,
            sink,
            queue: VecDeque::new(),
        })
    }

    pub(crate) fn device_rate(&self) -> u32 {
        self.sink.sample_rate()
    }

    pub(crate) fn device_channels(&self) -> u16 {
        self.sink.channels()
    }

    pub(crate) fn run(mut self) {
        loop {
            match self.commands.recv_timeout(IDLE_POLL) {
                Ok(Command::Play(playback)) => self.queue.push_back(playback),
                Ok(Command::Cancel(id)) => self.cancel_queued(id),
                Ok(Command::Shutdown) | Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                    break;
                }
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            }

            // A suspended context defers everything it has been given.
            while !self.queue.is_empty() && *self.gate.read() == ContextState::Running {
                if let Some(playback) = self.queue.pop_front() {
                    if !self.play_one(playback) {
                        self.drain(PlaybackOutcome::Cancelled);
                        return;
                    }
                }
            }
        }

        debug!("Playback scheduler shutting down");
        self.drain(PlaybackOutcome::Cancelled);
    }

    /// Stream one playback through the ring. Returns false on shutdown.
    fn play_one(&mut self, playback: Playback) -> bool {
        let samples = match adapt_to_device(
            &playback.frame,
            self.sink.sample_rate(),
            self.sink.channels(),
        ) {
            Ok(samples) => samples,
            Err(e) => {
                error!("Failed to adapt frame for playback {}: {e}", playback.id);
                playback.resolve(PlaybackOutcome::Cancelled);
                return true;
            }
        };

        debug!(
            "Playing {} ({} samples, {:?})",
            playback.id,
            samples.len(),
            playback.frame.duration()
        );
        playback
            .state
            .store(PlaybackState::Playing as u8, Ordering::Release);

        let mut offset = 0;
        loop {
            // Stay responsive to cancel/shutdown between chunk writes.
            match self.commands.try_recv() {
                Ok(Command::Play(next)) => self.queue.push_back(next),
                Ok(Command::Cancel(id)) if id == playback.id => {
                    self.ring.clear();
                    playback.resolve(PlaybackOutcome::Cancelled);
                    trace!("Playback {id} cancelled");
                    return true;
                }
                Ok(Command::Cancel(id)) => self.cancel_queued(id),
                Ok(Command::Shutdown) => {
                    self.ring.clear();
                    playback.resolve(PlaybackOutcome::Cancelled);
                    return false;
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    self.ring.clear();
                    playback.resolve(PlaybackOutcome::Cancelled);
                    return false;
                }
            }

            if offset < samples.len() {
                let written = self.ring.write(&samples[offset..]);
                offset += written;
                if written == 0 {
                    std::thread::sleep(WRITE_POLL);
                }
            } else if self.ring.is_empty() {
                // The sink consumed the final sample.
                playback.resolve(PlaybackOutcome::Finished);
                return true;
            } else {
                std::thread::sleep(WRITE_POLL);
            }
        }
    }

    fn cancel_queued(&mut self, id: Uuid) {
        if let Some(index) = self.queue.iter().position(|p| p.id == id) {
            if let Some(playback) = self.queue.remove(index) {
                playback.resolve(PlaybackOutcome::Cancelled);
            }
        } else {
            trace!("cancel for unknown or completed playback {id}");
        }
    }

    fn drain(&mut self, outcome: PlaybackOutcome) {
        if !self.queue.is_empty() {
            warn!("Dropping {} queued playbacks", self.queue.len());
        }
        for playback in self.queue.drain(..) {
            playback.resolve(outcome);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::context::AudioContext;
    use crate::sink::SimulatedSink;

    fn test_context() -> AudioContext {
        AudioContext::with_sink(SimulatedSink::factory(24000, 1)).unwrap()
    }

    fn silence(seconds: f64) -> AudioFrame {
        let count = (24000.0 * seconds) as usize;
        AudioFrame::from_interleaved(24000, 1, &vec![0.0f32; count])
    }

    #[tokio::test]
    async fn test_playback_finishes() {
        let context = test_context();
        context.resume();

        let handle = context.play(silence(0.05)).unwrap();
        assert_eq!(handle.wait().await, PlaybackOutcome::Finished);
    }

    #[tokio::test]
    async fn test_cancel_resolves_cancelled() {
        let context = test_context();
        context.resume();

        // Long enough that the sink cannot finish before we cancel.
        let handle = context.play(silence(30.0)).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();

        assert_eq!(handle.wait().await, PlaybackOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_queued_playback() {
        let context = test_context();
        context.resume();

        let first = context.play(silence(30.0)).unwrap();
        let second = context.play(silence(1.0)).unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(second.state(), PlaybackState::Scheduled);

        second.cancel();
        assert_eq!(second.wait().await, PlaybackOutcome::Cancelled);

        first.cancel();
        assert_eq!(first.wait().await, PlaybackOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_suspended_context_defers() {
        let context = test_context();

        let handle = context.play(silence(0.05)).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(handle.state(), PlaybackState::Scheduled);

        context.resume();
        assert_eq!(handle.wait().await, PlaybackOutcome::Finished);
    }

    #[tokio::test]
    async fn test_sequential_playbacks_both_finish() {
        let context = test_context();
        context.resume();

        let first = context.play(silence(0.02)).unwrap();
        let second = context.play(silence(0.02)).unwrap();

        assert_eq!(first.wait().await, PlaybackOutcome::Finished);
        assert_eq!(second.wait().await, PlaybackOutcome::Finished);
    }

    #[tokio::test]
    async fn test_dropped_context_cancels() {
        let context = test_context();
        context.resume();

        let handle = context.play(silence(30.0)).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(context);

        assert_eq!(handle.wait().await, PlaybackOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_empty_frame_finishes_immediately() {
        let context = test_context();
        context.resume();

        let handle = context.play(silence(0.0)).unwrap();
        assert_eq!(handle.wait().await, PlaybackOutcome::Finished);
    }
}
