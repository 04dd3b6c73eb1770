//! Lock-free ring buffer for audio samples.
//!
//! Single producer, single consumer: the playback scheduler writes samples,
//! the output callback reads them. No allocation or locking on either path.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

/// Lock-free single-producer, single-consumer ring buffer of f32 samples.
///
/// Samples are stored as their bit patterns in `AtomicU32` slots; the read
/// and write positions use acquire/release ordering so a consumer never
/// observes a position before the samples behind it are visible.
pub struct RingBuffer {
    /// Sample storage, each slot holding `f32::to_bits`.
    buffer: Box<[AtomicU32]>,
    /// Monotonically increasing read position.
    read_pos: AtomicUsize,
    /// Monotonically increasing write position.
    write_pos: AtomicUsize,
    /// Capacity, always a power of two.
    capacity: usize,
    /// `capacity - 1`, for cheap index wrapping.
    mask: usize,
}

impl RingBuffer {
    /// Create a ring buffer holding at least `capacity` samples.
    ///
    /// The capacity is rounded up to the next power of two.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2).next_power_of_two();
        let buffer: Box<[AtomicU32]> = (0..capacity).map(|_| AtomicU32::new(0)).collect();

        Self {
            buffer,
            read_pos: AtomicUsize::new(0),
            write_pos: AtomicUsize::new(0),
            capacity,
            mask: capacity - 1,
        }
    }

    /// Get the buffer capacity.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of samples available for reading.
    pub fn available(&self) -> usize {
        let write = self.write_pos.load(Ordering::Acquire);
        let read = self.read_pos.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }

    /// Number of free slots for writing.
    pub fn free(&self) -> usize {
        self.capacity - self.available()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }

    /// Check if the buffer is full.
    pub fn is_full(&self) -> bool {
        self.free() == 0
    }

    /// Write samples from the producer thread.
    ///
    /// Returns how many samples were accepted; the rest did not fit.
    pub fn write(&self, samples: &[f32]) -> usize {
        let write = self.write_pos.load(Ordering::Relaxed);
        let read = self.read_pos.load(Ordering::Acquire);

        let space = self.capacity - write.wrapping_sub(read);
        let to_write = samples.len().min(space);

        for (i, sample) in samples[..to_write].iter().enumerate() {
            self.buffer[write.wrapping_add(i) & self.mask]
                .store(sample.to_bits(), Ordering::Relaxed);
        }

        self.write_pos
            .store(write.wrapping_add(to_write), Ordering::Release);

        to_write
    }

    /// Read samples from the consumer thread.
    ///
    /// Returns how many samples were copied into `output`.
    pub fn read(&self, output: &mut [f32]) -> usize {
        let read = self.read_pos.load(Ordering::Relaxed);
        let write = self.write_pos.load(Ordering::Acquire);

        let available = write.wrapping_sub(read);
        let to_read = output.len().min(available);

        for (i, slot) in output[..to_read].iter_mut().enumerate() {
            *slot = f32::from_bits(
                self.buffer[read.wrapping_add(i) & self.mask].load(Ordering::Relaxed),
            );
        }

        self.read_pos
            .store(read.wrapping_add(to_read), Ordering::Release);

        to_read
    }

    /// Discard everything currently buffered.
    ///
    /// Producer-side operation; used when a playback is cancelled.
    pub fn clear(&self) {
        let write = self.write_pos.load(Ordering::Relaxed);
        self.read_pos.store(write, Ordering::Release);
    }
}

/// Thread-safe reference to a ring buffer.
pub type SharedRingBuffer = Arc<RingBuffer>;

/// Create a new shared ring buffer.
pub fn shared_ring_buffer(capacity: usize) -> SharedRingBuffer {
    Arc::new(RingBuffer::new(capacity))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_write_then_read() {
        let buffer = RingBuffer::new(64);

        let samples = [0.25f32, -0.25, 0.5, -0.5];
        assert_eq!(buffer.write(&samples), 4);
        assert_eq!(buffer.available(), 4);

        let mut output = [0.0f32; 4];
        assert_eq!(buffer.read(&mut output), 4);
        assert_eq!(output, samples);
        assert!(buffer.is_empty());
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_wraparound() {
        let buffer = RingBuffer::new(8);

        assert_eq!(buffer.write(&[1.0; 6]), 6);

        let mut output = [0.0f32; 4];
        assert_eq!(buffer.read(&mut output), 4);

        // This write crosses the end of the storage.
        assert_eq!(buffer.write(&[2.0; 5]), 5);

        let mut tail = [0.0f32; 7];
        assert_eq!(buffer.read(&mut tail), 7);
        assert_eq!(&tail[..2], &[1.0, 1.0]);
        assert_eq!(&tail[2..], &[2.0; 5]);
    }

    #[test]
    fn test_rejects_overflow() {
        let buffer = RingBuffer::new(4);

        assert_eq!(buffer.write(&[0.1; 4]), 4);
        assert!(buffer.is_full());
        assert_eq!(buffer.write(&[0.2]), 0);

        let mut one = [0.0f32; 1];
        buffer.read(&mut one);
        assert_eq!(buffer.write(&[0.2]), 1);
    }

    #[test]
    fn test_clear() {
        let buffer = RingBuffer::new(16);

        buffer.write(&[0.5; 10]);
        buffer.clear();

        assert!(buffer.is_empty());
        let mut output = [1.0f32; 4];
        assert_eq!(buffer.read(&mut output), 0);
    }

    #[test]
    fn test_concurrent_producer_consumer() {
        use std::thread;

        let buffer = shared_ring_buffer(256);
        let producer = buffer.clone();
        let consumer = buffer;

        const TOTAL: usize = 20_000;

        let writer = thread::spawn(move || {
            let chunk = [0.75f32; 50];
            let mut written = 0;
            while written < TOTAL {
                let n = producer.write(&chunk[..(TOTAL - written).min(50)]);
                written += n;
                if n == 0 {
                    thread::yield_now();
                }
            }
        });

        let reader = thread::spawn(move || {
            let mut out = [0.0f32; 50];
            let mut read = 0;
            while read < TOTAL {
                let n = consumer.read(&mut out);
                assert!(out[..n].iter().all(|&s| (s - 0.75).abs() < f32::EPSILON));
                read += n;
                if n == 0 {
                    thread::yield_now();
                }
            }
        });

        writer.join().unwrap();
        reader.join().unwrap();
    }
}
