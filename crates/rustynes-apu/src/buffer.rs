//! Fixed-capacity ring buffer carrying mixed audio samples from the APU's
//! producer side (the emulation tick loop) to a consumer on another thread
//! (the host's audio callback).
//!
//! The read/write/full bookkeeping mirrors a classic single-producer,
//! single-consumer circular buffer: `read == write` is ambiguous between
//! empty and full on its own, so a `full` flag disambiguates it. All
//! operations take the buffer's own mutex, so the producer and consumer
//! never need to coordinate through anything but this type.

use std::sync::Mutex;

struct Ring {
    data: Vec<i16>,
    read: usize,
    write: usize,
    full: bool,
}

impl Ring {
    fn new(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            read: 0,
            write: 0,
            full: false,
        }
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn is_empty(&self) -> bool {
        !self.full && self.read == self.write
    }

    fn distance(&self, from: usize, to: usize) -> usize {
        if from <= to {
            to - from
        } else {
            (self.capacity() - from) + to
        }
    }

    fn readable(&self) -> usize {
        self.distance(self.read, self.write)
    }

    fn writable(&self) -> usize {
        if self.full {
            0
        } else {
            let gap = self.distance(self.write, self.read);
            if gap == 0 {
                self.capacity()
            } else {
                gap
            }
        }
    }

    fn copy_in(&mut self, samples: &[i16]) {
        let cap = self.capacity();
        let mut remaining = samples;
        if self.write + remaining.len() >= cap {
            let head = cap - self.write;
            self.data[self.write..cap].copy_from_slice(&remaining[..head]);
            remaining = &remaining[head..];
            self.write = 0;
        }
        let len = remaining.len();
        self.data[self.write..self.write + len].copy_from_slice(remaining);
        self.write += len;
        self.full = self.write == self.read;
    }

    fn copy_out(&mut self, out: &mut [i16]) {
        let cap = self.capacity();
        let mut remaining = out;
        if self.read + remaining.len() >= cap {
            let head = cap - self.read;
            remaining[..head].copy_from_slice(&self.data[self.read..cap]);
            remaining = &mut remaining[head..];
            self.read = 0;
        }
        let len = remaining.len();
        remaining.copy_from_slice(&self.data[self.read..self.read + len]);
        self.read += len;
        self.full = false;
    }
}

/// A fixed-capacity, mutex-guarded ring buffer of signed 16-bit PCM samples.
///
/// The producer (the emulation's tick loop) calls [`RingBuffer::write`]; the
/// consumer (the host's audio callback, usually on a separate thread) calls
/// [`RingBuffer::read`]. Both block only for the duration of the internal
/// mutex, never for the whole transfer.
pub struct RingBuffer {
    inner: Mutex<Ring>,
}

impl RingBuffer {
    /// Create a buffer holding up to `capacity` samples.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Ring::new(capacity)),
        }
    }

    /// Copy as many samples from `data` into the buffer as fit, returning
    /// how many were actually written.
    pub fn write(&self, data: &[i16]) -> usize {
        let mut ring = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if ring.full {
            return 0;
        }
        let count = ring.writable().min(data.len());
        if count > 0 {
            ring.copy_in(&data[..count]);
        }
        count
    }

    /// Copy as many samples out of the buffer into `data` as are available,
    /// returning how many were actually read. Unfilled entries in `data` are
    /// left untouched.
    pub fn read(&self, data: &mut [i16]) -> usize {
        let mut ring = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if ring.is_empty() {
            return 0;
        }
        let count = ring.readable().min(data.len());
        if count > 0 {
            ring.copy_out(&mut data[..count]);
        }
        count
    }

    /// Number of samples currently available to read.
    #[must_use]
    pub fn readable(&self) -> usize {
        let ring = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        ring.readable()
    }

    /// Number of samples that can be written before the buffer is full.
    #[must_use]
    pub fn writable(&self) -> usize {
        let ring = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        ring.writable()
    }

    /// Clear the buffer back to empty, zeroing its backing storage.
    pub fn reset(&self) {
        let mut ring = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        ring.data.fill(0);
        ring.read = 0;
        ring.write = 0;
        ring.full = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_reads_nothing() {
        let buf = RingBuffer::new(8);
        let mut out = [0i16; 4];
        assert_eq!(buf.read(&mut out), 0);
        assert_eq!(buf.readable(), 0);
    }

    #[test]
    fn write_then_read_round_trips_samples() {
        let buf = RingBuffer::new(8);
        let written = buf.write(&[1, 2, 3, 4]);
        assert_eq!(written, 4);
        assert_eq!(buf.readable(), 4);

        let mut out = [0i16; 4];
        let read = buf.read(&mut out);
        assert_eq!(read, 4);
        assert_eq!(out, [1, 2, 3, 4]);
        assert_eq!(buf.readable(), 0);
    }

    #[test]
    fn write_wraps_at_capacity() {
        let buf = RingBuffer::new(4);
        buf.write(&[1, 2, 3]);
        let mut out = [0i16; 2];
        buf.read(&mut out); // consume 2, read is now at index 2
        buf.write(&[4, 5]); // wraps: one sample lands at index 3, one at index 0

        let mut drained = [0i16; 3];
        let n = buf.read(&mut drained);
        assert_eq!(n, 3);
        assert_eq!(drained, [3, 4, 5]);
    }

    #[test]
    fn write_beyond_capacity_is_truncated_not_overflowed() {
        let buf = RingBuffer::new(4);
        let written = buf.write(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(written, 4);
        assert_eq!(buf.writable(), 0);
    }

    #[test]
    fn reset_clears_state_and_data() {
        let buf = RingBuffer::new(4);
        buf.write(&[1, 2, 3]);
        buf.reset();
        assert_eq!(buf.readable(), 0);
        assert_eq!(buf.writable(), 4);
    }

    #[test]
    fn read_write_equal_offset_after_full_write_means_full_not_empty() {
        let buf = RingBuffer::new(4);
        buf.write(&[1, 2, 3, 4]);
        assert_eq!(buf.readable(), 4);
        assert_eq!(buf.writable(), 0);
    }
}
