//! Fixed-capacity circular byte store for interrupt-to-application handoff.
//!
//! The receive interrupt path appends payload bytes at the head cursor while
//! the application (and the acknowledgment-wait loop) consumes from the tail
//! cursor. Both cursors wrap modulo the capacity. The buffer never allocates
//! and never blocks; an empty buffer is reported distinctly from any valid
//! byte value since all 256 values are legal payload.
//!
//! A completely full buffer is indistinguishable from an empty one, so only
//! `capacity - 1` bytes are usable at a time. The frame-reassembly path
//! checks [`is_full`](RingBuffer::is_full) before each write and silently
//! drops whatever does not fit (drop-newest).

use crate::consts::RF_BUFFER_SIZE;

/// Circular byte buffer holding payload bytes received off the air.
///
/// The head cursor is owned by the receive path; the tail cursor is advanced
/// by the consumer read path and by the acknowledgment-consumption step of a
/// reliable send. Cursor arithmetic is modulo [`RF_BUFFER_SIZE`].
#[derive(Debug)]
pub struct RingBuffer {
    storage: [u8; RF_BUFFER_SIZE],
    head: usize,
    tail: usize,
}

impl RingBuffer {
    /// Creates a zeroed buffer with both cursors at 0.
    pub const fn new() -> Self {
        Self {
            storage: [0; RF_BUFFER_SIZE],
            head: 0,
            tail: 0,
        }
    }

    /// Stores `byte` at the head cursor and advances the head.
    ///
    /// There is no backpressure signal: writing into a full buffer silently
    /// overwrites unread data. Callers on the receive path are expected to
    /// check [`is_full`](RingBuffer::is_full) first.
    pub fn write(&mut self, byte: u8) {
        self.storage[self.head] = byte;
        self.head = (self.head + 1) % RF_BUFFER_SIZE;
    }

    /// Reads the oldest unread byte and advances the tail.
    ///
    /// Returns `None` when the buffer is empty; never blocks.
    pub fn read(&mut self) -> Option<u8> {
        if self.head == self.tail {
            return None;
        }
        let byte = self.storage[self.tail];
        self.tail = (self.tail + 1) % RF_BUFFER_SIZE;
        Some(byte)
    }

    /// Reads the oldest unread byte without advancing the tail.
    ///
    /// The acknowledgment-wait loop uses this to inspect the next unread byte
    /// repeatedly without consuming it prematurely. Returns `None` when the
    /// buffer is empty, so an empty buffer never reports an ACK.
    pub fn peek(&self) -> Option<u8> {
        if self.head == self.tail {
            return None;
        }
        Some(self.storage[self.tail])
    }

    /// Number of unread bytes.
    pub fn available(&self) -> usize {
        (RF_BUFFER_SIZE + self.head - self.tail) % RF_BUFFER_SIZE
    }

    /// Whether another write would collide with the tail cursor.
    ///
    /// The receive path stops appending when this reports `true`, keeping a
    /// full buffer distinguishable from an empty one.
    pub fn is_full(&self) -> bool {
        (self.head + 1) % RF_BUFFER_SIZE == self.tail
    }

    /// Resets both cursors to 0 without clearing the contents.
    ///
    /// Used at driver power-down; previously written bytes simply become
    /// invisible.
    pub fn reset(&mut self) {
        self.head = 0;
        self.tail = 0;
    }

    /// Zeroes the storage and resets both cursors.
    ///
    /// Used at driver initialization.
    pub fn clear(&mut self) {
        self.storage = [0; RF_BUFFER_SIZE];
        self.reset();
    }
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_on_empty_returns_none() {
        let mut buf = RingBuffer::new();
        assert_eq!(buf.read(), None);
        assert_eq!(buf.read(), None);
        buf.write(0x42);
        assert_eq!(buf.read(), Some(0x42));
        assert_eq!(buf.read(), None);
    }

    #[test]
    fn test_available_tracks_writes_and_reads() {
        let mut buf = RingBuffer::new();
        let n = 17;
        let m = 9;
        for i in 0..n {
            buf.write(i as u8);
        }
        assert_eq!(buf.available(), n);
        for _ in 0..m {
            assert!(buf.read().is_some());
        }
        assert_eq!(buf.available(), n - m);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut buf = RingBuffer::new();
        assert_eq!(buf.peek(), None);
        buf.write(0x10);
        buf.write(0x20);
        assert_eq!(buf.peek(), Some(0x10));
        assert_eq!(buf.peek(), Some(0x10));
        assert_eq!(buf.available(), 2);
        assert_eq!(buf.read(), Some(0x10));
        assert_eq!(buf.peek(), Some(0x20));
    }

    #[test]
    fn test_cursors_wrap_around() {
        let mut buf = RingBuffer::new();
        // Walk both cursors past the wrap point a few times.
        for round in 0..3 {
            for i in 0..(RF_BUFFER_SIZE - 1) {
                buf.write((round + i) as u8);
                assert_eq!(buf.read(), Some((round + i) as u8));
            }
        }
        assert_eq!(buf.available(), 0);
    }

    #[test]
    fn test_full_buffer_detection() {
        let mut buf = RingBuffer::new();
        for i in 0..(RF_BUFFER_SIZE - 1) {
            assert!(!buf.is_full());
            buf.write(i as u8);
        }
        assert!(buf.is_full());
        assert_eq!(buf.available(), RF_BUFFER_SIZE - 1);
        assert_eq!(buf.read(), Some(0));
        assert!(!buf.is_full());
    }

    #[test]
    fn test_reset_hides_unread_data() {
        let mut buf = RingBuffer::new();
        buf.write(1);
        buf.write(2);
        buf.reset();
        assert_eq!(buf.available(), 0);
        assert_eq!(buf.read(), None);
    }
}
