//! Fixed-capacity byte FIFO shared between foreground and interrupt code
//!
//! One producer and one consumer per buffer: the producer only ever stores
//! `head`, the consumer only ever stores `tail`, and each side only loads the
//! other's cursor. Slots are atomics, so the buffer is `Sync` and needs no
//! `unsafe`. One slot is always left empty so that `head == tail` means
//! empty and "next head == tail" means full.
//!
//! Callers with more than one producer (or consumer) context must serialize
//! those contexts themselves, typically with a critical section.

use portable_atomic::{AtomicU8, AtomicUsize, Ordering};

/// Circular byte buffer with `N` slots (`N - 1` usable)
pub struct RingBuffer<const N: usize> {
    slots: [AtomicU8; N],
    head: AtomicUsize,
    tail: AtomicUsize,
}

impl<const N: usize> RingBuffer<N> {
    const CAPACITY_OK: () = assert!(
        N.is_power_of_two() && N >= 2 && N <= 32768,
        "ring buffer capacity must be a power of two between 2 and 32768"
    );

    const MASK: usize = N - 1;

    /// Create an empty buffer
    pub const fn new() -> Self {
        let () = Self::CAPACITY_OK;
        Self {
            slots: [const { AtomicU8::new(0) }; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Number of slots, including the one kept free
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Append a byte (producer side)
    ///
    /// Returns `false` and leaves the buffer untouched when it is full.
    pub fn try_push(&self, byte: u8) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let next = (head + 1) & Self::MASK;
        if next == self.tail.load(Ordering::Acquire) {
            return false;
        }
        self.slots[head].store(byte, Ordering::Relaxed);
        self.head.store(next, Ordering::Release);
        true
    }

    /// Remove the oldest byte (consumer side)
    pub fn try_pop(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }
        let byte = self.slots[tail].load(Ordering::Relaxed);
        self.tail.store((tail + 1) & Self::MASK, Ordering::Release);
        Some(byte)
    }

    /// Look at the oldest byte without removing it (consumer side)
    pub fn peek(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }
        Some(self.slots[tail].load(Ordering::Relaxed))
    }

    /// Number of bytes waiting to be popped
    pub fn available(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (N + head - tail) & Self::MASK
    }

    /// Number of bytes that can be pushed before the buffer is full
    pub fn available_for_write(&self) -> usize {
        N - 1 - self.available()
    }

    /// True when nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// True when the next push would be refused
    pub fn is_full(&self) -> bool {
        self.available() == N - 1
    }

    /// Drop every unread byte (consumer side)
    ///
    /// Moves `tail` up to `head`; bytes pushed concurrently after the load of
    /// `head` survive.
    pub fn discard_unread(&self) {
        let head = self.head.load(Ordering::Acquire);
        self.tail.store(head, Ordering::Release);
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::fmt::Debug for RingBuffer<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &N)
            .field("available", &self.available())
            .finish()
    }
}
