//! Receive ring buffer
//!
//! Fixed-capacity circular byte queue shared between the receive interrupt
//! handler (producer) and the session controller (consumer).
//!
//! `tail` is the next write slot and `head` the next read slot. The buffer
//! is empty when `head == tail` and full when one more write would make them
//! equal, so a buffer of `N` slots holds at most `N - 1` bytes. A write into
//! a full buffer is rejected and latches the overflow flag; stored bytes are
//! never overwritten.

use core::cell::RefCell;
use core::fmt;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Push rejected because the buffer was full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Overflow;

impl fmt::Display for Overflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("receive buffer overflow")
    }
}

struct Ring<const N: usize> {
    storage: [u8; N],
    head: usize,
    tail: usize,
    overflow: bool,
}

impl<const N: usize> Ring<N> {
    const MASK: usize = N - 1;

    fn len(&self) -> usize {
        self.tail.wrapping_sub(self.head) & Self::MASK
    }
}

/// Circular byte queue of `N` slots (`N` a power of two, at least 2)
///
/// Every operation takes `&self`; index updates run inside a short
/// critical section, so the producer may be an interrupt handler that
/// preempts the consumer at any point.
pub struct RingBuffer<const N: usize> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Ring<N>>>,
}

impl<const N: usize> RingBuffer<N> {
    const VALID_SIZE: () = assert!(
        N >= 2 && N.is_power_of_two(),
        "ring buffer size must be a power of two"
    );

    /// Create an empty buffer
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_SIZE;
        Self {
            inner: Mutex::new(RefCell::new(Ring {
                storage: [0; N],
                head: 0,
                tail: 0,
                overflow: false,
            })),
        }
    }

    /// Append a byte
    ///
    /// Never blocks. When full, the byte is dropped, the overflow flag is
    /// set and `Overflow` is returned.
    pub fn push(&self, byte: u8) -> Result<(), Overflow> {
        self.inner.lock(|ring| {
            let mut ring = ring.borrow_mut();
            let next = (ring.tail + 1) & Ring::<N>::MASK;
            if next == ring.head {
                ring.overflow = true;
                return Err(Overflow);
            }
            let tail = ring.tail;
            ring.storage[tail] = byte;
            ring.tail = next;
            Ok(())
        })
    }

    /// Remove and return the oldest byte
    pub fn pop(&self) -> Option<u8> {
        self.inner.lock(|ring| {
            let mut ring = ring.borrow_mut();
            if ring.head == ring.tail {
                return None;
            }
            let byte = ring.storage[ring.head];
            ring.head = (ring.head + 1) & Ring::<N>::MASK;
            Some(byte)
        })
    }

    /// Number of bytes waiting
    pub fn len(&self) -> usize {
        self.inner.lock(|ring| ring.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Usable capacity, one less than the slot count
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Returns true if a push has been rejected since the last clear
    pub fn overflowed(&self) -> bool {
        self.inner.lock(|ring| ring.borrow().overflow)
    }

    /// Discard all bytes and reset the overflow flag
    pub fn clear(&self) {
        self.inner.lock(|ring| {
            let mut ring = ring.borrow_mut();
            ring.head = 0;
            ring.tail = 0;
            ring.overflow = false;
        });
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for RingBuffer<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (len, overflow) = self.inner.lock(|ring| {
            let ring = ring.borrow();
            (ring.len(), ring.overflow)
        });
        f.debug_struct("RingBuffer")
            .field("slots", &N)
            .field("len", &len)
            .field("overflow", &overflow)
            .finish()
    }
}
