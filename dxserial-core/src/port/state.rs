//! Port state flags and the observable transfer state

use portable_atomic::{AtomicU8, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Transfer state as seen from outside the port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferState {
    /// Not begun, or ended
    Disabled,
    /// Begun, nothing in flight
    Idle,
    /// Bytes buffered or still shifting out
    Transmitting,
}

/// What to do with a received byte that cannot be stored
///
/// Bytes with a parity error and bytes arriving at a full receive buffer are
/// always dropped; the interrupt handler has nobody to report to. The policy
/// only decides whether the loss is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RxErrorPolicy {
    /// Drop the newest byte without a trace
    #[default]
    DropSilently,
    /// Drop the newest byte and bump [`SerialPort::dropped_bytes`](super::SerialPort::dropped_bytes)
    DropAndCount,
}

/// Port bookkeeping shared between foreground and interrupt code
#[derive(Debug)]
pub(crate) struct Flags(AtomicU8);

impl Flags {
    /// `begin()` has completed and `end()` has not been called since
    pub const BEGUN: u8 = 0x01;
    /// A byte was written since `begin()`
    pub const WRITTEN: u8 = 0x02;
    /// Single-wire mode: mute RX while transmitting
    pub const HALF_DUPLEX: u8 = 0x04;
    /// Receiver is enabled; RXCIE may be re-armed
    pub const RX_INTERRUPT: u8 = 0x08;
    /// Transmitter is enabled
    pub const TX_ENABLED: u8 = 0x10;

    pub const fn new() -> Self {
        Self(AtomicU8::new(0))
    }

    pub fn is_set(&self, flag: u8) -> bool {
        self.0.load(Ordering::Acquire) & flag != 0
    }

    pub fn insert(&self, flag: u8) {
        self.0.fetch_or(flag, Ordering::AcqRel);
    }

    pub fn set_all(&self, flags: u8) {
        self.0.store(flags, Ordering::Release);
    }

    pub fn clear_all(&self) {
        self.0.store(0, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let flags = Flags::new();
        assert!(!flags.is_set(Flags::BEGUN));
        flags.set_all(Flags::BEGUN | Flags::HALF_DUPLEX);
        assert!(flags.is_set(Flags::BEGUN));
        assert!(!flags.is_set(Flags::WRITTEN));
        flags.insert(Flags::WRITTEN);
        assert!(flags.is_set(Flags::WRITTEN));
        assert!(flags.is_set(Flags::HALF_DUPLEX));
        flags.clear_all();
        assert!(!flags.is_set(Flags::BEGUN));
        assert!(!flags.is_set(Flags::WRITTEN));
    }

    #[test]
    fn test_default_policy() {
        assert_eq!(RxErrorPolicy::default(), RxErrorPolicy::DropSilently);
    }
}
