//! GPIO pin abstractions
//!
//! The serial core only ever needs to put a pin into one of three modes
//! when a port is (re)configured, so pin control is a single call keyed by
//! the board's pin number rather than a typed pin object.

/// Raw pin number meaning "no pin"
pub const NOT_A_PIN: u8 = 255;

/// Board pin number (Arduino-style sequential numbering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pin(u8);

impl Pin {
    /// Create a pin from its number
    ///
    /// `NOT_A_PIN` is not a valid pin; use [`Pin::from_raw`] when the value
    /// may carry the sentinel.
    pub const fn new(number: u8) -> Self {
        Self(number)
    }

    /// Convert a raw number, mapping `NOT_A_PIN` to `None`
    pub const fn from_raw(number: u8) -> Option<Self> {
        if number == NOT_A_PIN {
            None
        } else {
            Some(Self(number))
        }
    }

    /// Pin number
    pub const fn number(self) -> u8 {
        self.0
    }

    /// The pin `n` positions after this one
    ///
    /// USART signals occupy consecutive pins (TX, RX, XCK, XDIR), so
    /// companion pins are found by offset.
    pub const fn offset(self, n: u8) -> Option<Self> {
        match self.0.checked_add(n) {
            Some(number) => Self::from_raw(number),
            None => None,
        }
    }
}

/// Pin direction and pull-up state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Floating input
    Input,
    /// Input with internal pull-up enabled
    InputPullup,
    /// Driven output
    Output,
}

/// Pin direction/pull-up control
///
/// Implementations handle the port register manipulation for the chip.
/// Pins not present on the package are ignored.
pub trait PinControl {
    /// Put a pin into the given mode
    fn set_pin_mode(&self, pin: Pin, mode: PinMode);
}

impl<T: PinControl + ?Sized> PinControl for &T {
    fn set_pin_mode(&self, pin: Pin, mode: PinMode) {
        T::set_pin_mode(self, pin, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_sentinel() {
        assert_eq!(Pin::from_raw(NOT_A_PIN), None);
        assert_eq!(Pin::from_raw(4), Some(Pin::new(4)));
    }

    #[test]
    fn test_offset() {
        assert_eq!(Pin::new(8).offset(1), Some(Pin::new(9)));
        assert_eq!(Pin::new(253).offset(2), None);
        assert_eq!(Pin::new(254).offset(5), None);
    }
}
