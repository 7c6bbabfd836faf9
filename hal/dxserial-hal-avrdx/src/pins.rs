//! Package pin map and USART pin-group tables
//!
//! The tables are generated by the build script from
//! `variants/<package>.toml` for the enabled `da*` feature:
//!
//! - [`PIN_LOCATIONS`] - port and bit behind each board pin number
//! - `USART0`, `USART1`, ... - one [`PortPinTable`] per USART
//! - [`USART_PINS`] - the same tables indexed by USART number

use dxserial_core::pins::{MuxRoute, PinGroup, PortPinTable};
use dxserial_hal::Pin;

/// Port (A = 0) and bit of a package pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinLocation {
    port: u8,
    bit: u8,
}

impl PinLocation {
    pub const fn new(port: u8, bit: u8) -> Self {
        Self { port, bit }
    }

    pub const fn port(&self) -> u8 {
        self.port
    }

    pub const fn bit(&self) -> u8 {
        self.bit
    }

    /// Bit mask within the port registers
    pub const fn mask(&self) -> u8 {
        1 << self.bit
    }

    /// Port letter, `'A'` to `'G'`
    pub const fn port_letter(&self) -> char {
        (b'A' + self.port) as char
    }
}

include!(concat!(env!("OUT_DIR"), "/pin_tables.rs"));

/// Port and bit of a board pin
pub fn location(pin: Pin) -> Option<PinLocation> {
    PIN_LOCATIONS
        .get(usize::from(pin.number()))
        .copied()
        .flatten()
}

/// Board pin at a port and bit
pub fn pin_at(port: u8, bit: u8) -> Option<Pin> {
    let wanted = PinLocation::new(port, bit);
    PIN_LOCATIONS
        .iter()
        .position(|loc| *loc == Some(wanted))
        .and_then(|n| u8::try_from(n).ok())
        .map(Pin::new)
}

/// Board pin from a name like `"PA4"`
pub fn pin_by_name(name: &str) -> Option<Pin> {
    match name.trim().as_bytes() {
        [b'P', port @ b'A'..=b'G', bit @ b'0'..=b'7'] => pin_at(port - b'A', bit - b'0'),
        _ => None,
    }
}

/// Pin-group table of a USART, if the package has it
pub fn usart_pins(index: usize) -> Option<&'static PortPinTable> {
    USART_PINS.get(index).copied()
}
