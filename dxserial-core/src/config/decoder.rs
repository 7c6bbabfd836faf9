//! Configuration decoder
//!
//! Turns a [`SerialConfig`] into the values `begin()` writes to the USART:
//! frame format (CTRLC), interrupt/loopback/RS-485 bits (CTRLA),
//! enable/open-drain bits (CTRLB) and the event control register, plus the
//! pin-enable mask used to set up the bound pins. Nothing here touches
//! hardware.

use dxserial_hal::usart::bits;

use super::word::{CommMode, ConfigWord, Rs485Mode, SerialConfig};
use crate::error::ConfigError;

/// Which pin functions a configuration needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinEnable(u8);

impl PinEnable {
    /// Transmitter enabled
    pub const TX: Self = Self(0x01);
    /// Receiver enabled
    pub const RX: Self = Self(0x02);
    /// TX looped back internally; RX pin unused
    pub const LOOPBACK: Self = Self(0x04);
    /// TX is open-drain
    pub const OPEN_DRAIN: Self = Self(0x08);
    /// XDIR drives an RS-485 transceiver
    pub const RS485: Self = Self(0x10);
    /// XCK outputs the bit clock
    pub const CLOCK_OUT: Self = Self(0x20);
    /// Leave pin modes alone, only route the peripheral
    pub const INTERNAL: Self = Self(0x40);

    /// No functions
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Raw mask
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Check whether every flag of `other` is set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of two masks
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Set a flag when `on`
    pub const fn with_if(self, other: Self, on: bool) -> Self {
        if on {
            self.with(other)
        } else {
            self
        }
    }
}

impl core::ops::BitOr for PinEnable {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

/// Register values derived from a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodedConfig {
    /// CTRLC: frame format and communication mode
    pub ctrlc: u8,
    /// CTRLA: receive interrupt, loopback, RS-485
    pub ctrla: u8,
    /// CTRLB: TX/RX enable, open-drain (receiver mode comes from the baud setting)
    pub ctrlb: u8,
    /// EVCTRL
    pub evctrl: u8,
    /// The receive-complete interrupt should be armed
    pub wants_receive_interrupt: bool,
    /// Single-wire mode; receive is muted while transmitting
    pub is_half_duplex: bool,
    /// Pin functions for the pin binder
    pub pins: PinEnable,
}

impl SerialConfig {
    /// Register values for this configuration
    pub fn registers(&self) -> DecodedConfig {
        let ctrlc = self.to_word().frame_format();

        let wants_receive_interrupt = self.rx_enabled;

        let mut ctrla = 0;
        if wants_receive_interrupt {
            ctrla |= bits::CTRLA_RXCIE;
        }
        if self.loopback {
            ctrla |= bits::CTRLA_LBME;
        }
        if self.rs485 == Rs485Mode::Enabled {
            ctrla |= bits::CTRLA_RS485;
        }

        let mut ctrlb = 0;
        if self.tx_enabled {
            ctrlb |= bits::CTRLB_TXEN;
        }
        if self.rx_enabled {
            ctrlb |= bits::CTRLB_RXEN;
        }
        if self.open_drain {
            ctrlb |= bits::CTRLB_ODME;
        }

        let evctrl = if self.event_rx { bits::EVCTRL_IREI } else { 0 };

        let clock_out = matches!(
            self.mode,
            CommMode::Synchronous | CommMode::MasterSpi { .. }
        );
        let pins = PinEnable::empty()
            .with_if(PinEnable::TX, self.tx_enabled)
            .with_if(PinEnable::RX, self.rx_enabled && !self.event_rx)
            .with_if(PinEnable::LOOPBACK, self.loopback)
            .with_if(PinEnable::OPEN_DRAIN, self.open_drain)
            .with_if(PinEnable::RS485, self.rs485 == Rs485Mode::Enabled)
            .with_if(PinEnable::CLOCK_OUT, clock_out)
            .with_if(PinEnable::INTERNAL, self.internal);

        DecodedConfig {
            ctrlc,
            ctrla,
            ctrlb,
            evctrl,
            wants_receive_interrupt,
            is_half_duplex: self.is_half_duplex(),
            pins,
        }
    }
}

/// Decode a configuration word into register values
///
/// Pure function; the only failure is a reserved field value.
pub fn decode(word: ConfigWord) -> Result<DecodedConfig, ConfigError> {
    Ok(SerialConfig::from_word(word)?.registers())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_8n1() {
        let d = decode(ConfigWord::SERIAL_8N1).unwrap();
        assert_eq!(d.ctrlc, 0x03);
        assert_eq!(d.ctrla, bits::CTRLA_RXCIE);
        assert_eq!(d.ctrlb, bits::CTRLB_TXEN | bits::CTRLB_RXEN);
        assert_eq!(d.evctrl, 0);
        assert!(d.wants_receive_interrupt);
        assert!(!d.is_half_duplex);
        assert_eq!(d.pins, PinEnable::TX | PinEnable::RX);
    }

    #[test]
    fn test_frame_format_passes_through() {
        let d = decode(ConfigWord::SERIAL_7O2).unwrap();
        assert_eq!(d.ctrlc, 0x3A);
        let d = decode(ConfigWord::SERIAL_8E1 | ConfigWord::MODE_SYNC).unwrap();
        assert_eq!(d.ctrlc, 0x63);
        assert!(d.pins.contains(PinEnable::CLOCK_OUT));
    }

    #[test]
    fn test_high_byte_never_reaches_ctrlc() {
        let word = ConfigWord::SERIAL_8N1
            | ConfigWord::HALF_DUPLEX
            | ConfigWord::EVENT_RX
            | ConfigWord::INTERNAL
            | ConfigWord::RS485;
        let d = decode(word).unwrap();
        assert_eq!(d.ctrlc, 0x03);
    }

    #[test]
    fn test_decode_half_duplex() {
        let d = decode(ConfigWord::SERIAL_8N1 | ConfigWord::HALF_DUPLEX).unwrap();
        assert_eq!(d.ctrla, bits::CTRLA_RXCIE | bits::CTRLA_LBME);
        assert_eq!(
            d.ctrlb,
            bits::CTRLB_TXEN | bits::CTRLB_RXEN | bits::CTRLB_ODME
        );
        assert!(d.is_half_duplex);
        assert!(d.pins.contains(PinEnable::LOOPBACK | PinEnable::OPEN_DRAIN));
    }

    #[test]
    fn test_loopback_alone_is_not_half_duplex() {
        let d = decode(ConfigWord::SERIAL_8N1 | ConfigWord::LOOPBACK).unwrap();
        assert!(!d.is_half_duplex);
        let d = decode(ConfigWord::SERIAL_8N1 | ConfigWord::OPEN_DRAIN).unwrap();
        assert!(!d.is_half_duplex);
    }

    #[test]
    fn test_tx_only_has_no_receive_interrupt() {
        let d = decode(ConfigWord::SERIAL_8N1 | ConfigWord::TX_ONLY).unwrap();
        assert_eq!(d.ctrlb, bits::CTRLB_TXEN);
        assert_eq!(d.ctrla, 0);
        assert!(!d.wants_receive_interrupt);
        assert_eq!(d.pins, PinEnable::TX);
    }

    #[test]
    fn test_rx_only() {
        let d = decode(ConfigWord::SERIAL_8N1 | ConfigWord::RX_ONLY).unwrap();
        assert_eq!(d.ctrlb, bits::CTRLB_RXEN);
        assert!(d.wants_receive_interrupt);
        assert_eq!(d.pins, PinEnable::RX);
    }

    #[test]
    fn test_rs485_and_event_rx() {
        let d = decode(ConfigWord::SERIAL_8N1 | ConfigWord::RS485 | ConfigWord::EVENT_RX).unwrap();
        assert_eq!(d.ctrla, bits::CTRLA_RXCIE | bits::CTRLA_RS485);
        assert_eq!(d.evctrl, bits::EVCTRL_IREI);
        assert!(d.pins.contains(PinEnable::RS485));
        assert!(!d.pins.contains(PinEnable::RX));
    }

    #[test]
    fn test_internal_marks_pins_untouched() {
        let d = decode(ConfigWord::SERIAL_8N1 | ConfigWord::INTERNAL).unwrap();
        assert!(d.pins.contains(PinEnable::INTERNAL));
        assert_eq!(d.ctrla, bits::CTRLA_RXCIE);
    }

    #[test]
    fn test_decode_rejects_reserved() {
        assert_eq!(
            decode(ConfigWord::from_bits(0x07)),
            Err(ConfigError::ReservedCharacterSize(7))
        );
    }

    #[test]
    fn test_decode_is_deterministic() {
        let word = ConfigWord::SERIAL_6E2 | ConfigWord::OPEN_DRAIN;
        assert_eq!(decode(word), decode(word));
    }
}
