//! Configuration word and its typed form
//!
//! Sketch code passes a 16-bit configuration word built from the constants
//! on [`ConfigWord`]. The low byte is the USART frame format (written to
//! CTRLC almost verbatim); the high byte holds extended options that only
//! the decoder interprets. Inside the crate the word is converted once into
//! a [`SerialConfig`] with named fields.
//!
//! ```text
//!  15 14 13 12 11 10  9  8 | 7  6  5  4  3  2  1  0
//! [RS485][EV][IN][!R][!T][OD][LB]|[CMODE][PMODE][SB][CHSIZE ]
//! ```

use core::ops::BitOr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CHSIZE_MASK: u8 = 0x07;
const SBMODE_TWO: u8 = 0x08;
const PMODE_MASK: u8 = 0x30;
const PMODE_EVEN: u8 = 0x20;
const PMODE_ODD: u8 = 0x30;
const CMODE_MASK: u8 = 0xC0;
const CMODE_SYNC: u8 = 0x40;
const CMODE_IRCOM: u8 = 0x80;
const CMODE_MSPI: u8 = 0xC0;
const MSPI_UDORD: u8 = 0x04;
const MSPI_UCPHA: u8 = 0x02;

// High byte, as bit positions within the high byte
const OPT_LOOPBACK: u8 = 0x01;
const OPT_OPEN_DRAIN: u8 = 0x02;
const OPT_TX_DISABLE: u8 = 0x04;
const OPT_RX_DISABLE: u8 = 0x08;
const OPT_INTERNAL: u8 = 0x10;
const OPT_EVENT_RX: u8 = 0x20;
const OPT_RS485_SHIFT: u8 = 6;

/// 16-bit serial configuration word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct ConfigWord(u16);

impl ConfigWord {
    pub const SERIAL_5N1: Self = Self(0x00);
    pub const SERIAL_6N1: Self = Self(0x01);
    pub const SERIAL_7N1: Self = Self(0x02);
    pub const SERIAL_8N1: Self = Self(0x03);
    pub const SERIAL_5N2: Self = Self(0x08);
    pub const SERIAL_6N2: Self = Self(0x09);
    pub const SERIAL_7N2: Self = Self(0x0A);
    pub const SERIAL_8N2: Self = Self(0x0B);
    pub const SERIAL_5E1: Self = Self(0x20);
    pub const SERIAL_6E1: Self = Self(0x21);
    pub const SERIAL_7E1: Self = Self(0x22);
    pub const SERIAL_8E1: Self = Self(0x23);
    pub const SERIAL_5E2: Self = Self(0x28);
    pub const SERIAL_6E2: Self = Self(0x29);
    pub const SERIAL_7E2: Self = Self(0x2A);
    pub const SERIAL_8E2: Self = Self(0x2B);
    pub const SERIAL_5O1: Self = Self(0x30);
    pub const SERIAL_6O1: Self = Self(0x31);
    pub const SERIAL_7O1: Self = Self(0x32);
    pub const SERIAL_8O1: Self = Self(0x33);
    pub const SERIAL_5O2: Self = Self(0x38);
    pub const SERIAL_6O2: Self = Self(0x39);
    pub const SERIAL_7O2: Self = Self(0x3A);
    pub const SERIAL_8O2: Self = Self(0x3B);

    /// Asynchronous mode (the default)
    pub const MODE_ASYNC: Self = Self(0x00);
    /// Synchronous mode, XCK driven by this side
    pub const MODE_SYNC: Self = Self(CMODE_SYNC as u16);
    /// IrDA mode
    pub const MODE_IRCOM: Self = Self(CMODE_IRCOM as u16);
    /// Master SPI mode
    pub const MODE_MSPI: Self = Self(CMODE_MSPI as u16);

    /// TX looped back to RX internally
    pub const LOOPBACK: Self = Self((OPT_LOOPBACK as u16) << 8);
    /// TX pin only pulls low
    pub const OPEN_DRAIN: Self = Self((OPT_OPEN_DRAIN as u16) << 8);
    /// Transmitter disabled
    pub const RX_ONLY: Self = Self((OPT_TX_DISABLE as u16) << 8);
    /// Receiver disabled
    pub const TX_ONLY: Self = Self((OPT_RX_DISABLE as u16) << 8);
    /// Internal connection; pins are left alone
    pub const INTERNAL: Self = Self((OPT_INTERNAL as u16) << 8);
    /// Receiver fed from the event system
    pub const EVENT_RX: Self = Self((OPT_EVENT_RX as u16) << 8);
    /// RS-485 direction control on XDIR
    pub const RS485: Self = Self(1 << (8 + OPT_RS485_SHIFT));
    /// Single-wire half duplex
    pub const HALF_DUPLEX: Self = Self(Self::LOOPBACK.0 | Self::OPEN_DRAIN.0);

    /// Wrap raw bits
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw bits
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Frame format byte
    pub const fn frame_format(self) -> u8 {
        self.0 as u8
    }

    /// Extended options byte
    pub const fn options(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Combine two words (usable in `const` context)
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check whether every bit of `other` is set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for ConfigWord {
    fn default() -> Self {
        Self::SERIAL_8N1
    }
}

impl BitOr for ConfigWord {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

impl From<u16> for ConfigWord {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

impl From<ConfigWord> for u16 {
    fn from(word: ConfigWord) -> Self {
        word.0
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StopBits {
    One,
    Two,
}

/// USART communication mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CommMode {
    Asynchronous,
    /// Clocked by XCK
    Synchronous,
    /// IrDA pulse encoding
    Infrared,
    /// SPI master; frame format bits become bit order and clock phase
    MasterSpi {
        lsb_first: bool,
        sample_trailing: bool,
    },
}

/// RS-485 direction control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Rs485Mode {
    Disabled,
    /// XDIR is driven high for the duration of each transmission
    Enabled,
}

/// Typed serial configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SerialConfig {
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub mode: CommMode,
    /// TX internally connected to RX
    pub loopback: bool,
    /// TX drives low only
    pub open_drain: bool,
    pub tx_enabled: bool,
    pub rx_enabled: bool,
    /// Peripheral is wired internally; pin modes are not touched
    pub internal: bool,
    /// Receiver input comes from the event system
    pub event_rx: bool,
    pub rs485: Rs485Mode,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            mode: CommMode::Asynchronous,
            loopback: false,
            open_drain: false,
            tx_enabled: true,
            rx_enabled: true,
            internal: false,
            event_rx: false,
            rs485: Rs485Mode::Disabled,
        }
    }
}

impl SerialConfig {
    /// Parse a configuration word
    pub fn from_word(word: ConfigWord) -> Result<Self, ConfigError> {
        let format = word.frame_format();
        let options = word.options();

        let mut config = Self::default();

        match format & CMODE_MASK {
            CMODE_MSPI => {
                config.mode = CommMode::MasterSpi {
                    lsb_first: format & MSPI_UDORD != 0,
                    sample_trailing: format & MSPI_UCPHA != 0,
                };
            }
            cmode => {
                config.mode = match cmode {
                    CMODE_SYNC => CommMode::Synchronous,
                    CMODE_IRCOM => CommMode::Infrared,
                    _ => CommMode::Asynchronous,
                };
                config.data_bits = match format & CHSIZE_MASK {
                    0 => DataBits::Five,
                    1 => DataBits::Six,
                    2 => DataBits::Seven,
                    3 => DataBits::Eight,
                    other => return Err(ConfigError::ReservedCharacterSize(other)),
                };
                config.parity = match format & PMODE_MASK {
                    0 => Parity::None,
                    PMODE_EVEN => Parity::Even,
                    PMODE_ODD => Parity::Odd,
                    _ => return Err(ConfigError::ReservedParity),
                };
                config.stop_bits = if format & SBMODE_TWO != 0 {
                    StopBits::Two
                } else {
                    StopBits::One
                };
            }
        }

        config.rs485 = match options >> OPT_RS485_SHIFT {
            0 => Rs485Mode::Disabled,
            1 => Rs485Mode::Enabled,
            _ => return Err(ConfigError::ReservedRs485Mode),
        };
        config.loopback = options & OPT_LOOPBACK != 0;
        config.open_drain = options & OPT_OPEN_DRAIN != 0;
        config.tx_enabled = options & OPT_TX_DISABLE == 0;
        config.rx_enabled = options & OPT_RX_DISABLE == 0;
        config.internal = options & OPT_INTERNAL != 0;
        config.event_rx = options & OPT_EVENT_RX != 0;

        Ok(config)
    }

    /// Pack into a configuration word
    pub fn to_word(&self) -> ConfigWord {
        let format = match self.mode {
            CommMode::MasterSpi {
                lsb_first,
                sample_trailing,
            } => {
                let mut f = CMODE_MSPI;
                if lsb_first {
                    f |= MSPI_UDORD;
                }
                if sample_trailing {
                    f |= MSPI_UCPHA;
                }
                f
            }
            mode => {
                let cmode = match mode {
                    CommMode::Synchronous => CMODE_SYNC,
                    CommMode::Infrared => CMODE_IRCOM,
                    _ => 0,
                };
                let chsize = match self.data_bits {
                    DataBits::Five => 0,
                    DataBits::Six => 1,
                    DataBits::Seven => 2,
                    DataBits::Eight => 3,
                };
                let pmode = match self.parity {
                    Parity::None => 0,
                    Parity::Even => PMODE_EVEN,
                    Parity::Odd => PMODE_ODD,
                };
                let sbmode = match self.stop_bits {
                    StopBits::One => 0,
                    StopBits::Two => SBMODE_TWO,
                };
                cmode | pmode | sbmode | chsize
            }
        };

        let mut options = match self.rs485 {
            Rs485Mode::Disabled => 0,
            Rs485Mode::Enabled => 1 << OPT_RS485_SHIFT,
        };
        if self.loopback {
            options |= OPT_LOOPBACK;
        }
        if self.open_drain {
            options |= OPT_OPEN_DRAIN;
        }
        if !self.tx_enabled {
            options |= OPT_TX_DISABLE;
        }
        if !self.rx_enabled {
            options |= OPT_RX_DISABLE;
        }
        if self.internal {
            options |= OPT_INTERNAL;
        }
        if self.event_rx {
            options |= OPT_EVENT_RX;
        }

        ConfigWord(u16::from(options) << 8 | u16::from(format))
    }

    /// Same configuration with a different parity
    pub fn with_parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    /// Same configuration with a different stop bit count
    pub fn with_stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.stop_bits = stop_bits;
        self
    }

    /// Same configuration with a different character size
    pub fn with_data_bits(mut self, data_bits: DataBits) -> Self {
        self.data_bits = data_bits;
        self
    }

    /// Single-wire half duplex (loopback + open-drain)
    pub fn half_duplex(mut self) -> Self {
        self.loopback = true;
        self.open_drain = true;
        self
    }

    /// Half duplex as configured: both loopback and open-drain
    pub fn is_half_duplex(&self) -> bool {
        self.loopback && self.open_drain
    }
}

impl TryFrom<ConfigWord> for SerialConfig {
    type Error = ConfigError;

    fn try_from(word: ConfigWord) -> Result<Self, Self::Error> {
        Self::from_word(word)
    }
}

impl From<SerialConfig> for ConfigWord {
    fn from(config: SerialConfig) -> Self {
        config.to_word()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_8n1() {
        let config = SerialConfig::from_word(ConfigWord::SERIAL_8N1).unwrap();
        assert_eq!(config, SerialConfig::default());
        assert_eq!(ConfigWord::default(), ConfigWord::SERIAL_8N1);
    }

    #[test]
    fn test_frame_fields() {
        let config = SerialConfig::from_word(ConfigWord::SERIAL_7E2).unwrap();
        assert_eq!(config.data_bits, DataBits::Seven);
        assert_eq!(config.parity, Parity::Even);
        assert_eq!(config.stop_bits, StopBits::Two);

        let config = SerialConfig::from_word(ConfigWord::SERIAL_5O1).unwrap();
        assert_eq!(config.data_bits, DataBits::Five);
        assert_eq!(config.parity, Parity::Odd);
        assert_eq!(config.stop_bits, StopBits::One);
    }

    #[test]
    fn test_high_byte_bit_positions() {
        assert_eq!(ConfigWord::LOOPBACK.bits(), 1 << 8);
        assert_eq!(ConfigWord::OPEN_DRAIN.bits(), 1 << 9);
        assert_eq!(ConfigWord::RX_ONLY.bits(), 1 << 10);
        assert_eq!(ConfigWord::TX_ONLY.bits(), 1 << 11);
        assert_eq!(ConfigWord::INTERNAL.bits(), 1 << 12);
        assert_eq!(ConfigWord::EVENT_RX.bits(), 1 << 13);
        assert_eq!(ConfigWord::RS485.bits(), 1 << 14);
        assert_eq!(ConfigWord::HALF_DUPLEX.bits(), 0x0300);
    }

    #[test]
    fn test_options() {
        let word = ConfigWord::SERIAL_8N1 | ConfigWord::HALF_DUPLEX | ConfigWord::RS485;
        let config = SerialConfig::from_word(word).unwrap();
        assert!(config.loopback);
        assert!(config.open_drain);
        assert!(config.is_half_duplex());
        assert_eq!(config.rs485, Rs485Mode::Enabled);
        assert!(config.tx_enabled && config.rx_enabled);

        let config = SerialConfig::from_word(ConfigWord::TX_ONLY).unwrap();
        assert!(config.tx_enabled);
        assert!(!config.rx_enabled);
        let config = SerialConfig::from_word(ConfigWord::RX_ONLY).unwrap();
        assert!(!config.tx_enabled);
        assert!(config.rx_enabled);
    }

    #[test]
    fn test_reserved_values_rejected() {
        assert_eq!(
            SerialConfig::from_word(ConfigWord::from_bits(0x06)),
            Err(ConfigError::ReservedCharacterSize(6))
        );
        assert_eq!(
            SerialConfig::from_word(ConfigWord::from_bits(0x13)),
            Err(ConfigError::ReservedParity)
        );
        assert_eq!(
            SerialConfig::from_word(ConfigWord::from_bits(0x8003)),
            Err(ConfigError::ReservedRs485Mode)
        );
    }

    #[test]
    fn test_mspi_ignores_character_size() {
        let word = ConfigWord::MODE_MSPI | ConfigWord::from_bits(0x06);
        let config = SerialConfig::from_word(word).unwrap();
        assert_eq!(
            config.mode,
            CommMode::MasterSpi {
                lsb_first: true,
                sample_trailing: true,
            }
        );
        assert_eq!(config.to_word(), word);
    }

    #[test]
    fn test_round_trip_all_frame_formats() {
        for chsize in 0..4u16 {
            for pmode in [0x00u16, 0x20, 0x30] {
                for sbmode in [0x00u16, 0x08] {
                    for cmode in [0x00u16, 0x40, 0x80] {
                        let word = ConfigWord::from_bits(cmode | pmode | sbmode | chsize);
                        let config = SerialConfig::from_word(word).unwrap();
                        assert_eq!(config.to_word(), word);
                    }
                }
            }
        }
    }

    #[test]
    fn test_builders() {
        let config = SerialConfig::default()
            .with_data_bits(DataBits::Seven)
            .with_parity(Parity::Odd)
            .with_stop_bits(StopBits::Two)
            .half_duplex();
        assert_eq!(
            config.to_word(),
            ConfigWord::SERIAL_7O2 | ConfigWord::HALF_DUPLEX
        );
    }
}
