//! Error types
//!
//! Every error here is a configuration or usage error reported to the
//! foreground caller. Data errors on the wire never surface as errors; see
//! [`crate::port::RxErrorPolicy`].

/// Configuration word carries a reserved field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Character size field is not 5-8 bits (9-bit frames are unsupported)
    ReservedCharacterSize(u8),
    /// Parity field uses the reserved encoding
    ReservedParity,
    /// RS-485 field uses the reserved encoding
    ReservedRs485Mode,
}

/// Requested baud rate cannot be produced from the CPU clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BaudError {
    /// Baud rate of zero
    Zero,
    /// Faster than the double-speed divider allows
    TooHigh,
    /// Slower than the 16-bit divider allows
    TooLow,
}

/// Pin binding could not be changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// No pin group matches the requested pins
    NotFound,
    /// Mux index is neither a table row nor the "none" selector
    InvalidMux(u8),
}

/// Errors returned by serial port operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialError {
    /// Invalid configuration word
    Config(ConfigError),
    /// Unreachable baud rate
    Baud(BaudError),
    /// Pin binding failed
    Pins(PinError),
    /// Port used before `begin()`
    NotBegun,
    /// Write on a port begun without its transmitter
    TxDisabled,
}

impl From<ConfigError> for SerialError {
    fn from(e: ConfigError) -> Self {
        SerialError::Config(e)
    }
}

impl From<BaudError> for SerialError {
    fn from(e: BaudError) -> Self {
        SerialError::Baud(e)
    }
}

impl From<PinError> for SerialError {
    fn from(e: PinError) -> Self {
        SerialError::Pins(e)
    }
}

impl core::fmt::Display for SerialError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SerialError::Config(e) => write!(f, "invalid configuration word: {:?}", e),
            SerialError::Baud(e) => write!(f, "unreachable baud rate: {:?}", e),
            SerialError::Pins(e) => write!(f, "pin binding failed: {:?}", e),
            SerialError::NotBegun => f.write_str("serial port not begun"),
            SerialError::TxDisabled => f.write_str("transmitter disabled"),
        }
    }
}

impl embedded_io::Error for SerialError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            SerialError::NotBegun => embedded_io::ErrorKind::Other,
            SerialError::TxDisabled => embedded_io::ErrorKind::Unsupported,
            _ => embedded_io::ErrorKind::InvalidInput,
        }
    }
}
