//! Baud rate register calculation
//!
//! The USART uses a fractional baud generator: in normal mode
//! `BAUD = 64 * f_cpu / (16 * baud)`, in double-speed mode
//! `BAUD = 64 * f_cpu / (8 * baud)`. The register must be at least 64.

use dxserial_hal::usart::bits;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::BaudError;

/// Smallest legal BAUD register value
const BAUD_MIN: u64 = 64;

/// Computed baud register setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BaudSetting {
    /// Value for the 16-bit BAUD register
    pub register: u16,
    /// Receiver runs in double-speed (CLK2X) mode
    pub double_speed: bool,
}

impl BaudSetting {
    /// CTRLB receiver-mode bits for this setting
    pub const fn ctrlb_bits(&self) -> u8 {
        if self.double_speed {
            bits::CTRLB_RXMODE_CLK2X
        } else {
            0
        }
    }

    /// Baud rate actually produced at `cpu_hz`
    pub fn actual_baud(&self, cpu_hz: u32) -> u32 {
        let scale: u64 = if self.double_speed { 8 } else { 4 };
        ((scale * u64::from(cpu_hz)) / u64::from(self.register)) as u32
    }
}

/// Compute the BAUD register for `baud` at `cpu_hz`
///
/// Switches to double-speed mode automatically once `baud` exceeds what
/// normal mode can reach (`cpu_hz / 16`). The register is rounded to the
/// nearest value.
///
/// # Errors
///
/// `TooHigh` above `cpu_hz / 8`, `TooLow` when the register would not fit in
/// 16 bits.
pub fn baud_setting(cpu_hz: u32, baud: u32) -> Result<BaudSetting, BaudError> {
    if baud == 0 {
        return Err(BaudError::Zero);
    }

    let double_speed = baud > cpu_hz / 16;
    let scale: u64 = if double_speed { 8 } else { 4 };
    let baud = u64::from(baud);
    let register = (scale * u64::from(cpu_hz) + baud / 2) / baud;

    if register < BAUD_MIN {
        return Err(BaudError::TooHigh);
    }
    if register > u64::from(u16::MAX) {
        return Err(BaudError::TooLow);
    }

    Ok(BaudSetting {
        register: register as u16,
        double_speed,
    })
}
