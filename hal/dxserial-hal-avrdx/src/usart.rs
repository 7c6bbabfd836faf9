//! USART register block
//!
//! Each USART occupies 0x20 bytes starting at 0x0800. The serial core uses
//! the byte registers named by [`Register`] plus the 16-bit BAUD register.

use dxserial_hal::{Register, UsartRegisters};

use crate::mmio;
use crate::pins::USART_COUNT;

/// Address of USART0
pub const USART_BASE: usize = 0x0800;
/// Distance between USART register blocks
pub const USART_STRIDE: usize = 0x20;

const RXDATAL: usize = 0x00;
const RXDATAH: usize = 0x01;
const TXDATAL: usize = 0x02;
const STATUS: usize = 0x04;
const CTRLA: usize = 0x05;
const CTRLB: usize = 0x06;
const CTRLC: usize = 0x07;
const BAUDL: usize = 0x08;
const BAUDH: usize = 0x09;
const EVCTRL: usize = 0x0C;

/// Offset of a register within a USART block
pub const fn register_offset(reg: Register) -> usize {
    match reg {
        Register::RxDataLow => RXDATAL,
        Register::RxDataHigh => RXDATAH,
        Register::TxDataLow => TXDATAL,
        Register::Status => STATUS,
        Register::CtrlA => CTRLA,
        Register::CtrlB => CTRLB,
        Register::CtrlC => CTRLC,
        Register::EvCtrl => EVCTRL,
    }
}

/// One USART peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Usart {
    index: u8,
}

impl Usart {
    /// USART by number, without checking the package has it
    ///
    /// # Safety
    ///
    /// `index` must be below `pins::USART_COUNT`; other values address
    /// unrelated peripherals.
    pub const unsafe fn new_unchecked(index: u8) -> Self {
        Self { index }
    }

    pub const fn usart0() -> Self {
        Self { index: 0 }
    }

    pub const fn usart1() -> Self {
        Self { index: 1 }
    }

    pub const fn usart2() -> Self {
        Self { index: 2 }
    }

    #[cfg(any(feature = "da48", feature = "da64"))]
    pub const fn usart3() -> Self {
        Self { index: 3 }
    }

    #[cfg(any(feature = "da48", feature = "da64"))]
    pub const fn usart4() -> Self {
        Self { index: 4 }
    }

    #[cfg(feature = "da64")]
    pub const fn usart5() -> Self {
        Self { index: 5 }
    }

    /// USART by number, if the package has it
    pub const fn get(index: u8) -> Option<Self> {
        if (index as usize) < USART_COUNT {
            Some(Self { index })
        } else {
            None
        }
    }

    /// USART number
    pub const fn index(&self) -> u8 {
        self.index
    }

    /// Base address of the register block
    pub const fn base(&self) -> usize {
        USART_BASE + USART_STRIDE * self.index as usize
    }

    /// Data-space address of a register
    pub const fn address(&self, reg: Register) -> usize {
        self.base() + register_offset(reg)
    }
}

impl UsartRegisters for Usart {
    fn read(&self, reg: Register) -> u8 {
        mmio::read(self.address(reg))
    }

    fn write(&self, reg: Register, value: u8) {
        mmio::write(self.address(reg), value)
    }

    // 16-bit registers go through the TEMP latch: low byte first on write
    // and on read.
    fn write_baud(&self, value: u16) {
        let [low, high] = value.to_le_bytes();
        critical_section::with(|_| {
            mmio::write(self.base() + BAUDL, low);
            mmio::write(self.base() + BAUDH, high);
        });
    }

    fn baud(&self) -> u16 {
        critical_section::with(|_| {
            let low = mmio::read(self.base() + BAUDL);
            let high = mmio::read(self.base() + BAUDH);
            u16::from_le_bytes([low, high])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_addresses() {
        let usart0 = Usart::usart0();
        assert_eq!(usart0.address(Register::RxDataLow), 0x0800);
        assert_eq!(usart0.address(Register::Status), 0x0804);
        assert_eq!(usart0.address(Register::EvCtrl), 0x080C);

        // SAFETY: only addresses are computed; USART3 may not exist on this package
        let usart3 = unsafe { Usart::new_unchecked(3) };
        assert_eq!(usart3.base(), 0x0860);
        assert_eq!(usart3.address(Register::CtrlB), 0x0866);
        assert_eq!(usart3.address(Register::TxDataLow), 0x0862);
    }

    #[test]
    fn test_register_addresses_on_every_package() {
        for index in 0..USART_COUNT as u8 {
            let usart = Usart::get(index).unwrap();
            assert_eq!(usart.base(), 0x0800 + 0x20 * usize::from(index));
        }
    }

    #[test]
    fn test_get_is_bounded_by_package() {
        assert_eq!(Usart::get(2).map(|u| u.index()), Some(2));
        assert!(Usart::get(USART_COUNT as u8).is_none());
    }

    #[test]
    fn test_blocks_do_not_overlap() {
        for i in 0..5u8 {
            // SAFETY: only addresses are computed, no register is touched
            let (a, b) = unsafe { (Usart::new_unchecked(i), Usart::new_unchecked(i + 1)) };
            assert!(a.address(Register::EvCtrl) < b.base());
        }
    }
}
