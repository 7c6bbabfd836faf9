//! Port pin direction and pull-up control
//!
//! Pins are addressed by board number and looked up in the generated
//! location table. Direction changes use the DIRSET/DIRCLR strobes, so
//! only the pull-up update needs a critical section.

use dxserial_hal::{Pin, PinControl, PinMode};

use crate::mmio;
use crate::pins::{location, PinLocation};

/// Address of PORTA
pub const PORT_BASE: usize = 0x0400;
/// Distance between port register blocks
pub const PORT_STRIDE: usize = 0x20;

const DIRSET: usize = 0x01;
const DIRCLR: usize = 0x02;
const PIN0CTRL: usize = 0x10;

/// PINnCTRL pull-up enable
pub const PINCTRL_PULLUPEN: u8 = 0x08;

impl PinLocation {
    const fn port_base(&self) -> usize {
        PORT_BASE + PORT_STRIDE * self.port() as usize
    }

    /// DIRSET strobe for this pin's port
    pub const fn dirset_address(&self) -> usize {
        self.port_base() + DIRSET
    }

    /// DIRCLR strobe for this pin's port
    pub const fn dirclr_address(&self) -> usize {
        self.port_base() + DIRCLR
    }

    /// PINnCTRL for this pin
    pub const fn pinctrl_address(&self) -> usize {
        self.port_base() + PIN0CTRL + self.bit() as usize
    }
}

/// Port pins of the selected package
#[derive(Debug, Clone, Copy, Default)]
pub struct Gpio;

impl Gpio {
    pub const fn new() -> Self {
        Self
    }
}

impl PinControl for Gpio {
    fn set_pin_mode(&self, pin: Pin, mode: PinMode) {
        let Some(loc) = location(pin) else {
            return;
        };
        let pinctrl = loc.pinctrl_address();
        match mode {
            PinMode::Output => mmio::write(loc.dirset_address(), loc.mask()),
            PinMode::Input => {
                mmio::write(loc.dirclr_address(), loc.mask());
                critical_section::with(|_| {
                    mmio::write(pinctrl, mmio::read(pinctrl) & !PINCTRL_PULLUPEN);
                });
            }
            PinMode::InputPullup => {
                mmio::write(loc.dirclr_address(), loc.mask());
                critical_section::with(|_| {
                    mmio::write(pinctrl, mmio::read(pinctrl) | PINCTRL_PULLUPEN);
                });
            }
        }
    }
}
