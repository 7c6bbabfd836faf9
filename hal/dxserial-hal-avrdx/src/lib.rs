//! AVR DA support for the dxserial USART driver
//!
//! This crate implements the `dxserial-hal` traits on real registers and
//! supplies the package's pin tables:
//!
//! - [`usart::Usart`] - USART register block
//! - [`gpio::Gpio`] - Pin direction and pull-up
//! - [`portmux::PortMux`] - USARTROUTEA/B
//! - [`cpu::Cpu`] - Interrupt state, and the critical-section impl
//!   (feature `critical-section-impl`)
//! - [`pins`] - Generated pin map and USART pin-group tables
//!
//! # Example
//!
//! ```ignore
//! use dxserial_hal_avrdx::{pins, serial_port, Serial, Usart};
//!
//! static SERIAL1: Serial = serial_port(Usart::usart1(), &pins::USART1, 24_000_000);
//!
//! SERIAL1.begin(115_200)?;
//! ```

#![no_std]

mod mmio;

pub mod cpu;
pub mod gpio;
pub mod pins;
pub mod portmux;
pub mod usart;

use dxserial_core::pins::PortPinTable;
use dxserial_core::port::PortConfig;
use dxserial_core::SerialPort;
use dxserial_hal::{InterruptState, Pin, PinControl, PinMode, RouteRegisters};

pub use cpu::Cpu;
pub use gpio::Gpio;
pub use portmux::PortMux;
pub use usart::Usart;

/// Chip-wide services for every port: pins, routing and interrupt state
#[derive(Debug, Clone, Copy, Default)]
pub struct DxSystem {
    gpio: Gpio,
    portmux: PortMux,
    cpu: Cpu,
}

impl DxSystem {
    pub const fn new() -> Self {
        Self {
            gpio: Gpio::new(),
            portmux: PortMux::new(),
            cpu: Cpu::new(),
        }
    }
}

impl PinControl for DxSystem {
    fn set_pin_mode(&self, pin: Pin, mode: PinMode) {
        self.gpio.set_pin_mode(pin, mode)
    }
}

impl RouteRegisters for DxSystem {
    fn read_route(&self, index: u8) -> u8 {
        self.portmux.read_route(index)
    }

    fn write_route(&self, index: u8, value: u8) {
        self.portmux.write_route(index, value)
    }
}

impl InterruptState for DxSystem {
    fn interrupts_blocked(&self) -> bool {
        self.cpu.interrupts_blocked()
    }
}

/// SRAM of the smallest AVR DA part (AVR32DAxx)
pub const MIN_SRAM_SIZE: usize = 4096;

/// Receive buffer size of [`Serial`]
#[cfg(not(feature = "small-buffers"))]
pub const RX_CAPACITY: usize = dxserial_core::port::rx_capacity_for_sram(MIN_SRAM_SIZE);
/// Receive buffer size of [`Serial`]
#[cfg(feature = "small-buffers")]
pub const RX_CAPACITY: usize = dxserial_core::port::SMALL_RX_CAPACITY;

/// Transmit buffer size of [`Serial`]
#[cfg(not(feature = "small-buffers"))]
pub const TX_CAPACITY: usize = dxserial_core::port::tx_capacity_for_sram(MIN_SRAM_SIZE);
/// Transmit buffer size of [`Serial`]
#[cfg(feature = "small-buffers")]
pub const TX_CAPACITY: usize = dxserial_core::port::SMALL_TX_CAPACITY;

/// Serial port on real hardware
pub type Serial<const RX: usize = RX_CAPACITY, const TX: usize = TX_CAPACITY> =
    SerialPort<Usart, DxSystem, RX, TX>;

/// Port for a USART, usable in a `static` initializer
pub const fn serial_port<const RX: usize, const TX: usize>(
    usart: Usart,
    pins: &'static PortPinTable,
    cpu_hz: u32,
) -> Serial<RX, TX> {
    SerialPort::new(usart, DxSystem::new(), pins, PortConfig::new(cpu_hz))
}
