//! Peripheral routing registers
//!
//! USARTROUTEA carries the fields for USART0-3, USARTROUTEB those for
//! USART4 and USART5.

use dxserial_hal::RouteRegisters;

use crate::mmio;

/// Address of PORTMUX.USARTROUTEA
pub const USARTROUTEA: usize = 0x05E2;
/// Number of USART routing registers
pub const ROUTE_REGISTER_COUNT: u8 = 2;

/// Data-space address of a routing register
pub const fn route_address(index: u8) -> Option<usize> {
    if index < ROUTE_REGISTER_COUNT {
        Some(USARTROUTEA + index as usize)
    } else {
        None
    }
}

/// PORTMUX USART routing
#[derive(Debug, Clone, Copy, Default)]
pub struct PortMux;

impl PortMux {
    pub const fn new() -> Self {
        Self
    }
}

impl RouteRegisters for PortMux {
    fn read_route(&self, index: u8) -> u8 {
        route_address(index).map_or(0, mmio::read)
    }

    fn write_route(&self, index: u8, value: u8) {
        if let Some(addr) = route_address(index) {
            mmio::write(addr, value);
        }
    }
}
