//! Peripheral pin routing
//!
//! Several USARTs share one routing register, each owning a bit group.

/// Access to the chip's peripheral routing registers
///
/// `index` selects the register (0 = USARTROUTEA, 1 = USARTROUTEB on
/// AVR Dx). Masking is done by the caller.
pub trait RouteRegisters {
    /// Read a routing register
    fn read_route(&self, index: u8) -> u8;

    /// Write a routing register
    fn write_route(&self, index: u8, value: u8);
}

impl<T: RouteRegisters + ?Sized> RouteRegisters for &T {
    fn read_route(&self, index: u8) -> u8 {
        T::read_route(self, index)
    }

    fn write_route(&self, index: u8, value: u8) {
        T::write_route(self, index, value)
    }
}
