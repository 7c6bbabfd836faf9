//! `embedded-io` adapters
//!
//! Lets a port be handed to anything that speaks `embedded_io::{Read, Write}`,
//! including `core::fmt`-style formatting through [`crate::hex::WriteHex`].

use dxserial_hal::{System, UsartRegisters};
use embedded_io::{ErrorType, Read, ReadReady, Write, WriteReady};

use super::SerialPort;
use crate::error::SerialError;

impl<U, S, const RX: usize, const TX: usize> ErrorType for &SerialPort<U, S, RX, TX> {
    type Error = SerialError;
}

impl<U, S, const RX: usize, const TX: usize> ErrorType for SerialPort<U, S, RX, TX> {
    type Error = SerialError;
}

impl<U, S, const RX: usize, const TX: usize> Read for &SerialPort<U, S, RX, TX>
where
    U: UsartRegisters,
    S: System,
{
    /// Blocks until at least one byte has arrived
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if !self.is_usable() {
            return Err(SerialError::NotBegun);
        }
        if buf.is_empty() {
            return Ok(0);
        }
        while self.available() == 0 {
            core::hint::spin_loop();
        }
        let mut n = 0;
        for slot in buf.iter_mut() {
            match SerialPort::<U, S, RX, TX>::read(self) {
                Some(byte) => *slot = byte,
                None => break,
            }
            n += 1;
        }
        Ok(n)
    }
}

impl<U, S, const RX: usize, const TX: usize> ReadReady for &SerialPort<U, S, RX, TX>
where
    U: UsartRegisters,
    S: System,
{
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.available() > 0)
    }
}

impl<U, S, const RX: usize, const TX: usize> Write for &SerialPort<U, S, RX, TX>
where
    U: UsartRegisters,
    S: System,
{
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.write_bytes(buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        SerialPort::<U, S, RX, TX>::flush(self)
    }
}

impl<U, S, const RX: usize, const TX: usize> WriteReady for &SerialPort<U, S, RX, TX>
where
    U: UsartRegisters,
    S: System,
{
    fn write_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.available_for_write() > 0)
    }
}

impl<U, S, const RX: usize, const TX: usize> Read for SerialPort<U, S, RX, TX>
where
    U: UsartRegisters,
    S: System,
{
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Read::read(&mut &*self, buf)
    }
}

impl<U, S, const RX: usize, const TX: usize> Write for SerialPort<U, S, RX, TX>
where
    U: UsartRegisters,
    S: System,
{
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.write_bytes(buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        SerialPort::<U, S, RX, TX>::flush(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ConfigWord;
    use crate::error::SerialError;
    use crate::port::{PortConfig, SerialPort};
    use crate::testing::{run_until_idle, service, SimSystem, SimUsart, USART0_PINS};
    use embedded_io::{Read, ReadReady, Write, WriteReady};

    #[test]
    fn test_write_all_and_flush() {
        let (sim, sys) = (SimUsart::new(), SimSystem::new());
        let port: SerialPort<_, _, 16, 16> =
            SerialPort::new(&sim, &sys, &USART0_PINS, PortConfig::new(16_000_000));
        port.begin_with(9600, ConfigWord::SERIAL_8N1).unwrap();

        let mut w = &port;
        w.write_all(b"ok\r\n").unwrap();
        assert!(w.write_ready().unwrap());
        run_until_idle(&sim, &port);
        Write::flush(&mut w).unwrap();
        assert_eq!(sim.transmitted(), b"ok\r\n");
    }

    #[test]
    fn test_read_returns_buffered_bytes() {
        let (sim, sys) = (SimUsart::new(), SimSystem::new());
        let port: SerialPort<_, _, 16, 16> =
            SerialPort::new(&sim, &sys, &USART0_PINS, PortConfig::new(16_000_000));
        port.begin(9600).unwrap();

        let mut r = &port;
        assert!(!r.read_ready().unwrap());
        for b in b"abc" {
            sim.receive(*b);
            service(&sim, &port);
        }
        assert!(r.read_ready().unwrap());

        let mut buf = [0u8; 2];
        assert_eq!(Read::read(&mut r, &mut buf), Ok(2));
        assert_eq!(&buf, b"ab");
        assert_eq!(Read::read(&mut r, &mut buf), Ok(1));
        assert_eq!(buf[0], b'c');
        assert_eq!(Read::read(&mut r, &mut []), Ok(0));
    }

    #[test]
    fn test_io_before_begin() {
        let (sim, sys) = (SimUsart::new(), SimSystem::new());
        let mut port: SerialPort<_, _, 16, 16> =
            SerialPort::new(&sim, &sys, &USART0_PINS, PortConfig::new(16_000_000));
        let mut buf = [0u8; 4];
        assert_eq!(Read::read(&mut port, &mut buf), Err(SerialError::NotBegun));
        assert_eq!(Write::write(&mut port, b"x"), Err(SerialError::NotBegun));
    }
}
