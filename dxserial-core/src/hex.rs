//! Hexadecimal output helpers
//!
//! Fixed-width uppercase hex for register dumps and protocol traces. Every
//! value prints all of its digits, so `0x0A` is `"0A"` and `0x0001u16` is
//! `"0001"`.

use embedded_io::Write;

const DIGITS: &[u8; 16] = b"0123456789ABCDEF";

fn hex_pair(byte: u8) -> [u8; 2] {
    [DIGITS[usize::from(byte >> 4)], DIGITS[usize::from(byte & 0x0F)]]
}

/// Hex printing for any `embedded_io::Write` sink
pub trait WriteHex: Write {
    /// Two digits
    fn write_hex_u8(&mut self, value: u8) -> Result<(), Self::Error> {
        self.write_all(&hex_pair(value))
    }

    /// Four digits, most significant first unless `swap_order`
    fn write_hex_u16(&mut self, value: u16, swap_order: bool) -> Result<(), Self::Error> {
        let bytes = if swap_order {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        };
        bytes.iter().try_for_each(|&b| self.write_hex_u8(b))
    }

    /// Eight digits, most significant first unless `swap_order`
    fn write_hex_u32(&mut self, value: u32, swap_order: bool) -> Result<(), Self::Error> {
        let bytes = if swap_order {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        };
        bytes.iter().try_for_each(|&b| self.write_hex_u8(b))
    }

    /// A line of bytes, optionally separated, ending in CRLF
    fn write_hex_bytes(&mut self, bytes: &[u8], separator: Option<u8>) -> Result<(), Self::Error> {
        for (i, &b) in bytes.iter().enumerate() {
            if i > 0 {
                if let Some(sep) = separator {
                    self.write_all(&[sep])?;
                }
            }
            self.write_hex_u8(b)?;
        }
        self.write_all(b"\r\n")
    }

    /// A line of 16-bit words, optionally separated, ending in CRLF
    fn write_hex_words(
        &mut self,
        words: &[u16],
        separator: Option<u8>,
        swap_order: bool,
    ) -> Result<(), Self::Error> {
        for (i, &w) in words.iter().enumerate() {
            if i > 0 {
                if let Some(sep) = separator {
                    self.write_all(&[sep])?;
                }
            }
            self.write_hex_u16(w, swap_order)?;
        }
        self.write_all(b"\r\n")
    }
}

impl<W: Write + ?Sized> WriteHex for W {}
