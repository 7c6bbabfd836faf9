//! Board-agnostic serial port logic for AVR Dx USARTs
//!
//! This crate contains everything about the serial ports that does not
//! touch a register directly:
//!
//! - Lock-free ring buffers shared with interrupt handlers
//! - The transfer state machine (`begin`/`write`/`flush`/`end` and the
//!   RXC/DRE/TXC handlers)
//! - Configuration word decoding and baud rate calculation
//! - Pin-group tables and the pin binding resolver
//! - A fixed registry of ports for interrupt dispatch
//!
//! Hardware access goes through the traits in `dxserial-hal`, so the whole
//! crate runs on the host against simulated registers.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod error;
pub mod hex;
pub mod pins;
pub mod port;
pub mod registry;
pub mod ring_buffer;

#[cfg(test)]
mod testing;

pub use config::{ConfigWord, SerialConfig};
pub use error::{BaudError, ConfigError, PinError, SerialError};
pub use hex::WriteHex;
pub use pins::{MuxSelection, PinRole, PortPinTable};
pub use port::{PortConfig, RxErrorPolicy, SerialPort, TransferState};
pub use registry::{InterruptEvent, InterruptHandlers, SerialPorts};
pub use ring_buffer::RingBuffer;
