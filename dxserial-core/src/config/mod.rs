//! Serial configuration
//!
//! - [`ConfigWord`] - the compact 16-bit word sketches pass to `begin()`
//! - [`SerialConfig`] - the same information as named fields
//! - [`decode`] - configuration word to register values
//! - [`baud_setting`] - baud rate to BAUD register, with automatic 2x mode

pub mod baud;
pub mod decoder;
pub mod word;

pub use baud::{baud_setting, BaudSetting};
pub use decoder::{decode, DecodedConfig, PinEnable};
pub use word::{CommMode, ConfigWord, DataBits, Parity, Rs485Mode, SerialConfig, StopBits};
