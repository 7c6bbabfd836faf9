//! Pin-group tables and pin binding

pub mod resolver;
pub mod table;

pub use resolver::{apply_pin_configuration, resolve_mux_from_pins, route, select_mux};
pub use table::{MuxRoute, MuxSelection, Pin, PinGroup, PinRole, PortPinTable, MUX_NONE, NOT_A_PIN};
