//! Pin binding resolver
//!
//! Maps a requested TX/RX pair (or a raw mux index) to a row of the port's
//! pin-group table, and puts the bound pins into the modes a configuration
//! needs.

use dxserial_hal::{PinControl, PinMode, RouteRegisters};

use super::table::{MuxRoute, MuxSelection, Pin, PortPinTable, MUX_NONE};
use crate::config::PinEnable;
use crate::error::PinError;

/// Find the pin group for a TX/RX pair
///
/// `(None, None)` selects no pins. Otherwise the first wired row whose TX
/// matches `tx` and whose RX matches `rx` wins; a `None` on either side
/// matches any row.
///
/// # Errors
///
/// `PinError::NotFound` when no row matches.
pub fn resolve_mux_from_pins(
    table: &PortPinTable,
    tx: Option<Pin>,
    rx: Option<Pin>,
) -> Result<MuxSelection, PinError> {
    if tx.is_none() && rx.is_none() {
        return Ok(MuxSelection::Disconnected);
    }

    table
        .groups
        .iter()
        .position(|g| {
            g.is_wired()
                && tx.map_or(true, |t| g.tx == Some(t))
                && rx.map_or(true, |r| g.rx() == Some(r))
        })
        .map(|i| MuxSelection::Group(i as u8))
        .ok_or(PinError::NotFound)
}

/// Validate a raw mux index as passed to `swap()`
///
/// Accepts a row index or [`MUX_NONE`].
pub fn select_mux(table: &PortPinTable, index: u8) -> Result<MuxSelection, PinError> {
    if index == MUX_NONE {
        Ok(MuxSelection::Disconnected)
    } else if usize::from(index) < table.len() {
        Ok(MuxSelection::Group(index))
    } else {
        Err(PinError::InvalidMux(index))
    }
}

/// Configure the bound pins and route the peripheral to them
///
/// | pin  | mode                                                       |
/// |------|------------------------------------------------------------|
/// | TX   | output if TX enabled and not open-drain, else input+pullup |
/// | RX   | input+pullup if RX enabled and not loopback                |
/// | XDIR | output with RS-485                                         |
/// | XCK  | output in synchronous/SPI modes                            |
///
/// Pins are left alone with [`PinEnable::INTERNAL`]. The routing register
/// is always written.
pub fn apply_pin_configuration<S>(
    table: &PortPinTable,
    selection: MuxSelection,
    enable: PinEnable,
    system: &S,
) where
    S: PinControl + RouteRegisters,
{
    if let Some(group) = table.group(selection) {
        if !enable.contains(PinEnable::INTERNAL) {
            if let Some(tx) = group.tx {
                let mode = if enable.contains(PinEnable::TX)
                    && !enable.contains(PinEnable::OPEN_DRAIN)
                {
                    PinMode::Output
                } else {
                    PinMode::InputPullup
                };
                system.set_pin_mode(tx, mode);
            }
            if enable.contains(PinEnable::RX) && !enable.contains(PinEnable::LOOPBACK) {
                if let Some(rx) = group.rx() {
                    system.set_pin_mode(rx, PinMode::InputPullup);
                }
            }
            if enable.contains(PinEnable::RS485) {
                if let Some(xdir) = group.xdir() {
                    system.set_pin_mode(xdir, PinMode::Output);
                }
            }
            if enable.contains(PinEnable::CLOCK_OUT) {
                if let Some(xck) = group.xck {
                    system.set_pin_mode(xck, PinMode::Output);
                }
            }
        }
    }

    route(&table.route, table.mux_code(selection), system);
}

/// Write this USART's field of the routing register
///
/// Other peripherals own the remaining bits, so the read-modify-write runs
/// with interrupts disabled.
pub fn route<R: RouteRegisters>(route: &MuxRoute, code: u8, registers: &R) {
    critical_section::with(|_| {
        let current = registers.read_route(route.register);
        let value = (current & !route.group_mask) | (code & route.group_mask);
        registers.write_route(route.register, value);
    });
}
