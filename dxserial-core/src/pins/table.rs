//! Pin-group table types
//!
//! Each USART can be routed to a few alternative pin groups. A group lists
//! the mux code written to the routing register, the TX pin and the XCK pin;
//! RX and XDIR follow TX and XCK on the next pin, which holds for every
//! AVR Dx package. Groups that exist in the routing scheme but are not
//! bonded out on a package have `tx: None`.
//!
//! Tables are generated at build time by the chip HAL.

pub use dxserial_hal::gpio::{Pin, NOT_A_PIN};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `swap()` argument selecting "no pins"
pub const MUX_NONE: u8 = 128;

/// Signal carried by a USART pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PinRole {
    Tx,
    Rx,
    /// Clock (synchronous and SPI modes)
    Xck,
    /// Transmit direction (RS-485)
    Xdir,
}

/// One row of a port's pin-group table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinGroup {
    /// Value for this USART's field in the routing register
    pub mux_code: u8,
    pub tx: Option<Pin>,
    pub xck: Option<Pin>,
}

impl PinGroup {
    pub const fn new(mux_code: u8, tx: Option<Pin>, xck: Option<Pin>) -> Self {
        Self { mux_code, tx, xck }
    }

    /// RX pin (TX + 1)
    pub const fn rx(&self) -> Option<Pin> {
        match self.tx {
            Some(tx) => tx.offset(1),
            None => None,
        }
    }

    /// XDIR pin (XCK + 1)
    pub const fn xdir(&self) -> Option<Pin> {
        match self.xck {
            Some(xck) => xck.offset(1),
            None => None,
        }
    }

    /// Pin for a signal
    pub const fn pin(&self, role: PinRole) -> Option<Pin> {
        match role {
            PinRole::Tx => self.tx,
            PinRole::Rx => self.rx(),
            PinRole::Xck => self.xck,
            PinRole::Xdir => self.xdir(),
        }
    }

    /// Group is bonded out on this package
    pub const fn is_wired(&self) -> bool {
        self.tx.is_some()
    }
}

/// Location of a USART's field in the shared routing registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MuxRoute {
    /// Routing register index
    pub register: u8,
    /// Bits owned by this USART
    pub group_mask: u8,
    /// Code that disconnects the USART from every pin
    pub none_code: u8,
}

impl MuxRoute {
    pub const fn new(register: u8, group_mask: u8, none_code: u8) -> Self {
        Self {
            register,
            group_mask,
            none_code,
        }
    }
}

/// Active pin group of a port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MuxSelection {
    /// Row index into the port's table
    Group(u8),
    /// Routed to no pins
    Disconnected,
}

impl MuxSelection {
    /// Numeric form as accepted by `swap()`
    pub const fn index(self) -> u8 {
        match self {
            MuxSelection::Group(i) => i,
            MuxSelection::Disconnected => MUX_NONE,
        }
    }
}

/// Pin groups of one USART
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortPinTable {
    pub groups: &'static [PinGroup],
    pub route: MuxRoute,
}

impl PortPinTable {
    pub const fn new(groups: &'static [PinGroup], route: MuxRoute) -> Self {
        Self { groups, route }
    }

    /// Number of rows
    pub const fn len(&self) -> usize {
        self.groups.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Selection a freshly constructed port starts with
    pub const fn default_selection(&self) -> MuxSelection {
        if self.groups.is_empty() {
            MuxSelection::Disconnected
        } else {
            MuxSelection::Group(0)
        }
    }

    /// Row for a selection
    pub fn group(&self, selection: MuxSelection) -> Option<&PinGroup> {
        match selection {
            MuxSelection::Group(i) => self.groups.get(usize::from(i)),
            MuxSelection::Disconnected => None,
        }
    }

    /// Routing code for a selection
    pub fn mux_code(&self, selection: MuxSelection) -> u8 {
        self.group(selection)
            .map_or(self.route.none_code, |g| g.mux_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static GROUPS: [PinGroup; 2] = [
        PinGroup::new(0x00, Some(Pin::new(34)), Some(Pin::new(36))),
        PinGroup::new(0x10, Some(Pin::new(38)), None),
    ];

    static TABLE: PortPinTable = PortPinTable::new(&GROUPS, MuxRoute::new(0, 0x30, 0x30));

    #[test]
    fn test_derived_pins() {
        let g = &GROUPS[0];
        assert_eq!(g.pin(PinRole::Tx), Some(Pin::new(34)));
        assert_eq!(g.pin(PinRole::Rx), Some(Pin::new(35)));
        assert_eq!(g.pin(PinRole::Xck), Some(Pin::new(36)));
        assert_eq!(g.pin(PinRole::Xdir), Some(Pin::new(37)));
    }

    #[test]
    fn test_missing_clock_has_no_direction_pin() {
        let g = &GROUPS[1];
        assert_eq!(g.rx(), Some(Pin::new(39)));
        assert_eq!(g.xck, None);
        assert_eq!(g.xdir(), None);
    }

    #[test]
    fn test_unwired_group() {
        let g = PinGroup::new(0x01, None, None);
        assert!(!g.is_wired());
        assert_eq!(g.rx(), None);
    }

    #[test]
    fn test_mux_code_lookup() {
        assert_eq!(TABLE.mux_code(MuxSelection::Group(1)), 0x10);
        assert_eq!(TABLE.mux_code(MuxSelection::Disconnected), 0x30);
        assert_eq!(TABLE.default_selection(), MuxSelection::Group(0));
        assert_eq!(MuxSelection::Disconnected.index(), MUX_NONE);
    }
}
