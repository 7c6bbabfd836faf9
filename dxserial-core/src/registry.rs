//! Port instance registry
//!
//! A chip has a fixed set of USARTs, each with its own interrupt vectors.
//! The board support code builds one [`SerialPort`](crate::SerialPort) per
//! USART in a `static` [`SerialPorts`] and forwards each vector to
//! [`SerialPorts::dispatch`]. There is no dynamic allocation and no way to
//! create a second port for the same peripheral.
//!
//! ```ignore
//! static PORTS: SerialPorts<Port, 2> = SerialPorts::new([
//!     SerialPort::new(Usart::usart0(), DxSystem::new(), &pins::USART0, CONFIG),
//!     SerialPort::new(Usart::usart1(), DxSystem::new(), &pins::USART1, CONFIG),
//! ]);
//!
//! #[avr_interrupt]
//! fn USART0_RXC() {
//!     PORTS.dispatch(0, InterruptEvent::ReceiveComplete);
//! }
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Entry points for a USART's interrupt vectors
pub trait InterruptHandlers {
    /// RXC: a byte was received
    fn on_receive_complete(&self);
    /// DRE: the data register can take another byte
    fn on_data_register_empty(&self);
    /// TXC: the last frame has left the shift register
    fn on_transmit_complete(&self);
    /// Bytes waiting to be read
    fn available(&self) -> usize;
}

/// USART interrupt vectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InterruptEvent {
    ReceiveComplete,
    DataRegisterEmpty,
    TransmitComplete,
}

/// Fixed set of ports, indexed by USART number
pub struct SerialPorts<P, const N: usize> {
    ports: [P; N],
}

impl<P: InterruptHandlers, const N: usize> SerialPorts<P, N> {
    pub const fn new(ports: [P; N]) -> Self {
        Self { ports }
    }

    /// Number of ports
    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Port for a USART number
    pub fn get(&self, index: usize) -> Option<&P> {
        self.ports.get(index)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, P> {
        self.ports.iter()
    }

    /// Route an interrupt to its port
    ///
    /// Vectors for USARTs without a port are ignored.
    pub fn dispatch(&self, index: usize, event: InterruptEvent) {
        let Some(port) = self.ports.get(index) else {
            #[cfg(feature = "defmt")]
            defmt::error!("serial: interrupt {} for unknown port {=usize}", event, index);
            return;
        };
        match event {
            InterruptEvent::ReceiveComplete => port.on_receive_complete(),
            InterruptEvent::DataRegisterEmpty => port.on_data_register_empty(),
            InterruptEvent::TransmitComplete => port.on_transmit_complete(),
        }
    }

    /// Call `f` for every port with unread input
    ///
    /// Meant for the main loop, between iterations of user code.
    pub fn poll_events(&self, mut f: impl FnMut(usize, &P)) {
        for (index, port) in self.ports.iter().enumerate() {
            if port.available() > 0 {
                f(index, port);
            }
        }
    }
}

impl<'a, P: InterruptHandlers, const N: usize> IntoIterator for &'a SerialPorts<P, N> {
    type Item = &'a P;
    type IntoIter = core::slice::Iter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigWord;
    use crate::port::{PortConfig, SerialPort};
    use crate::testing::{SimSystem, SimUsart, USART0_PINS, USART2_PINS};
    use heapless::Vec;

    #[test]
    fn test_dispatch_routes_to_port() {
        let sims = [SimUsart::new(), SimUsart::new()];
        let sys = SimSystem::new();
        let ports: SerialPorts<SerialPort<_, _, 16, 16>, 2> = SerialPorts::new([
            SerialPort::new(&sims[0], &sys, &USART0_PINS, PortConfig::new(16_000_000)),
            SerialPort::new(&sims[1], &sys, &USART2_PINS, PortConfig::new(16_000_000)),
        ]);
        for port in &ports {
            port.begin_with(9600, ConfigWord::SERIAL_8N1).unwrap();
        }

        sims[1].receive(0x42);
        ports.dispatch(1, InterruptEvent::ReceiveComplete);
        assert_eq!(ports.get(0).map(|p| p.available()), Some(0));
        assert_eq!(ports.get(1).and_then(|p| p.read()), Some(0x42));
    }

    #[test]
    fn test_dispatch_unknown_port_ignored() {
        let sim = SimUsart::new();
        let sys = SimSystem::new();
        let ports: SerialPorts<SerialPort<_, _, 16, 16>, 1> = SerialPorts::new([SerialPort::new(
            &sim,
            &sys,
            &USART0_PINS,
            PortConfig::new(16_000_000),
        )]);
        ports.dispatch(3, InterruptEvent::DataRegisterEmpty);
        assert!(ports.get(3).is_none());
        assert_eq!(ports.len(), 1);
    }

    #[test]
    fn test_poll_events_visits_ports_with_input() {
        let sims = [SimUsart::new(), SimUsart::new()];
        let sys = SimSystem::new();
        let ports: SerialPorts<SerialPort<_, _, 16, 16>, 2> = SerialPorts::new([
            SerialPort::new(&sims[0], &sys, &USART0_PINS, PortConfig::new(16_000_000)),
            SerialPort::new(&sims[1], &sys, &USART2_PINS, PortConfig::new(16_000_000)),
        ]);
        for port in ports.iter() {
            port.begin(115_200).unwrap();
        }
        sims[0].receive(b'a');
        ports.dispatch(0, InterruptEvent::ReceiveComplete);

        let mut seen: Vec<usize, 2> = Vec::new();
        ports.poll_events(|index, _| {
            let _ = seen.push(index);
        });
        assert_eq!(seen.as_slice(), &[0]);
    }
}
