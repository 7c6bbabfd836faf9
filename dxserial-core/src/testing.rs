//! Simulated hardware for host tests
//!
//! `SimUsart` models the parts of the USART the driver depends on: a
//! one-byte data register feeding a shift register, the DRE/TXC/RXC flags,
//! a small receive FIFO, loopback echo, and write-one-to-clear STATUS.
//! Time advances one frame per [`SimUsart::tick`].

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::vec::Vec;

use dxserial_hal::usart::bits;
use dxserial_hal::{InterruptState, Pin, PinControl, PinMode, Register, RouteRegisters, UsartRegisters};
use portable_atomic::{AtomicBool, Ordering};

use crate::pins::{MuxRoute, PinGroup, PortPinTable};
use crate::registry::InterruptHandlers;

static USART0_GROUPS: [PinGroup; 2] = [
    PinGroup::new(0x00, Some(Pin::new(0)), Some(Pin::new(2))),
    PinGroup::new(0x01, Some(Pin::new(4)), Some(Pin::new(6))),
];

static USART2_GROUPS: [PinGroup; 2] = [
    PinGroup::new(0x00, Some(Pin::new(34)), Some(Pin::new(36))),
    PinGroup::new(0x10, Some(Pin::new(38)), None),
];

/// USART0 on a 48-pin part: PA0-PA3, alternate PA4-PA7
pub static USART0_PINS: PortPinTable = PortPinTable::new(&USART0_GROUPS, MuxRoute::new(0, 0x03, 0x03));

/// USART2 on a 48-pin part: PF0-PF3, alternate PF4/PF5 without XCK/XDIR
pub static USART2_PINS: PortPinTable = PortPinTable::new(&USART2_GROUPS, MuxRoute::new(0, 0x30, 0x30));

#[derive(Default)]
struct UsartState {
    ctrla: u8,
    ctrlb: u8,
    ctrlc: u8,
    evctrl: u8,
    baud: u16,
    tx_data: Option<u8>,
    shifter: Option<u8>,
    txcif: bool,
    rx_fifo: VecDeque<(u8, u8)>,
    line: Vec<u8>,
    stalled: bool,
    auto_tick: bool,
    overruns: usize,
    writes: Vec<(Register, u8)>,
}

impl UsartState {
    fn tick(&mut self) -> Option<u8> {
        if self.stalled {
            return None;
        }
        let out = self.shifter.take();
        if let Some(byte) = out {
            self.line.push(byte);
            if self.ctrla & bits::CTRLA_LBME != 0 && self.ctrlb & bits::CTRLB_RXEN != 0 {
                self.rx_fifo.push_back((0, byte));
            }
        }
        self.shifter = self.tx_data.take();
        if out.is_some() && self.shifter.is_none() {
            self.txcif = true;
        }
        out
    }

    fn status(&self) -> u8 {
        let mut status = 0;
        if !self.rx_fifo.is_empty() {
            status |= bits::STATUS_RXCIF;
        }
        if self.txcif {
            status |= bits::STATUS_TXCIF;
        }
        if self.tx_data.is_none() {
            status |= bits::STATUS_DREIF;
        }
        status
    }
}

/// Simulated USART register block
pub struct SimUsart {
    state: Mutex<UsartState>,
}

impl SimUsart {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(UsartState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, UsartState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Hold the first written byte in the data register until unstalled
    pub fn set_stalled(&self, stalled: bool) {
        let mut s = self.lock();
        s.stalled = stalled;
        if !stalled && s.shifter.is_none() {
            s.shifter = s.tx_data.take();
        }
    }

    /// Advance one frame on every STATUS read
    pub fn set_auto_tick(&self, auto_tick: bool) {
        self.lock().auto_tick = auto_tick;
    }

    /// Advance one frame; returns the byte that left the pin
    pub fn tick(&self) -> Option<u8> {
        self.lock().tick()
    }

    /// Nothing left in the data or shift register
    pub fn is_idle(&self) -> bool {
        let s = self.lock();
        s.tx_data.is_none() && s.shifter.is_none()
    }

    /// A byte arrives on RX
    pub fn receive(&self, byte: u8) {
        self.receive_with_flags(byte, 0);
    }

    /// A byte arrives on RX with RXDATAH error flags
    pub fn receive_with_flags(&self, byte: u8, flags: u8) {
        let mut s = self.lock();
        if s.ctrlb & bits::CTRLB_RXEN != 0 {
            s.rx_fifo.push_back((flags, byte));
        }
    }

    /// Every byte shifted out so far
    pub fn transmitted(&self) -> Vec<u8> {
        self.lock().line.clone()
    }

    /// Register writes in the order they happened
    pub fn register_writes(&self) -> Vec<(Register, u8)> {
        self.lock().writes.clone()
    }

    pub fn clear_register_writes(&self) {
        self.lock().writes.clear();
    }

    /// Bytes written over a full data register
    pub fn overruns(&self) -> usize {
        self.lock().overruns
    }

    pub fn ctrla(&self) -> u8 {
        self.lock().ctrla
    }

    pub fn ctrlb(&self) -> u8 {
        self.lock().ctrlb
    }

    pub fn ctrlc(&self) -> u8 {
        self.lock().ctrlc
    }

    pub fn evctrl(&self) -> u8 {
        self.lock().evctrl
    }

    pub fn status(&self) -> u8 {
        self.lock().status()
    }
}

impl UsartRegisters for SimUsart {
    fn read(&self, reg: Register) -> u8 {
        let mut s = self.lock();
        match reg {
            Register::Status => {
                if s.auto_tick {
                    s.tick();
                }
                s.status()
            }
            Register::RxDataHigh => match s.rx_fifo.front() {
                Some(&(flags, _)) => flags | bits::RXDATAH_RXCIF,
                None => 0,
            },
            Register::RxDataLow => s.rx_fifo.pop_front().map_or(0, |(_, byte)| byte),
            Register::TxDataLow => 0,
            Register::CtrlA => s.ctrla,
            Register::CtrlB => s.ctrlb,
            Register::CtrlC => s.ctrlc,
            Register::EvCtrl => s.evctrl,
        }
    }

    fn write(&self, reg: Register, value: u8) {
        let mut s = self.lock();
        s.writes.push((reg, value));
        match reg {
            Register::Status => {
                if value & bits::STATUS_TXCIF != 0 {
                    s.txcif = false;
                }
            }
            Register::TxDataLow => {
                if s.tx_data.is_some() {
                    s.overruns += 1;
                }
                s.tx_data = Some(value);
                if s.shifter.is_none() && !s.stalled {
                    s.shifter = s.tx_data.take();
                }
            }
            Register::CtrlA => s.ctrla = value,
            Register::CtrlB => {
                // Disabling the receiver flushes its FIFO
                if value & bits::CTRLB_RXEN == 0 {
                    s.rx_fifo.clear();
                }
                s.ctrlb = value;
            }
            Register::CtrlC => s.ctrlc = value,
            Register::EvCtrl => s.evctrl = value,
            Register::RxDataLow | Register::RxDataHigh => {}
        }
    }

    fn write_baud(&self, value: u16) {
        self.lock().baud = value;
    }

    fn baud(&self) -> u16 {
        self.lock().baud
    }
}

/// Simulated pins, routing registers and interrupt state
pub struct SimSystem {
    modes: Mutex<BTreeMap<u8, PinMode>>,
    routes: Mutex<[u8; 2]>,
    blocked: AtomicBool,
}

impl SimSystem {
    pub fn new() -> Self {
        Self {
            modes: Mutex::new(BTreeMap::new()),
            routes: Mutex::new([0; 2]),
            blocked: AtomicBool::new(false),
        }
    }

    /// Last mode set on a pin
    pub fn pin_mode(&self, pin: Pin) -> Option<PinMode> {
        self.modes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&pin.number())
            .copied()
    }

    /// Number of pins whose mode was set
    pub fn configured_pins(&self) -> usize {
        self.modes.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn route(&self, index: u8) -> u8 {
        self.read_route(index)
    }

    pub fn set_route(&self, index: u8, value: u8) {
        self.write_route(index, value);
    }

    /// Pretend interrupts are globally disabled
    pub fn set_interrupts_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }
}

impl PinControl for SimSystem {
    fn set_pin_mode(&self, pin: Pin, mode: PinMode) {
        self.modes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(pin.number(), mode);
    }
}

impl RouteRegisters for SimSystem {
    fn read_route(&self, index: u8) -> u8 {
        self.routes.lock().unwrap_or_else(|e| e.into_inner())[usize::from(index)]
    }

    fn write_route(&self, index: u8, value: u8) {
        self.routes.lock().unwrap_or_else(|e| e.into_inner())[usize::from(index)] = value;
    }
}

impl InterruptState for SimSystem {
    fn interrupts_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }
}

/// Run every interrupt handler whose enable and flag are both set
///
/// Handlers run inside a critical section, as they would with interrupts
/// disabled on entry. Returns true if any handler ran.
pub fn service<P: InterruptHandlers>(sim: &SimUsart, port: &P) -> bool {
    critical_section::with(|_| {
        let ctrla = sim.ctrla();
        let mut ran = false;
        if ctrla & bits::CTRLA_RXCIE != 0 && sim.status() & bits::STATUS_RXCIF != 0 {
            port.on_receive_complete();
            ran = true;
        }
        if ctrla & bits::CTRLA_DREIE != 0 && sim.status() & bits::STATUS_DREIF != 0 {
            port.on_data_register_empty();
            ran = true;
        }
        let ctrla = sim.ctrla();
        if ctrla & bits::CTRLA_TXCIE != 0 && sim.status() & bits::STATUS_TXCIF != 0 {
            port.on_transmit_complete();
            ran = true;
        }
        ran
    })
}

/// Alternate frame ticks and interrupt servicing until the line is quiet
pub fn run_until_idle<P: InterruptHandlers>(sim: &SimUsart, port: &P) {
    for _ in 0..100_000 {
        let ran = service(sim, port);
        let shifted = sim.tick().is_some();
        if !ran && !shifted && sim.is_idle() {
            // One more pass for a TXC raised by the last tick
            service(sim, port);
            return;
        }
    }
    panic!("simulated line never went idle");
}
