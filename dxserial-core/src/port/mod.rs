//! Interrupt-driven serial port
//!
//! A [`SerialPort`] owns one USART register block and two ring buffers.
//! Foreground code produces into the transmit buffer and consumes from the
//! receive buffer; the three interrupt entry points do the opposite:
//!
//! - [`SerialPort::on_receive_complete`] - RXC vector
//! - [`SerialPort::on_data_register_empty`] - DRE vector
//! - [`SerialPort::on_transmit_complete`] - TXC vector (half duplex only)
//!
//! When interrupts cannot run (globally disabled, or the caller is itself
//! an interrupt handler) `write()` and `flush()` run the DRE handler
//! themselves instead of spinning forever.
//!
//! # Example
//!
//! ```ignore
//! static SERIAL0: SerialPort<Usart, DxSystem> =
//!     SerialPort::new(Usart::usart0(), DxSystem::new(), &pins::USART0, PortConfig::new(24_000_000));
//!
//! SERIAL0.begin_with(115_200, ConfigWord::SERIAL_8N1)?;
//! SERIAL0.write_bytes(b"hello\r\n")?;
//! SERIAL0.flush()?;
//! ```

mod io;
mod state;

pub use state::{RxErrorPolicy, TransferState};

use dxserial_hal::usart::bits;
use dxserial_hal::{Register, System, UsartRegisters};
use portable_atomic::{AtomicU8, AtomicUsize, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{baud_setting, decode, BaudSetting, ConfigWord, DecodedConfig, SerialConfig};
use crate::error::SerialError;
use crate::pins::{
    apply_pin_configuration, resolve_mux_from_pins, select_mux, MuxSelection, Pin, PinRole,
    PortPinTable, MUX_NONE,
};
use crate::registry::InterruptHandlers;
use crate::ring_buffer::RingBuffer;
use state::Flags;

/// Default receive buffer size
pub const DEFAULT_RX_CAPACITY: usize = 64;
/// Default transmit buffer size
pub const DEFAULT_TX_CAPACITY: usize = 64;
/// Receive buffer size for parts with less than 1 KiB of SRAM
pub const SMALL_RX_CAPACITY: usize = 16;
/// Transmit buffer size for parts with less than 2 KiB of SRAM
pub const SMALL_TX_CAPACITY: usize = 32;

/// Receive buffer size for a part with `sram` bytes of SRAM
pub const fn rx_capacity_for_sram(sram: usize) -> usize {
    if sram < 1024 {
        SMALL_RX_CAPACITY
    } else {
        DEFAULT_RX_CAPACITY
    }
}

/// Transmit buffer size for a part with `sram` bytes of SRAM
pub const fn tx_capacity_for_sram(sram: usize) -> usize {
    if sram < 2048 {
        SMALL_TX_CAPACITY
    } else {
        DEFAULT_TX_CAPACITY
    }
}

/// Per-port settings fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PortConfig {
    /// Peripheral clock in Hz
    pub cpu_hz: u32,
    /// Handling of receive overflow and parity errors
    pub rx_error_policy: RxErrorPolicy,
}

impl PortConfig {
    pub const fn new(cpu_hz: u32) -> Self {
        Self {
            cpu_hz,
            rx_error_policy: RxErrorPolicy::DropSilently,
        }
    }

    pub const fn with_rx_error_policy(mut self, policy: RxErrorPolicy) -> Self {
        self.rx_error_policy = policy;
        self
    }
}

/// Values that narrow to a single byte for [`SerialPort::write_value`]
pub trait IntoByte {
    /// Low byte of the value
    fn into_byte(self) -> u8;
}

macro_rules! impl_into_byte {
    ($($t:ty),*) => {
        $(
            impl IntoByte for $t {
                #[inline]
                fn into_byte(self) -> u8 {
                    self as u8
                }
            }
        )*
    };
}

impl_into_byte!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, char);

impl IntoByte for bool {
    fn into_byte(self) -> u8 {
        u8::from(self)
    }
}

/// One USART with its buffers and pin binding
pub struct SerialPort<
    U,
    S,
    const RX: usize = DEFAULT_RX_CAPACITY,
    const TX: usize = DEFAULT_TX_CAPACITY,
> {
    usart: U,
    system: S,
    pins: &'static PortPinTable,
    config: PortConfig,
    selection: AtomicU8,
    flags: Flags,
    dropped: AtomicUsize,
    rx: RingBuffer<RX>,
    tx: RingBuffer<TX>,
}

impl<U, S, const RX: usize, const TX: usize> SerialPort<U, S, RX, TX>
where
    U: UsartRegisters,
    S: System,
{
    /// Create a port bound to its table's first pin group
    ///
    /// Nothing touches the hardware until [`begin`](Self::begin).
    pub const fn new(usart: U, system: S, pins: &'static PortPinTable, config: PortConfig) -> Self {
        Self {
            usart,
            system,
            pins,
            config,
            selection: AtomicU8::new(pins.default_selection().index()),
            flags: Flags::new(),
            dropped: AtomicUsize::new(0),
            rx: RingBuffer::new(),
            tx: RingBuffer::new(),
        }
    }

    /// Start the port at `baud` with 8N1 framing
    pub fn begin(&self, baud: u32) -> Result<(), SerialError> {
        self.begin_with(baud, ConfigWord::SERIAL_8N1)
    }

    /// Start the port with a configuration word
    ///
    /// A running port is ended first. On error nothing is changed.
    ///
    /// # Errors
    ///
    /// `Config` for reserved word values, `Baud` for unreachable rates.
    pub fn begin_with(&self, baud: u32, word: ConfigWord) -> Result<(), SerialError> {
        let decoded = decode(word).inspect_err(|_e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("serial: rejected config word {=u16:#06x}: {}", word.bits(), _e);
        })?;
        self.start(baud, &decoded)
    }

    /// Start the port with a typed configuration
    pub fn begin_config(&self, baud: u32, config: &SerialConfig) -> Result<(), SerialError> {
        self.start(baud, &config.registers())
    }

    fn start(&self, baud: u32, decoded: &DecodedConfig) -> Result<(), SerialError> {
        let setting: BaudSetting = baud_setting(self.config.cpu_hz, baud).inspect_err(|_e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("serial: baud {=u32} unreachable: {}", baud, _e);
        })?;

        if self.flags.is_set(Flags::BEGUN) {
            self.end();
        }

        let selection = self.selection();
        critical_section::with(|_| {
            self.usart.write(Register::CtrlB, 0);
            self.usart.write_baud(setting.register);
            self.usart.write(Register::CtrlC, decoded.ctrlc);
            self.usart.write(Register::CtrlA, decoded.ctrla);
            self.usart.write(Register::EvCtrl, decoded.evctrl);
            apply_pin_configuration(self.pins, selection, decoded.pins, &self.system);
            self.usart
                .write(Register::CtrlB, decoded.ctrlb | setting.ctrlb_bits());

            let mut flags = Flags::BEGUN;
            if decoded.is_half_duplex {
                flags |= Flags::HALF_DUPLEX;
            }
            if decoded.wants_receive_interrupt {
                flags |= Flags::RX_INTERRUPT;
            }
            if decoded.ctrlb & bits::CTRLB_TXEN != 0 {
                flags |= Flags::TX_ENABLED;
            }
            self.flags.set_all(flags);
        });

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "serial: begin baud={=u16} clk2x={=bool} pins={}",
            setting.register,
            setting.double_speed,
            selection
        );

        Ok(())
    }

    /// Stop the port
    ///
    /// Waits for pending output, disables the transmitter and receiver,
    /// clears pending flags and throws away unread input. Calling it again
    /// has no further effect.
    pub fn end(&self) {
        self.drain();
        critical_section::with(|_| {
            self.usart
                .clear_bits(Register::CtrlB, bits::CTRLB_RXEN | bits::CTRLB_TXEN);
            self.usart.clear_bits(
                Register::CtrlA,
                bits::CTRLA_RXCIE | bits::CTRLA_DREIE | bits::CTRLA_TXCIE,
            );
            self.usart
                .write(Register::Status, bits::STATUS_TXCIF | bits::STATUS_RXSIF);
            self.rx.discard_unread();
            self.flags.clear_all();
        });
    }

    /// Bytes waiting in the receive buffer
    pub fn available(&self) -> usize {
        self.rx.available()
    }

    /// Bytes that can be written without blocking
    pub fn available_for_write(&self) -> usize {
        critical_section::with(|_| self.tx.available_for_write())
    }

    /// Next received byte, left in the buffer
    pub fn peek(&self) -> Option<u8> {
        self.rx.peek()
    }

    /// Next received byte
    pub fn read(&self) -> Option<u8> {
        self.rx.try_pop()
    }

    /// Queue one byte for transmission
    ///
    /// Goes straight to the data register when nothing is queued and the
    /// register is free. Otherwise waits for buffer space, then arms the DRE
    /// interrupt. In half duplex the receiver is muted until the TXC
    /// interrupt sees the line go idle.
    ///
    /// # Errors
    ///
    /// `NotBegun` before `begin()`, `TxDisabled` on a receive-only port.
    pub fn write(&self, byte: u8) -> Result<(), SerialError> {
        if !self.flags.is_set(Flags::BEGUN) {
            return Err(SerialError::NotBegun);
        }
        if !self.flags.is_set(Flags::TX_ENABLED) {
            return Err(SerialError::TxDisabled);
        }
        self.flags.insert(Flags::WRITTEN);

        let sent = critical_section::with(|_| {
            if self.tx.is_empty() && self.usart.any_set(Register::Status, bits::STATUS_DREIF) {
                self.enter_transmit_mode();
                // TXCIF must be cleared before the new byte is loaded
                self.usart.write(Register::Status, bits::STATUS_TXCIF);
                self.usart.write(Register::TxDataLow, byte);
                true
            } else {
                false
            }
        });
        if sent {
            return Ok(());
        }

        loop {
            let queued = critical_section::with(|_| {
                if !self.tx.try_push(byte) {
                    return false;
                }
                self.enter_transmit_mode();
                self.usart.set_bits(Register::CtrlA, bits::CTRLA_DREIE);
                true
            });
            if queued {
                return Ok(());
            }
            self.poll_data_register_empty();
            core::hint::spin_loop();
        }
    }

    /// Write any integer (or `char`/`bool`) narrowed to its low byte
    pub fn write_value<T: IntoByte>(&self, value: T) -> Result<(), SerialError> {
        self.write(value.into_byte())
    }

    /// Write every byte of a slice
    pub fn write_bytes(&self, bytes: &[u8]) -> Result<usize, SerialError> {
        for &b in bytes {
            self.write(b)?;
        }
        Ok(bytes.len())
    }

    /// Write a string
    pub fn write_str(&self, s: &str) -> Result<usize, SerialError> {
        self.write_bytes(s.as_bytes())
    }

    /// Wait until every written byte has left the TX pin
    ///
    /// # Errors
    ///
    /// `NotBegun` before `begin()`.
    pub fn flush(&self) -> Result<(), SerialError> {
        if !self.flags.is_set(Flags::BEGUN) {
            return Err(SerialError::NotBegun);
        }
        self.drain();
        Ok(())
    }

    fn drain(&self) {
        if !self.flags.is_set(Flags::WRITTEN) {
            return;
        }
        while self.usart.any_set(Register::CtrlA, bits::CTRLA_DREIE)
            || !self.usart.any_set(Register::Status, bits::STATUS_TXCIF)
        {
            self.poll_data_register_empty();
            core::hint::spin_loop();
        }
    }

    /// Run the DRE handler by hand when interrupts cannot
    ///
    /// Does nothing while interrupts are able to run, or while the data
    /// register is still full.
    pub fn poll_data_register_empty(&self) {
        if self.system.interrupts_blocked()
            && self.usart.any_set(Register::Status, bits::STATUS_DREIF)
        {
            self.on_data_register_empty();
        }
    }

    /// Half duplex: mute RX and arm TXC before a byte goes out
    fn enter_transmit_mode(&self) {
        if self.flags.is_set(Flags::HALF_DUPLEX) {
            self.usart.modify(Register::CtrlA, |v| {
                (v & !bits::CTRLA_RXCIE) | bits::CTRLA_TXCIE
            });
        }
    }

    /// RXC interrupt: move one received byte into the buffer
    ///
    /// Bytes flagged with a parity error, and bytes that find the buffer
    /// full, are dropped.
    pub fn on_receive_complete(&self) {
        // RXDATAH must be read before RXDATAL pops the FIFO
        let high = self.usart.read(Register::RxDataHigh);
        let data = self.usart.read(Register::RxDataLow);
        if high & bits::RXDATAH_PERR != 0 || !self.rx.try_push(data) {
            self.record_drop();
        }
    }

    /// DRE interrupt: load the next queued byte
    ///
    /// Disables itself once the buffer is empty.
    pub fn on_data_register_empty(&self) {
        critical_section::with(|_| match self.tx.try_pop() {
            Some(byte) => {
                self.usart.write(Register::Status, bits::STATUS_TXCIF);
                self.usart.write(Register::TxDataLow, byte);
                if self.tx.is_empty() {
                    self.usart.clear_bits(Register::CtrlA, bits::CTRLA_DREIE);
                }
            }
            None => self.usart.clear_bits(Register::CtrlA, bits::CTRLA_DREIE),
        });
    }

    /// TXC interrupt (half duplex): discard our own echo and resume receiving
    ///
    /// TXCIF is left set; `flush()` waits on it.
    pub fn on_transmit_complete(&self) {
        while self.usart.any_set(Register::Status, bits::STATUS_RXCIF) {
            let _ = self.usart.read(Register::RxDataLow);
        }
        let rx_interrupt = if self.flags.is_set(Flags::RX_INTERRUPT) {
            bits::CTRLA_RXCIE
        } else {
            0
        };
        critical_section::with(|_| {
            self.usart
                .modify(Register::CtrlA, |v| (v | rx_interrupt) & !bits::CTRLA_TXCIE);
        });
    }

    fn record_drop(&self) {
        if self.config.rx_error_policy == RxErrorPolicy::DropAndCount {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Received bytes dropped since construction (`DropAndCount` only)
    pub fn dropped_bytes(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Bind to the pin group containing `tx` and `rx`
    ///
    /// `(None, None)` disconnects the port from all pins. Takes effect at
    /// the next `begin()`. On error the current binding is kept.
    pub fn pins(&self, tx: Option<Pin>, rx: Option<Pin>) -> Result<MuxSelection, SerialError> {
        let selection = resolve_mux_from_pins(self.pins, tx, rx).inspect_err(|_e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("serial: no pin group for tx={} rx={}", tx, rx);
        })?;
        self.selection.store(selection.index(), Ordering::Relaxed);
        Ok(selection)
    }

    /// Bind to a pin group by index, or [`MUX_NONE`]
    ///
    /// Takes effect at the next `begin()`. On error the current binding is
    /// kept.
    pub fn swap(&self, index: u8) -> Result<MuxSelection, SerialError> {
        let selection = select_mux(self.pins, index)?;
        self.selection.store(selection.index(), Ordering::Relaxed);
        Ok(selection)
    }

    /// Current pin group
    pub fn selection(&self) -> MuxSelection {
        match self.selection.load(Ordering::Relaxed) {
            MUX_NONE => MuxSelection::Disconnected,
            index => MuxSelection::Group(index),
        }
    }

    /// Pin carrying a signal in the current pin group
    pub fn get_pin(&self, role: PinRole) -> Option<Pin> {
        self.pins
            .group(self.selection())
            .and_then(|group| group.pin(role))
    }

    /// This port's pin-group table
    pub fn pin_table(&self) -> &'static PortPinTable {
        self.pins
    }

    /// Port has been begun and not ended
    pub fn is_usable(&self) -> bool {
        self.flags.is_set(Flags::BEGUN)
    }

    /// Running in single-wire half duplex
    pub fn is_half_duplex(&self) -> bool {
        self.flags.is_set(Flags::HALF_DUPLEX)
    }

    /// Observable transfer state
    pub fn state(&self) -> TransferState {
        if !self.flags.is_set(Flags::BEGUN) {
            TransferState::Disabled
        } else if self.usart.any_set(Register::CtrlA, bits::CTRLA_DREIE)
            || (self.flags.is_set(Flags::WRITTEN)
                && !self.usart.any_set(Register::Status, bits::STATUS_TXCIF))
        {
            TransferState::Transmitting
        } else {
            TransferState::Idle
        }
    }

    /// Register block, for deliberate takeover by user code
    pub fn usart(&self) -> &U {
        &self.usart
    }
}

impl<U, S, const RX: usize, const TX: usize> InterruptHandlers for SerialPort<U, S, RX, TX>
where
    U: UsartRegisters,
    S: System,
{
    fn on_receive_complete(&self) {
        Self::on_receive_complete(self)
    }

    fn on_data_register_empty(&self) {
        Self::on_data_register_empty(self)
    }

    fn on_transmit_complete(&self) {
        Self::on_transmit_complete(self)
    }

    fn available(&self) -> usize {
        Self::available(self)
    }
}
