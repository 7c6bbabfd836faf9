//! USART register access
//!
//! The serial core drives the peripheral through these byte-wide registers.
//! Methods take `&self` because the same register block is touched from
//! foreground code and from interrupt handlers; implementations are expected
//! to use volatile accesses (or interior mutability when simulated).

/// Registers of one USART instance used by the serial core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// Received data, low byte. Reading pops the receive FIFO.
    RxDataLow,
    /// Received data, high byte and per-byte error flags
    RxDataHigh,
    /// Transmit data, low byte
    TxDataLow,
    /// Interrupt flags (write one to clear)
    Status,
    /// Interrupt enables, loopback and RS-485
    CtrlA,
    /// Transmitter/receiver enable, open-drain, receiver mode
    CtrlB,
    /// Frame format and communication mode
    CtrlC,
    /// Event input control
    EvCtrl,
}

/// Register bit definitions (AVR Dx USART)
pub mod bits {
    // STATUS
    /// Receive complete
    pub const STATUS_RXCIF: u8 = 0x80;
    /// Transmit complete
    pub const STATUS_TXCIF: u8 = 0x40;
    /// Transmit data register empty
    pub const STATUS_DREIF: u8 = 0x20;
    /// Receive start
    pub const STATUS_RXSIF: u8 = 0x10;
    /// Inconsistent sync field
    pub const STATUS_ISFIF: u8 = 0x08;
    /// Break detected
    pub const STATUS_BDF: u8 = 0x02;

    // CTRLA
    /// Receive complete interrupt enable
    pub const CTRLA_RXCIE: u8 = 0x80;
    /// Transmit complete interrupt enable
    pub const CTRLA_TXCIE: u8 = 0x40;
    /// Data register empty interrupt enable
    pub const CTRLA_DREIE: u8 = 0x20;
    /// Receive start interrupt enable
    pub const CTRLA_RXSIE: u8 = 0x10;
    /// Loopback mode enable
    pub const CTRLA_LBME: u8 = 0x08;
    /// Auto-baud error interrupt enable
    pub const CTRLA_ABEIE: u8 = 0x04;
    /// RS-485 mode: XDIR driven high while transmitting
    pub const CTRLA_RS485: u8 = 0x01;

    // CTRLB
    /// Receiver enable
    pub const CTRLB_RXEN: u8 = 0x80;
    /// Transmitter enable
    pub const CTRLB_TXEN: u8 = 0x40;
    /// Start-of-frame detection enable
    pub const CTRLB_SFDEN: u8 = 0x10;
    /// Open-drain mode enable
    pub const CTRLB_ODME: u8 = 0x08;
    /// Receiver mode field
    pub const CTRLB_RXMODE_GM: u8 = 0x06;
    /// Receiver mode: double-speed
    pub const CTRLB_RXMODE_CLK2X: u8 = 0x02;
    /// Multi-processor communication mode
    pub const CTRLB_MPCM: u8 = 0x01;

    // CTRLC
    /// Character size field
    pub const CTRLC_CHSIZE_GM: u8 = 0x07;
    /// Stop bit mode (set = two stop bits)
    pub const CTRLC_SBMODE: u8 = 0x08;
    /// Parity mode field
    pub const CTRLC_PMODE_GM: u8 = 0x30;
    /// Communication mode field
    pub const CTRLC_CMODE_GM: u8 = 0xC0;

    // RXDATAH
    /// Receive complete (mirrors STATUS)
    pub const RXDATAH_RXCIF: u8 = 0x80;
    /// Receive buffer overflow
    pub const RXDATAH_BUFOVF: u8 = 0x40;
    /// Frame error
    pub const RXDATAH_FERR: u8 = 0x04;
    /// Parity error
    pub const RXDATAH_PERR: u8 = 0x02;
    /// Ninth data bit
    pub const RXDATAH_DATA8: u8 = 0x01;

    // EVCTRL
    /// IrDA event input enable
    pub const EVCTRL_IREI: u8 = 0x01;
}

/// Byte-wide access to one USART register block
pub trait UsartRegisters {
    /// Read a register
    fn read(&self, reg: Register) -> u8;

    /// Write a register
    fn write(&self, reg: Register, value: u8);

    /// Write the 16-bit baud register
    fn write_baud(&self, value: u16);

    /// Read back the 16-bit baud register
    fn baud(&self) -> u16;

    /// Read-modify-write a register
    ///
    /// Not atomic; callers sharing the register with an interrupt handler
    /// must hold a critical section.
    fn modify(&self, reg: Register, f: impl FnOnce(u8) -> u8) {
        let value = self.read(reg);
        self.write(reg, f(value));
    }

    /// Set bits in a register
    fn set_bits(&self, reg: Register, mask: u8) {
        self.modify(reg, |v| v | mask);
    }

    /// Clear bits in a register
    fn clear_bits(&self, reg: Register, mask: u8) {
        self.modify(reg, |v| v & !mask);
    }

    /// Check whether any of `mask` is set in a register
    fn any_set(&self, reg: Register, mask: u8) -> bool {
        self.read(reg) & mask != 0
    }
}

impl<T: UsartRegisters + ?Sized> UsartRegisters for &T {
    fn read(&self, reg: Register) -> u8 {
        T::read(self, reg)
    }

    fn write(&self, reg: Register, value: u8) {
        T::write(self, reg, value)
    }

    fn write_baud(&self, value: u16) {
        T::write_baud(self, value)
    }

    fn baud(&self) -> u16 {
        T::baud(self)
    }
}
