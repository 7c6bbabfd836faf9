//! dxserial Hardware Abstraction Layer
//!
//! This crate defines the narrow set of hardware primitives the serial
//! core needs: USART register access, pin direction/pull-up control, the
//! shared pin-routing (PORTMUX) registers, and a query for whether the CPU
//! can currently take interrupts. Chip-specific HALs implement these traits;
//! host tests implement them with simulated hardware.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Sketch / application code              │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  dxserial-core (ports, buffers, decode) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  dxserial-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ dxserial-hal- │       │  simulated    │
//! │    avrdx      │       │  hardware     │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`usart::UsartRegisters`] - USART control, status and data registers
//! - [`gpio::PinControl`] - Pin direction and pull-up
//! - [`portmux::RouteRegisters`] - Peripheral pin routing
//! - [`cpu::InterruptState`] - Global interrupt / ISR context query
//! - [`System`] - Everything a port needs besides its own registers

#![no_std]
#![deny(unsafe_code)]

pub mod cpu;
pub mod gpio;
pub mod portmux;
pub mod usart;

// Re-export key traits at crate root for convenience
pub use cpu::InterruptState;
pub use gpio::{Pin, PinControl, PinMode};
pub use portmux::RouteRegisters;
pub use usart::{Register, UsartRegisters};

/// Chip-wide services shared by every serial port
///
/// Pin control and routing registers are shared between peripherals, so
/// a single `System` value (or a reference to one) is handed to each port.
pub trait System: PinControl + RouteRegisters + InterruptState {}

// Blanket implementation
impl<T: PinControl + RouteRegisters + InterruptState> System for T {}
