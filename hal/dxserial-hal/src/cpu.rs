//! CPU interrupt state
//!
//! Disabling and restoring interrupts is done through the
//! `critical-section` crate; this trait only answers whether interrupt
//! handlers can run right now.

/// Query for interrupt availability
pub trait InterruptState {
    /// True when an interrupt handler cannot preempt the caller
    ///
    /// That is the case when global interrupts are disabled or the CPU is
    /// already executing an interrupt handler. Code that would otherwise
    /// wait for an interrupt must do the handler's work itself.
    fn interrupts_blocked(&self) -> bool;
}

impl<T: InterruptState + ?Sized> InterruptState for &T {
    fn interrupts_blocked(&self) -> bool {
        T::interrupts_blocked(self)
    }
}
