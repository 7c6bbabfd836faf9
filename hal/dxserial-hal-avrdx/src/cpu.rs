//! CPU status and the critical-section implementation

use dxserial_hal::InterruptState;

use crate::mmio;

/// Status register
pub const SREG: usize = 0x003F;
/// Global interrupt enable bit in SREG
pub const SREG_I: u8 = 0x80;
/// CPUINT.STATUS: nonzero while an interrupt handler is executing
pub const CPUINT_STATUS: usize = 0x0111;

/// True when SREG and CPUINT.STATUS say no interrupt can preempt
pub const fn blocked(sreg: u8, cpuint_status: u8) -> bool {
    sreg & SREG_I == 0 || cpuint_status != 0
}

/// CPU core registers
#[derive(Debug, Clone, Copy, Default)]
pub struct Cpu;

impl Cpu {
    pub const fn new() -> Self {
        Self
    }
}

impl InterruptState for Cpu {
    fn interrupts_blocked(&self) -> bool {
        blocked(mmio::read(SREG), mmio::read(CPUINT_STATUS))
    }
}

#[cfg(all(feature = "critical-section-impl", target_arch = "avr"))]
mod critical {
    use core::sync::atomic::{compiler_fence, Ordering};

    use super::{SREG, SREG_I};
    use crate::mmio;

    struct AvrCriticalSection;
    critical_section::set_impl!(AvrCriticalSection);

    // SAFETY: clearing SREG.I masks every interrupt on a single-core part;
    // release only sets it again if it was set on acquire, so nesting works.
    unsafe impl critical_section::Impl for AvrCriticalSection {
        unsafe fn acquire() -> u8 {
            let sreg = mmio::read(SREG);
            mmio::write(SREG, sreg & !SREG_I);
            // Keep accesses inside the section from moving above the cli
            compiler_fence(Ordering::SeqCst);
            sreg
        }

        unsafe fn release(sreg: u8) {
            compiler_fence(Ordering::SeqCst);
            if sreg & SREG_I != 0 {
                mmio::write(SREG, mmio::read(SREG) | SREG_I);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked() {
        assert!(!blocked(SREG_I, 0));
        assert!(blocked(0, 0));
        // LVL0EX: inside a handler that re-enabled interrupts
        assert!(blocked(SREG_I, 0x01));
        assert!(blocked(0x03, 0));
    }
}
