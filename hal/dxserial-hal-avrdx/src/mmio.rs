//! Volatile access to the data address space
//!
//! Every peripheral register on AVR Dx, including SREG, is mapped into the
//! data space below 0x1000. The register modules compute addresses from the
//! datasheet layout and only ever pass those.

#[inline(always)]
pub(crate) fn read(addr: usize) -> u8 {
    // SAFETY: `addr` is a byte-wide peripheral register address from the
    // register modules; those are always mapped and side-effect free to
    // read, except data registers whose pop-on-read is intended.
    unsafe { core::ptr::read_volatile(addr as *const u8) }
}

#[inline(always)]
pub(crate) fn write(addr: usize, value: u8) {
    // SAFETY: as for `read`; peripheral registers accept any byte value.
    unsafe { core::ptr::write_volatile(addr as *mut u8, value) }
}
