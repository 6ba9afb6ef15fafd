//! Shared register block

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use keytone_hal::{Register, SerialHardware};

/// Hardware handle plus the UART base address, behind a critical section
pub struct Registers<H> {
    hw: Mutex<CriticalSectionRawMutex, RefCell<H>>,
    base: u16,
}

impl<H: SerialHardware> Registers<H> {
    pub(crate) fn new(hw: H, base: u16) -> Self {
        Self {
            hw: Mutex::new(RefCell::new(hw)),
            base,
        }
    }

    /// UART base address
    pub fn base(&self) -> u16 {
        self.base
    }

    /// Run `f` with exclusive access to the hardware
    ///
    /// The whole closure runs in one critical section; keep it short and
    /// never call back into this block from inside it.
    pub fn with<R>(&self, f: impl FnOnce(&mut H, u16) -> R) -> R {
        self.hw.lock(|hw| f(&mut hw.borrow_mut(), self.base))
    }

    pub fn read(&self, register: Register) -> u8 {
        self.with(|hw, base| hw.read_register(base, register))
    }

    pub fn write(&self, register: Register, value: u8) {
        self.with(|hw, base| hw.write_register(base, register, value))
    }

    /// Read-modify-write in a single critical section
    pub fn modify(&self, register: Register, f: impl FnOnce(u8) -> u8) {
        self.with(|hw, base| {
            let value = hw.read_register(base, register);
            hw.write_register(base, register, f(value));
        })
    }
}
