//! Port-I/O implementation of [`SerialHardware`]

use keytone_hal::{Port, Register, SerialHardware};
use x86_64::instructions::port::Port as IoPort;

use crate::com::{default_base, probe, ProbeRead};
use crate::pic::{update_mask, PIC1_COMMAND, PIC1_DATA, PIC_EOI};

/// UART and PIC access through x86 `in`/`out` instructions
///
/// Holds no state of its own: every call goes straight to the port.
#[derive(Debug, Default)]
pub struct PortIoBackend {
    _private: (),
}

impl PortIoBackend {
    /// Create the backend
    ///
    /// # Safety
    ///
    /// The caller must hold I/O privilege for the COM and PIC port ranges,
    /// and no other code may drive the same UART or the master PIC mask
    /// concurrently.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }

    fn read_port(address: u16) -> u8 {
        let mut port: IoPort<u8> = IoPort::new(address);
        // SAFETY: I/O privilege and exclusive access are guaranteed by the
        // contract of `PortIoBackend::new`
        unsafe { port.read() }
    }

    fn write_port(address: u16, value: u8) {
        let mut port: IoPort<u8> = IoPort::new(address);
        // SAFETY: see `read_port`
        unsafe { port.write(value) }
    }
}

impl SerialHardware for PortIoBackend {
    fn base_address(&mut self, port: Port) -> Option<u16> {
        let base = default_base(port);
        let present = probe(
            |value| Self::write_port(base + Register::Scratch.offset(), value),
            |reg| match reg {
                ProbeRead::Scratch => Self::read_port(base + Register::Scratch.offset()),
                ProbeRead::LineStatus => Self::read_port(base + Register::LineStatus.offset()),
            },
        );
        present.then_some(base)
    }

    #[inline]
    fn read_register(&mut self, base: u16, register: Register) -> u8 {
        Self::read_port(base + register.offset())
    }

    #[inline]
    fn write_register(&mut self, base: u16, register: Register, value: u8) {
        Self::write_port(base + register.offset(), value)
    }

    fn set_irq_masked(&mut self, port: Port, masked: bool) {
        let imr = Self::read_port(PIC1_DATA);
        Self::write_port(PIC1_DATA, update_mask(imr, port, masked));
    }

    #[inline]
    fn end_of_interrupt(&mut self) {
        Self::write_port(PIC1_COMMAND, PIC_EOI);
    }
}
