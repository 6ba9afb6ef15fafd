//! 16550 register access
//!
//! Register map, bit masks and the [`SerialHardware`] trait through which
//! the driver reaches the UART and the interrupt controller.

use crate::uart::Port;

/// UART registers, by offset from the port base address
///
/// Offsets 0 and 1 are shared: with DLAB set in the line control register
/// they address the divisor latch instead of data / interrupt enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    /// RBR on read, THR on write; divisor low byte (DLL) under DLAB
    Data,
    /// IER; divisor high byte (DLH) under DLAB
    InterruptEnable,
    /// IIR
    InterruptId,
    /// LCR
    LineControl,
    /// MCR
    ModemControl,
    /// LSR
    LineStatus,
    /// MSR
    ModemStatus,
    /// SCR
    Scratch,
}

impl Register {
    /// Divisor latch low byte (DLAB set)
    pub const DIVISOR_LOW: Register = Register::Data;
    /// Divisor latch high byte (DLAB set)
    pub const DIVISOR_HIGH: Register = Register::InterruptEnable;

    /// Offset from the port base address
    pub const fn offset(self) -> u16 {
        match self {
            Register::Data => 0,
            Register::InterruptEnable => 1,
            Register::InterruptId => 2,
            Register::LineControl => 3,
            Register::ModemControl => 4,
            Register::LineStatus => 5,
            Register::ModemStatus => 6,
            Register::Scratch => 7,
        }
    }
}

/// Register bit masks
pub mod bits {
    /// IER: receive data available interrupt
    pub const IER_RX_DATA: u8 = 0x01;

    /// IIR: interrupt identification field
    pub const IIR_ID_MASK: u8 = 0x07;
    /// IIR: receive data available
    pub const IIR_RX_DATA: u8 = 0x04;

    /// LCR: divisor latch access bit
    pub const LCR_DLAB: u8 = 0x80;

    /// MCR: data terminal ready
    pub const MCR_DTR: u8 = 0x01;
    /// MCR: request to send
    pub const MCR_RTS: u8 = 0x02;
    /// MCR: OUT2, gates the UART interrupt line onto the bus
    pub const MCR_OUT2: u8 = 0x08;
    /// MCR: both handshake lines
    pub const MCR_HANDSHAKE: u8 = MCR_DTR | MCR_RTS;

    /// LSR: receive data ready
    pub const LSR_DATA_READY: u8 = 0x01;
    /// LSR: overrun error
    pub const LSR_OVERRUN: u8 = 0x02;
    /// LSR: transmit holding register empty
    pub const LSR_THRE: u8 = 0x20;

    /// MSR: clear to send
    pub const MSR_CTS: u8 = 0x10;
    /// MSR: data set ready
    pub const MSR_DSR: u8 = 0x20;
    /// MSR: ring indicator
    pub const MSR_RI: u8 = 0x40;
    /// MSR: data carrier detect
    pub const MSR_DCD: u8 = 0x80;
}

/// Decoded modem status register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModemStatus(pub u8);

impl ModemStatus {
    /// Remote end is ready to accept data
    pub fn clear_to_send(self) -> bool {
        self.0 & bits::MSR_CTS != 0
    }

    pub fn data_set_ready(self) -> bool {
        self.0 & bits::MSR_DSR != 0
    }

    pub fn ring_indicator(self) -> bool {
        self.0 & bits::MSR_RI != 0
    }

    pub fn carrier_detect(self) -> bool {
        self.0 & bits::MSR_DCD != 0
    }
}

/// Register-level access to a UART and its interrupt controller line
///
/// Implementations perform single register reads and writes only; the
/// driver decides ordering and wraps each access in a critical section
/// shared with the receive interrupt handler. The receive side of the
/// capability is the driver's `Receiver::on_byte_available`, which the
/// platform's interrupt glue invokes whenever the UART raises its IRQ.
pub trait SerialHardware {
    /// Resolve the I/O base address of `port`
    ///
    /// Returns `None` if no UART is present there.
    fn base_address(&mut self, port: Port) -> Option<u16>;

    /// Read one UART register
    fn read_register(&mut self, base: u16, register: Register) -> u8;

    /// Write one UART register
    fn write_register(&mut self, base: u16, register: Register, value: u8);

    /// Mask or unmask the port's IRQ line at the interrupt controller
    fn set_irq_masked(&mut self, port: Port, masked: bool);

    /// Signal end of interrupt to the interrupt controller
    fn end_of_interrupt(&mut self);
}

impl<T: SerialHardware + ?Sized> SerialHardware for &mut T {
    fn base_address(&mut self, port: Port) -> Option<u16> {
        (**self).base_address(port)
    }

    fn read_register(&mut self, base: u16, register: Register) -> u8 {
        (**self).read_register(base, register)
    }

    fn write_register(&mut self, base: u16, register: Register, value: u8) {
        (**self).write_register(base, register, value)
    }

    fn set_irq_masked(&mut self, port: Port, masked: bool) {
        (**self).set_irq_masked(port, masked)
    }

    fn end_of_interrupt(&mut self) {
        (**self).end_of_interrupt()
    }
}
