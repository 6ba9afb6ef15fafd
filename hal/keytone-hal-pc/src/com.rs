//! COM port addresses and presence probe

use keytone_hal::Port;

/// Standard COM1 base address
pub const COM1_BASE: u16 = 0x3F8;

/// Standard COM2 base address
pub const COM2_BASE: u16 = 0x2F8;

/// Patterns written to the scratch register when probing for a UART
pub const SCRATCH_PATTERNS: [u8; 3] = [0x55, 0xAA, 0x00];

/// Standard base address for a port
pub const fn default_base(port: Port) -> u16 {
    match port {
        Port::A => COM1_BASE,
        Port::B => COM2_BASE,
    }
}

/// IRQ line for a port
pub const fn irq_line(port: Port) -> u8 {
    match port {
        Port::A => 4,
        Port::B => 3,
    }
}

/// Scratch-register probe
///
/// A UART is present if every pattern written to the scratch register
/// reads back unchanged and the line status register is not floating
/// (0xFF).
pub fn probe<W, R>(mut write_scratch: W, mut read: R) -> bool
where
    W: FnMut(u8),
    R: FnMut(ProbeRead) -> u8,
{
    for pattern in SCRATCH_PATTERNS {
        write_scratch(pattern);
        if read(ProbeRead::Scratch) != pattern {
            return false;
        }
    }
    read(ProbeRead::LineStatus) != 0xFF
}

/// Registers read during a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeRead {
    Scratch,
    LineStatus,
}
