//! Master 8259 PIC access

use keytone_hal::Port;

use crate::com::irq_line;

/// Master PIC command port (ICR)
pub const PIC1_COMMAND: u16 = 0x20;

/// Master PIC data port (IMR)
pub const PIC1_DATA: u16 = 0x21;

/// Non-specific end of interrupt
pub const PIC_EOI: u8 = 0x20;

/// IMR bit for a port's IRQ line
pub const fn irq_mask_bit(port: Port) -> u8 {
    1 << irq_line(port)
}

/// New IMR value with `port`'s line masked or unmasked
///
/// Only the port's own bit changes; other devices keep their mask.
pub const fn update_mask(imr: u8, port: Port, masked: bool) -> u8 {
    if masked {
        imr | irq_mask_bit(port)
    } else {
        imr & !irq_mask_bit(port)
    }
}
