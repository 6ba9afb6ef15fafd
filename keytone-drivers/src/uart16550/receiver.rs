//! Receive interrupt handler

use keytone_core::{ErrorKind, ErrorState, RingBuffer};
use keytone_hal::{bits, Register, SerialHardware};

use super::registers::Registers;

/// What one handler invocation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxEvent {
    /// Byte stored in the ring buffer
    Received(u8),
    /// Byte read but the buffer was full; it is lost
    Overflow(u8),
    /// Interrupt was not a receive-data interrupt
    Spurious,
}

/// Receive interrupt handler body
///
/// Platform interrupt glue calls [`Receiver::on_byte_available`] each time
/// the UART raises its IRQ line. It never waits and never allocates.
pub struct Receiver<'a, H, const N: usize> {
    regs: &'a Registers<H>,
    buffer: &'a RingBuffer<N>,
    errors: &'a ErrorState,
}

impl<'a, H: SerialHardware, const N: usize> Receiver<'a, H, N> {
    pub(crate) fn new(
        regs: &'a Registers<H>,
        buffer: &'a RingBuffer<N>,
        errors: &'a ErrorState,
    ) -> Self {
        Self {
            regs,
            buffer,
            errors,
        }
    }

    /// Service one receive interrupt
    ///
    /// Reads IIR; on a receive-data interrupt reads exactly one byte and
    /// queues it, raising `BufferOverflow` if the queue is full. The
    /// interrupt controller is acknowledged in every case.
    pub fn on_byte_available(&self) -> RxEvent {
        self.regs.with(|hw, base| {
            let iir = hw.read_register(base, Register::InterruptId);
            let event = if iir & bits::IIR_ID_MASK == bits::IIR_RX_DATA {
                let byte = hw.read_register(base, Register::Data);
                match self.buffer.push(byte) {
                    Ok(()) => {
                        trace!("rx {}", byte);
                        RxEvent::Received(byte)
                    }
                    Err(_) => {
                        self.errors.raise(ErrorKind::BufferOverflow);
                        warn!("rx buffer full, lost {}", byte);
                        RxEvent::Overflow(byte)
                    }
                }
            } else {
                RxEvent::Spurious
            };
            hw.end_of_interrupt();
            event
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedUart;
    use crate::uart16550::SerialLine;
    use keytone_hal::LineConfig;

    #[test]
    fn test_byte_lands_in_buffer() {
        let mut sim = SimulatedUart::new();
        let buffer = RingBuffer::<16>::new();
        let errors = ErrorState::new();
        let line = SerialLine::open(&mut sim, LineConfig::default()).unwrap();
        let rx = line.receiver(&buffer, &errors);

        line.registers().with(|hw, _| hw.inject(0x55));
        assert_eq!(rx.on_byte_available(), RxEvent::Received(0x55));
        assert_eq!(buffer.pop(), Some(0x55));
        assert_eq!(errors.current(), None);
        assert_eq!(line.registers().with(|hw, _| hw.eoi_count()), 1);
    }

    #[test]
    fn test_one_byte_per_interrupt() {
        let mut sim = SimulatedUart::new();
        let buffer = RingBuffer::<16>::new();
        let errors = ErrorState::new();
        let line = SerialLine::open(&mut sim, LineConfig::default()).unwrap();
        let rx = line.receiver(&buffer, &errors);

        line.registers().with(|hw, _| {
            hw.inject(0x01);
            hw.inject(0x02);
        });
        rx.on_byte_available();
        assert_eq!(buffer.len(), 1);
        rx.on_byte_available();
        assert_eq!(buffer.pop(), Some(0x01));
        assert_eq!(buffer.pop(), Some(0x02));
    }

    #[test]
    fn test_spurious_still_acknowledged() {
        let mut sim = SimulatedUart::new();
        let buffer = RingBuffer::<16>::new();
        let errors = ErrorState::new();
        let line = SerialLine::open(&mut sim, LineConfig::default()).unwrap();
        let rx = line.receiver(&buffer, &errors);

        assert_eq!(rx.on_byte_available(), RxEvent::Spurious);
        assert!(buffer.is_empty());
        assert_eq!(line.registers().with(|hw, _| hw.eoi_count()), 1);
    }

    #[test]
    fn test_overflow_raises_error() {
        let mut sim = SimulatedUart::new();
        let buffer = RingBuffer::<4>::new();
        let errors = ErrorState::new();
        let line = SerialLine::open(&mut sim, LineConfig::default()).unwrap();
        let rx = line.receiver(&buffer, &errors);

        for byte in 1..=4 {
            line.registers().with(|hw, _| hw.inject(byte));
            rx.on_byte_available();
        }
        assert!(buffer.overflowed());
        assert_eq!(errors.current(), Some(ErrorKind::BufferOverflow));

        line.registers().with(|hw, _| hw.inject(9));
        assert_eq!(rx.on_byte_available(), RxEvent::Overflow(9));
        assert_eq!(buffer.pop(), Some(1));
        assert_eq!(buffer.pop(), Some(2));
        assert_eq!(buffer.pop(), Some(3));
        assert_eq!(buffer.pop(), None);
    }
}
