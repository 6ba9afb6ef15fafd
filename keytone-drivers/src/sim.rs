//! Simulated 16550 UART
//!
//! A register-level model of one UART wired to the tone board, for host
//! tests. The test side injects received bytes and drives the modem status
//! lines; the driver side sees an ordinary [`SerialHardware`].

use heapless::{Deque, Vec};
use keytone_hal::{bits, Port, Register, SerialHardware};

/// Base address reported for COM1
pub const SIM_COM1_BASE: u16 = 0x3F8;

/// Base address reported for COM2
pub const SIM_COM2_BASE: u16 = 0x2F8;

const RX_FIFO: usize = 64;
const SENT_LOG: usize = 256;
const WRITE_LOG: usize = 64;

/// LSR: transmitter empty (holding and shift register)
const LSR_TEMT: u8 = 0x40;

/// IIR: no interrupt pending
const IIR_NONE: u8 = 0x01;

/// Simulated UART plus interrupt controller
#[derive(Debug, Clone)]
pub struct SimulatedUart {
    present: [bool; 2],
    irq_masked: [bool; 2],
    divisor_low: u8,
    divisor_high: u8,
    interrupt_enable: u8,
    line_control: u8,
    modem_control: u8,
    scratch: u8,
    rx: Deque<u8, RX_FIFO>,
    sent: Vec<u8, SENT_LOG>,
    writes: Vec<(Register, u8), WRITE_LOG>,
    cts: bool,
    dsr: bool,
    thr_ready: bool,
    overrun: bool,
    eoi_count: usize,
    accesses: usize,
}

impl Default for SimulatedUart {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedUart {
    /// Both ports present, board ready to receive, all IRQs masked
    pub fn new() -> Self {
        Self {
            present: [true; 2],
            irq_masked: [true; 2],
            divisor_low: 0,
            divisor_high: 0,
            interrupt_enable: 0,
            line_control: 0,
            modem_control: 0,
            scratch: 0,
            rx: Deque::new(),
            sent: Vec::new(),
            writes: Vec::new(),
            cts: true,
            dsr: true,
            thr_ready: true,
            overrun: false,
            eoi_count: 0,
            accesses: 0,
        }
    }

    /// Mark a port as having no UART behind it
    pub fn without_port(mut self, port: Port) -> Self {
        self.present[Self::index(port)] = false;
        self
    }

    /// Queue a byte as if it had arrived on the wire
    ///
    /// When the receive FIFO is full the byte is lost and the overrun bit
    /// is latched. Returns `false` in that case.
    pub fn inject(&mut self, byte: u8) -> bool {
        if self.rx.push_back(byte).is_err() {
            self.overrun = true;
            return false;
        }
        true
    }

    /// Drive the remote end's clear-to-send line
    pub fn set_cts(&mut self, asserted: bool) {
        self.cts = asserted;
    }

    /// Drive the remote end's data-set-ready line
    pub fn set_dsr(&mut self, asserted: bool) {
        self.dsr = asserted;
    }

    /// Hold the transmit holding register busy (`false`) or empty
    pub fn set_thr_ready(&mut self, ready: bool) {
        self.thr_ready = ready;
    }

    /// Bytes written to the transmit holding register, oldest first
    pub fn sent(&self) -> &[u8] {
        &self.sent
    }

    /// Every register write, in order
    pub fn writes(&self) -> &[(Register, u8)] {
        &self.writes
    }

    pub fn clear_logs(&mut self) {
        self.sent.clear();
        self.writes.clear();
    }

    /// Bytes still waiting in the receive FIFO
    pub fn pending_rx(&self) -> usize {
        self.rx.len()
    }

    /// Programmed baud divisor
    pub fn divisor(&self) -> u16 {
        u16::from_le_bytes([self.divisor_low, self.divisor_high])
    }

    pub fn line_control(&self) -> u8 {
        self.line_control
    }

    pub fn modem_control(&self) -> u8 {
        self.modem_control
    }

    pub fn interrupt_enable(&self) -> u8 {
        self.interrupt_enable
    }

    pub fn irq_masked(&self, port: Port) -> bool {
        self.irq_masked[Self::index(port)]
    }

    /// End-of-interrupt acknowledgements seen
    pub fn eoi_count(&self) -> usize {
        self.eoi_count
    }

    /// Calls made through [`SerialHardware`], of any kind
    pub fn accesses(&self) -> usize {
        self.accesses
    }

    fn index(port: Port) -> usize {
        match port {
            Port::A => 0,
            Port::B => 1,
        }
    }

    fn dlab(&self) -> bool {
        self.line_control & bits::LCR_DLAB != 0
    }

    fn interrupt_id(&self) -> u8 {
        if self.interrupt_enable & bits::IER_RX_DATA != 0 && !self.rx.is_empty() {
            bits::IIR_RX_DATA
        } else {
            IIR_NONE
        }
    }

    fn line_status(&mut self) -> u8 {
        let mut lsr = 0;
        if !self.rx.is_empty() {
            lsr |= bits::LSR_DATA_READY;
        }
        if core::mem::take(&mut self.overrun) {
            lsr |= bits::LSR_OVERRUN;
        }
        if self.thr_ready {
            lsr |= bits::LSR_THRE | LSR_TEMT;
        }
        lsr
    }

    fn modem_status(&self) -> u8 {
        let mut msr = 0;
        if self.cts {
            msr |= bits::MSR_CTS;
        }
        if self.dsr {
            msr |= bits::MSR_DSR;
        }
        msr
    }
}

impl SerialHardware for SimulatedUart {
    fn base_address(&mut self, port: Port) -> Option<u16> {
        self.accesses += 1;
        if !self.present[Self::index(port)] {
            return None;
        }
        Some(match port {
            Port::A => SIM_COM1_BASE,
            Port::B => SIM_COM2_BASE,
        })
    }

    fn read_register(&mut self, _base: u16, register: Register) -> u8 {
        self.accesses += 1;
        match register {
            Register::Data if self.dlab() => self.divisor_low,
            Register::Data => self.rx.pop_front().unwrap_or(0),
            Register::InterruptEnable if self.dlab() => self.divisor_high,
            Register::InterruptEnable => self.interrupt_enable,
            Register::InterruptId => self.interrupt_id(),
            Register::LineControl => self.line_control,
            Register::ModemControl => self.modem_control,
            Register::LineStatus => self.line_status(),
            Register::ModemStatus => self.modem_status(),
            Register::Scratch => self.scratch,
        }
    }

    fn write_register(&mut self, _base: u16, register: Register, value: u8) {
        self.accesses += 1;
        // Logs are bounded; a long test just stops recording
        let _ = self.writes.push((register, value));
        match register {
            Register::Data if self.dlab() => self.divisor_low = value,
            Register::Data => {
                let _ = self.sent.push(value);
            }
            Register::InterruptEnable if self.dlab() => self.divisor_high = value,
            Register::InterruptEnable => self.interrupt_enable = value,
            Register::LineControl => self.line_control = value,
            Register::ModemControl => self.modem_control = value,
            Register::Scratch => self.scratch = value,
            Register::InterruptId | Register::LineStatus | Register::ModemStatus => {}
        }
    }

    fn set_irq_masked(&mut self, port: Port, masked: bool) {
        self.accesses += 1;
        self.irq_masked[Self::index(port)] = masked;
    }

    fn end_of_interrupt(&mut self) {
        self.accesses += 1;
        self.eoi_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rx_fifo_and_interrupt_id() {
        let mut sim = SimulatedUart::new();
        let base = sim.base_address(Port::A).unwrap();
        assert_eq!(sim.read_register(base, Register::InterruptId), IIR_NONE);

        sim.inject(0x42);
        // Receive interrupt not enabled yet
        assert_eq!(sim.read_register(base, Register::InterruptId), IIR_NONE);
        sim.write_register(base, Register::InterruptEnable, bits::IER_RX_DATA);
        assert_eq!(sim.read_register(base, Register::InterruptId), bits::IIR_RX_DATA);
        assert_eq!(sim.read_register(base, Register::Data), 0x42);
        assert_eq!(sim.read_register(base, Register::InterruptId), IIR_NONE);
    }

    #[test]
    fn test_dlab_redirects_divisor() {
        let mut sim = SimulatedUart::new();
        sim.write_register(0, Register::LineControl, bits::LCR_DLAB);
        sim.write_register(0, Register::DIVISOR_LOW, 0x80);
        sim.write_register(0, Register::DIVISOR_HIGH, 0x01);
        sim.write_register(0, Register::LineControl, 0x03);
        assert_eq!(sim.divisor(), 0x180);
        assert!(sim.sent().is_empty());

        sim.write_register(0, Register::Data, 0x07);
        assert_eq!(sim.sent(), &[0x07]);
    }

    #[test]
    fn test_missing_port() {
        let mut sim = SimulatedUart::new().without_port(Port::B);
        assert_eq!(sim.base_address(Port::A), Some(SIM_COM1_BASE));
        assert_eq!(sim.base_address(Port::B), None);
        assert_eq!(sim.accesses(), 2);
    }

    #[test]
    fn test_status_lines() {
        let mut sim = SimulatedUart::new();
        assert_eq!(sim.read_register(0, Register::ModemStatus), 0x30);
        sim.set_cts(false);
        assert_eq!(sim.read_register(0, Register::ModemStatus), 0x20);

        sim.set_thr_ready(false);
        assert_eq!(sim.read_register(0, Register::LineStatus), 0x00);
        sim.set_thr_ready(true);
        assert_eq!(sim.read_register(0, Register::LineStatus), 0x60);
    }

    #[test]
    fn test_overrun_latched_until_read() {
        let mut sim = SimulatedUart::new();
        for i in 0..RX_FIFO {
            assert!(sim.inject(i as u8));
        }
        assert!(!sim.inject(0xFF));
        let lsr = sim.read_register(0, Register::LineStatus);
        assert_ne!(lsr & bits::LSR_OVERRUN, 0);
        let lsr = sim.read_register(0, Register::LineStatus);
        assert_eq!(lsr & bits::LSR_OVERRUN, 0);
        assert_eq!(sim.pending_rx(), RX_FIFO);
    }
}
