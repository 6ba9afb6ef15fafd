//! Serial line lifecycle

use core::fmt;

use keytone_core::{ErrorKind, ErrorState, RingBuffer};
use keytone_hal::{bits, ConfigError, LineConfig, ModemStatus, Port, Register, SerialHardware};

use super::receiver::Receiver;
use super::registers::Registers;
use super::transmitter::{Transmitter, TxTiming};

/// Errors from [`SerialLine::open`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OpenError {
    /// Line parameters rejected; the hardware was not touched
    Invalid(ConfigError),
    /// No UART answers at the port's address
    PortNotPresent(Port),
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenError::Invalid(e) => write!(f, "invalid line configuration: {e}"),
            OpenError::PortNotPresent(port) => {
                write!(f, "no UART present on COM{}", port.number())
            }
        }
    }
}

impl From<ConfigError> for OpenError {
    fn from(e: ConfigError) -> Self {
        OpenError::Invalid(e)
    }
}

impl From<OpenError> for ErrorKind {
    fn from(_: OpenError) -> Self {
        ErrorKind::InvalidConfig
    }
}

/// An open 16550 line
///
/// Owns the hardware handle for its whole life. Opening programs the baud
/// divisor and frame format, enables the receive interrupt and asserts the
/// handshake; closing undoes all of it. Dropping an open line closes it.
pub struct SerialLine<H: SerialHardware> {
    regs: Registers<H>,
    config: LineConfig,
    open: bool,
}

impl<H: SerialHardware> SerialLine<H> {
    /// Validate `config` and bring the line up
    ///
    /// Every parameter is checked before the first hardware access.
    pub fn open(mut hw: H, config: LineConfig) -> Result<Self, OpenError> {
        let divisor = config.divisor()?;
        let line_control = config.line_control();

        let base = hw
            .base_address(config.port)
            .ok_or(OpenError::PortNotPresent(config.port))?;
        let regs = Registers::new(hw, base);

        // Divisor latch and frame format in one go; the final LCR write
        // clears DLAB again
        let [divisor_low, divisor_high] = divisor.to_le_bytes();
        regs.with(|hw, base| {
            hw.write_register(base, Register::LineControl, bits::LCR_DLAB);
            hw.write_register(base, Register::DIVISOR_LOW, divisor_low);
            hw.write_register(base, Register::DIVISOR_HIGH, divisor_high);
            hw.write_register(base, Register::LineControl, line_control);
        });
        debug!("divisor {} lcr {}", divisor, line_control);

        regs.with(|hw, base| {
            hw.write_register(base, Register::InterruptEnable, bits::IER_RX_DATA);
            hw.write_register(base, Register::ModemControl, bits::MCR_OUT2);
            hw.set_irq_masked(config.port, false);
        });

        let line = Self {
            regs,
            config,
            open: true,
        };
        line.assert_handshake();

        info!(
            "COM{} open at {} baud, base {}",
            config.port.number(),
            config.baud_rate,
            base
        );
        Ok(line)
    }

    /// Raise DTR and RTS
    pub fn assert_handshake(&self) {
        self.regs
            .modify(Register::ModemControl, |mcr| mcr | bits::MCR_HANDSHAKE);
    }

    /// Lower DTR and RTS
    pub fn deassert_handshake(&self) {
        self.regs
            .modify(Register::ModemControl, |mcr| mcr & !bits::MCR_HANDSHAKE);
    }

    /// Disable the receive interrupt without closing the line
    ///
    /// The handshake stays asserted. Used when the user breaks out of a
    /// session but the program keeps running.
    pub fn suspend_interrupts(&self) {
        self.regs.with(|hw, base| {
            hw.write_register(base, Register::InterruptEnable, 0);
            hw.set_irq_masked(self.config.port, true);
        });
        debug!("COM{} interrupts suspended", self.config.port.number());
    }

    /// Disable interrupts, drop the handshake and mask the IRQ line
    ///
    /// Calling it on a closed line does nothing.
    pub fn close(&mut self) {
        if !self.open {
            return;
        }
        self.regs.with(|hw, base| {
            hw.write_register(base, Register::InterruptEnable, 0);
            hw.write_register(base, Register::ModemControl, 0);
            hw.set_irq_masked(self.config.port, true);
        });
        self.open = false;
        info!("COM{} closed", self.config.port.number());
    }

    pub fn config(&self) -> &LineConfig {
        &self.config
    }

    pub fn base_address(&self) -> u16 {
        self.regs.base()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Snapshot of CTS/DSR/RI/DCD
    pub fn modem_status(&self) -> ModemStatus {
        ModemStatus(self.regs.read(Register::ModemStatus))
    }

    /// Raw line status register
    pub fn line_status(&self) -> u8 {
        self.regs.read(Register::LineStatus)
    }

    /// Register block shared with the transmitter and receive handler
    pub fn registers(&self) -> &Registers<H> {
        &self.regs
    }

    /// Transmitter for this line
    pub fn transmitter(&self, timing: TxTiming) -> Transmitter<'_, H> {
        Transmitter::new(self, timing)
    }

    /// Receive handler feeding `buffer`, raising faults into `errors`
    pub fn receiver<'a, const N: usize>(
        &'a self,
        buffer: &'a RingBuffer<N>,
        errors: &'a ErrorState,
    ) -> Receiver<'a, H, N> {
        Receiver::new(&self.regs, buffer, errors)
    }
}

impl<H: SerialHardware> Drop for SerialLine<H> {
    fn drop(&mut self) {
        self.close();
    }
}
