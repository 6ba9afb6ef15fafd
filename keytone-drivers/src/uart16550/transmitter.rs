//! Flow-controlled transmit
//!
//! The tone board signals readiness on CTS. A byte is written only after
//! CTS is seen and the transmit holding register is empty; either wait
//! gives up after its own time budget.

use core::fmt;

use embassy_time::{block_for, Duration};
use keytone_core::config::TimingSettings;
use keytone_core::ErrorKind;
use keytone_hal::{bits, Register, SerialHardware};

use super::line::SerialLine;
use super::timeout::poll_until;

/// Transmit time budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxTiming {
    /// Longest wait for clear-to-send
    pub cts_timeout: Duration,
    /// Longest wait for the transmit holding register to drain
    pub thre_timeout: Duration,
    /// Pause after every byte written
    pub pacing: Duration,
}

impl Default for TxTiming {
    fn default() -> Self {
        TimingSettings::default().into()
    }
}

impl From<TimingSettings> for TxTiming {
    fn from(settings: TimingSettings) -> Self {
        Self {
            cts_timeout: Duration::from_millis(settings.cts_timeout_ms.into()),
            thre_timeout: Duration::from_millis(settings.thre_timeout_ms.into()),
            pacing: Duration::from_millis(settings.pacing_ms.into()),
        }
    }
}

/// Which handshake wait ran out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxStage {
    /// Remote end never raised CTS
    ClearToSend,
    /// Transmit holding register never emptied
    TransmitterEmpty,
}

/// Transmit errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxError {
    /// A handshake wait ran out; nothing was written
    HandshakeTimeout { stage: TxStage },
    /// The line has been closed
    LineClosed,
}

impl TxError {
    /// Link fault this error corresponds to, if any
    pub fn fault(&self) -> Option<ErrorKind> {
        match self {
            TxError::HandshakeTimeout { .. } => Some(ErrorKind::HandshakeTimeout),
            TxError::LineClosed => None,
        }
    }
}

impl fmt::Display for TxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxError::HandshakeTimeout {
                stage: TxStage::ClearToSend,
            } => f.write_str("timed out waiting for clear to send"),
            TxError::HandshakeTimeout {
                stage: TxStage::TransmitterEmpty,
            } => f.write_str("timed out waiting for transmitter ready"),
            TxError::LineClosed => f.write_str("line is closed"),
        }
    }
}

/// [`Transmitter::send_all`] stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Incomplete {
    /// Bytes written before the failure
    pub sent: usize,
    /// Why the next byte was not written
    pub error: TxError,
}

/// Byte transmitter bound to an open line
pub struct Transmitter<'a, H: SerialHardware> {
    line: &'a SerialLine<H>,
    timing: TxTiming,
}

impl<'a, H: SerialHardware> Transmitter<'a, H> {
    pub(crate) fn new(line: &'a SerialLine<H>, timing: TxTiming) -> Self {
        Self { line, timing }
    }

    pub fn timing(&self) -> &TxTiming {
        &self.timing
    }

    /// Send one byte
    ///
    /// Blocks for at most the two handshake budgets plus the pacing delay.
    /// Each status poll takes its own short critical section, so the
    /// receive handler keeps running while this waits.
    pub fn send(&self, byte: u8) -> Result<(), TxError> {
        if !self.line.is_open() {
            return Err(TxError::LineClosed);
        }
        let regs = self.line.registers();

        regs.modify(Register::ModemControl, |mcr| {
            mcr | bits::MCR_OUT2 | bits::MCR_HANDSHAKE
        });

        let cts = poll_until(self.timing.cts_timeout, || {
            regs.read(Register::ModemStatus) & bits::MSR_CTS != 0
        });
        if !cts {
            warn!("no clear to send for {}", byte);
            return Err(TxError::HandshakeTimeout {
                stage: TxStage::ClearToSend,
            });
        }

        let thre = poll_until(self.timing.thre_timeout, || {
            regs.read(Register::LineStatus) & bits::LSR_THRE != 0
        });
        if !thre {
            warn!("transmitter busy, dropping {}", byte);
            return Err(TxError::HandshakeTimeout {
                stage: TxStage::TransmitterEmpty,
            });
        }

        regs.write(Register::Data, byte);
        trace!("tx {}", byte);

        if self.timing.pacing > Duration::from_ticks(0) {
            block_for(self.timing.pacing);
        }
        Ok(())
    }

    /// Send bytes in order, stopping at the first failure
    ///
    /// Returns the number of bytes written.
    pub fn send_all(&self, bytes: &[u8]) -> Result<usize, Incomplete> {
        for (sent, &byte) in bytes.iter().enumerate() {
            self.send(byte)
                .map_err(|error| Incomplete { sent, error })?;
        }
        Ok(bytes.len())
    }
}
