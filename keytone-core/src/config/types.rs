//! Configuration type definitions
//!
//! These types mirror the settings file one-to-one and are not yet
//! validated; [`LinkSettings::validate`] turns them into a [`LineConfig`].

use keytone_hal::{ConfigError, DataBits, LineConfig, Parity, Port, StopBits};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parity as written in settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ParitySetting {
    #[default]
    None,
    Odd,
    Even,
}

impl From<ParitySetting> for Parity {
    fn from(setting: ParitySetting) -> Self {
        match setting {
            ParitySetting::None => Parity::None,
            ParitySetting::Odd => Parity::Odd,
            ParitySetting::Even => Parity::Even,
        }
    }
}

/// Line settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LineSettings {
    /// COM port number (1 or 2)
    pub port: u8,
    /// Baud rate (150-19200)
    pub baud: u32,
    /// Parity mode
    pub parity: ParitySetting,
    /// Data bits (5-8)
    pub data_bits: u8,
    /// Stop bits (1 or 2)
    pub stop_bits: u8,
}

impl Default for LineSettings {
    fn default() -> Self {
        Self {
            port: 1,
            baud: 1200,
            parity: ParitySetting::None,
            data_bits: 8,
            stop_bits: 1,
        }
    }
}

/// Transmit timing settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimingSettings {
    /// Longest wait for clear-to-send, in ms
    pub cts_timeout_ms: u32,
    /// Longest wait for the transmit holding register, in ms
    pub thre_timeout_ms: u32,
    /// Pause after each key sent, in ms (the board overruns without it)
    pub pacing_ms: u32,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            cts_timeout_ms: 50,
            thre_timeout_ms: 50,
            pacing_ms: 5,
        }
    }
}

/// Complete link settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkSettings {
    pub line: LineSettings,
    pub timing: TimingSettings,
}

impl LinkSettings {
    /// Check the line settings and build the line configuration
    ///
    /// Fails on the first field out of range, before any hardware access.
    pub fn validate(&self) -> Result<LineConfig, ConfigError> {
        let line = &self.line;
        let config = LineConfig {
            port: Port::from_number(line.port)?,
            baud_rate: line.baud,
            parity: line.parity.into(),
            data_bits: DataBits::from_count(line.data_bits)?,
            stop_bits: StopBits::from_count(line.stop_bits)?,
        };
        config.validate()?;
        Ok(config)
    }
}
