//! UART line configuration
//!
//! Describes the asynchronous line to the tone board and validates it
//! before any register is touched.

use core::fmt;

/// UART input clock divided by 16, the reference for the baud divisor
pub const BASE_CLOCK_HZ: u32 = 115_200;

/// Slowest rate the tone board accepts
pub const MIN_BAUD: u32 = 150;

/// Fastest rate the tone board accepts
pub const MAX_BAUD: u32 = 19_200;

/// Configuration errors
///
/// Every variant is detected before the line is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Port selector outside {1, 2}
    InvalidPort(u8),
    /// Baud rate zero or outside `MIN_BAUD..=MAX_BAUD`
    BaudOutOfRange(u32),
    /// Data bits outside 5..=8
    InvalidDataBits(u8),
    /// Stop bits other than 1 or 2
    InvalidStopBits(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort(n) => write!(f, "com port must be either 1 or 2 (got {n})"),
            ConfigError::BaudOutOfRange(b) => write!(
                f,
                "baud rate must be in the range {MIN_BAUD} - {MAX_BAUD} (got {b})"
            ),
            ConfigError::InvalidDataBits(n) => write!(f, "data bits must be 5-8 (got {n})"),
            ConfigError::InvalidStopBits(n) => write!(f, "stop bits must be 1 or 2 (got {n})"),
        }
    }
}

/// Serial port selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    /// COM1
    #[default]
    A,
    /// COM2
    B,
}

impl Port {
    /// Map the user-facing port number (1 or 2) to a port
    pub fn from_number(number: u8) -> Result<Self, ConfigError> {
        match number {
            1 => Ok(Port::A),
            2 => Ok(Port::B),
            other => Err(ConfigError::InvalidPort(other)),
        }
    }

    /// User-facing port number
    pub fn number(self) -> u8 {
        match self {
            Port::A => 1,
            Port::B => 2,
        }
    }
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
}

impl Parity {
    /// Parity-enable and even-parity bits of the line control register
    pub fn lcr_bits(self) -> u8 {
        match self {
            Parity::None => 0x00,
            Parity::Odd => 0x08,
            Parity::Even => 0x18,
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Five,
    Six,
    Seven,
    #[default]
    Eight,
}

impl DataBits {
    /// Build from a bit count
    pub fn from_count(count: u8) -> Result<Self, ConfigError> {
        match count {
            5 => Ok(DataBits::Five),
            6 => Ok(DataBits::Six),
            7 => Ok(DataBits::Seven),
            8 => Ok(DataBits::Eight),
            other => Err(ConfigError::InvalidDataBits(other)),
        }
    }

    pub fn count(self) -> u8 {
        match self {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        }
    }

    /// Word-length field of the line control register
    pub fn lcr_bits(self) -> u8 {
        self.count() - 5
    }
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    #[default]
    One,
    Two,
}

impl StopBits {
    /// Build from a bit count
    pub fn from_count(count: u8) -> Result<Self, ConfigError> {
        match count {
            1 => Ok(StopBits::One),
            2 => Ok(StopBits::Two),
            other => Err(ConfigError::InvalidStopBits(other)),
        }
    }

    pub fn count(self) -> u8 {
        match self {
            StopBits::One => 1,
            StopBits::Two => 2,
        }
    }

    /// Stop-bit field of the line control register
    pub fn lcr_bits(self) -> u8 {
        match self {
            StopBits::One => 0x00,
            StopBits::Two => 0x04,
        }
    }
}

/// Line configuration
///
/// The enum-typed fields cannot hold an out-of-range value; the baud rate
/// is checked by [`LineConfig::validate`], which the driver calls before
/// opening the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineConfig {
    /// Which UART to use
    pub port: Port,
    /// Baud rate in bits per second
    pub baud_rate: u32,
    /// Parity mode
    pub parity: Parity,
    /// Number of data bits
    pub data_bits: DataBits,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for LineConfig {
    /// 1200 baud 8N1 on COM1
    fn default() -> Self {
        Self {
            port: Port::A,
            baud_rate: 1200,
            parity: Parity::None,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
        }
    }
}

impl LineConfig {
    /// 8N1 line on `port` at `baud_rate`
    pub fn new(port: Port, baud_rate: u32) -> Self {
        Self {
            port,
            baud_rate,
            ..Self::default()
        }
    }

    /// Check every field against what the tone board supports
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BAUD..=MAX_BAUD).contains(&self.baud_rate) {
            return Err(ConfigError::BaudOutOfRange(self.baud_rate));
        }
        Ok(())
    }

    /// Baud rate divisor, `round(BASE_CLOCK_HZ / baud_rate)`
    pub fn divisor(&self) -> Result<u16, ConfigError> {
        self.validate()?;
        let baud = self.baud_rate;
        // MIN_BAUD keeps the quotient well inside u16
        Ok(((BASE_CLOCK_HZ + baud / 2) / baud) as u16)
    }

    /// Line control register value (DLAB clear)
    pub fn line_control(&self) -> u8 {
        self.data_bits.lcr_bits() | self.stop_bits.lcr_bits() | self.parity.lcr_bits()
    }
}
