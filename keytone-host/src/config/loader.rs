//! TOML loader

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use keytone_core::config::LinkSettings;
use keytone_drivers::TxTiming;
use keytone_hal::{ConfigError, LineConfig};

/// Validated link configuration, ready to open a line with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkConfig {
    pub line: LineConfig,
    pub timing: TxTiming,
}

impl TryFrom<LinkSettings> for LinkConfig {
    type Error = ConfigError;

    fn try_from(settings: LinkSettings) -> Result<Self, Self::Error> {
        Ok(Self {
            line: settings.validate()?,
            timing: settings.timing.into(),
        })
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum LoadError {
    /// Settings file could not be read
    Io(io::Error),
    /// Not valid TOML, or a field has the wrong type
    Parse(toml::de::Error),
    /// Parsed, but a value is out of range
    Invalid(ConfigError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "cannot read settings: {e}"),
            LoadError::Parse(e) => write!(f, "malformed settings: {e}"),
            LoadError::Invalid(e) => write!(f, "invalid settings: {e}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::Parse(e) => Some(e),
            LoadError::Invalid(_) => None,
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<toml::de::Error> for LoadError {
    fn from(e: toml::de::Error) -> Self {
        LoadError::Parse(e)
    }
}

impl From<ConfigError> for LoadError {
    fn from(e: ConfigError) -> Self {
        LoadError::Invalid(e)
    }
}

/// Parse and validate settings from a TOML string
pub fn load_str(source: &str) -> Result<LinkConfig, LoadError> {
    let settings: LinkSettings = toml::from_str(source)?;
    let config = LinkConfig::try_from(settings)?;
    debug!(
        "settings: COM{} {} baud",
        config.line.port.number(),
        config.line.baud_rate
    );
    Ok(config)
}

/// Read, parse and validate a TOML settings file
pub fn load_file(path: impl AsRef<Path>) -> Result<LinkConfig, LoadError> {
    let source = fs::read_to_string(path)?;
    load_str(&source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_time::Duration;
    use keytone_hal::{DataBits, Parity, Port, StopBits};

    #[test]
    fn test_empty_document_gives_defaults() {
        assert_eq!(load_str("").unwrap(), LinkConfig::default());
    }

    #[test]
    fn test_full_document() {
        let config = load_str(
            r#"
            [line]
            port = 2
            baud = 9600
            parity = "even"
            data_bits = 7
            stop_bits = 2

            [timing]
            cts_timeout_ms = 100
            thre_timeout_ms = 20
            pacing_ms = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.line.port, Port::B);
        assert_eq!(config.line.baud_rate, 9600);
        assert_eq!(config.line.parity, Parity::Even);
        assert_eq!(config.line.data_bits, DataBits::Seven);
        assert_eq!(config.line.stop_bits, StopBits::Two);
        assert_eq!(config.timing.cts_timeout, Duration::from_millis(100));
        assert_eq!(config.timing.thre_timeout, Duration::from_millis(20));
        assert_eq!(config.timing.pacing, Duration::from_millis(0));
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = load_str("[line]\nbaud = 2400\n").unwrap();
        assert_eq!(config.line.baud_rate, 2400);
        assert_eq!(config.line.port, Port::A);
        assert_eq!(config.timing, TxTiming::default());
    }

    #[test]
    fn test_out_of_range_values() {
        let err = load_str("[line]\nport = 3\n").unwrap_err();
        assert!(matches!(err, LoadError::Invalid(ConfigError::InvalidPort(3))));

        let err = load_str("[line]\nbaud = 30000\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::Invalid(ConfigError::BaudOutOfRange(30_000))
        ));
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(load_str("[line\n"), Err(LoadError::Parse(_))));
        assert!(matches!(
            load_str("[line]\nparity = \"mark\"\n"),
            Err(LoadError::Parse(_))
        ));
        assert!(matches!(
            load_str("[line]\nbaud = \"fast\"\n"),
            Err(LoadError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = load_file("/nonexistent/keytone.toml").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
        assert!(err.to_string().starts_with("cannot read settings"));
    }
}
