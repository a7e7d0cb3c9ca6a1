// MUX bus configuration, loadable from JSON

use super::constants::*;
use crate::bitwise::BitOrder;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// SPI device settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiConfig {
    /// Device node, e.g. /dev/spidev0.0
    pub device: String,

    /// SPI mode (0-3)
    pub mode: u8,

    pub bits_per_word: u8,

    pub max_speed_hz: u32,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_SPI_DEVICE.to_string(),
            mode: DEFAULT_SPI_MODE,
            bits_per_word: DEFAULT_BITS_PER_WORD,
            max_speed_hz: DEFAULT_MAX_SPEED_HZ,
        }
    }
}

/// Settings for talking to the MUX
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MuxConfig {
    pub spi: SpiConfig,

    /// Bytes read back per response
    pub response_len: usize,

    /// Delay between sending a command and reading the response
    pub settle_ms: u64,

    /// Bit order of the response bytes
    pub bit_order: BitOrder,
}

impl Default for MuxConfig {
    fn default() -> Self {
        Self {
            spi: SpiConfig::default(),
            response_len: DEFAULT_RESPONSE_LEN,
            settle_ms: DEFAULT_SETTLE_MS,
            bit_order: BitOrder::default(),
        }
    }
}

impl MuxConfig {
    /// Load a configuration file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: MuxConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Set the SPI device node
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.spi.device = device.into();
        self
    }

    /// Set the response length
    pub fn with_response_len(mut self, response_len: usize) -> Self {
        self.response_len = response_len;
        self
    }

    /// Set the settle delay
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle_ms = settle.as_millis() as u64;
        self
    }

    pub fn with_bit_order(mut self, bit_order: BitOrder) -> Self {
        self.bit_order = bit_order;
        self
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// Check for values the bus cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.response_len == 0 {
            return Err(ConfigError::Invalid(
                "response_len must be at least 1".to_string(),
            ));
        }
        if self.spi.mode > 3 {
            return Err(ConfigError::Invalid(format!(
                "SPI mode {} is not in 0-3",
                self.spi.mode
            )));
        }
        if self.spi.bits_per_word == 0 {
            return Err(ConfigError::Invalid(
                "bits_per_word must be at least 1".to_string(),
            ));
        }
        if self.spi.max_speed_hz == 0 {
            return Err(ConfigError::Invalid(
                "max_speed_hz must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = MuxConfig::default();
        assert_eq!(config.spi.device, "/dev/spidev0.0");
        assert_eq!(config.spi.mode, 1);
        assert_eq!(config.spi.bits_per_word, 8);
        assert_eq!(config.spi.max_speed_hz, 10_000);
        assert_eq!(config.response_len, 80);
        assert_eq!(config.settle(), Duration::from_millis(50));
        assert_eq!(config.bit_order, BitOrder::Reversed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = MuxConfig::default()
            .with_device("/dev/spidev1.0")
            .with_response_len(5)
            .with_settle(Duration::from_millis(2))
            .with_bit_order(BitOrder::Natural);
        assert_eq!(config.spi.device, "/dev/spidev1.0");
        assert_eq!(config.response_len, 5);
        assert_eq!(config.settle_ms, 2);
        assert_eq!(config.bit_order, BitOrder::Natural);
    }

    #[test]
    fn test_load_partial_file() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"response_len": 40, "spi": {{"max_speed_hz": 20000}}}}"#).unwrap();
        file.flush().unwrap();

        let config = MuxConfig::load(file.path())?;
        assert_eq!(config.response_len, 40);
        assert_eq!(config.spi.max_speed_hz, 20_000);
        assert_eq!(config.spi.mode, 1);
        assert_eq!(config.settle_ms, 50);
        Ok(())
    }

    #[test]
    fn test_save_load() -> Result<()> {
        let file = NamedTempFile::new().unwrap();
        let config = MuxConfig::default().with_bit_order(BitOrder::Natural);
        config.save(file.path())?;
        assert_eq!(MuxConfig::load(file.path())?, config);
        Ok(())
    }

    #[test]
    fn test_invalid_values() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"response_len": 0}}"#).unwrap();
        file.flush().unwrap();
        assert!(matches!(
            MuxConfig::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));

        let mut config = MuxConfig::default();
        config.spi.mode = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        file.flush().unwrap();
        assert!(matches!(
            MuxConfig::load(file.path()),
            Err(ConfigError::Json(_))
        ));
    }
}
