// Linux spidev backend
// Wraps the spidev crate's character device with the MUX bus settings.

use super::transfer::{BusError, Result, SpiTransfer};
use crate::core::SpiConfig;
use spidev::{SpiModeFlags, Spidev, SpidevOptions, SpidevTransfer};

/// SPI bus backed by a /dev/spidevX.Y device
pub struct SpidevBus {
    device: Spidev,
    config: SpiConfig,
}

impl SpidevBus {
    /// Open and configure the device named in `config`
    pub fn open(config: SpiConfig) -> Result<Self> {
        let mode = mode_flags(config.mode)?;
        let mut device = Spidev::open(&config.device)
            .map_err(|e| BusError::Device(format!("{}: {}", config.device, e)))?;

        let options = SpidevOptions::new()
            .bits_per_word(config.bits_per_word)
            .max_speed_hz(config.max_speed_hz)
            .mode(mode)
            .build();
        device.configure(&options)?;

        tracing::debug!(
            "Opened {} (mode {}, {} bits, {} Hz)",
            config.device,
            config.mode,
            config.bits_per_word,
            config.max_speed_hz
        );

        Ok(Self { device, config })
    }

    /// Get the configuration
    pub fn config(&self) -> &SpiConfig {
        &self.config
    }
}

impl SpiTransfer for SpidevBus {
    fn transfer(&mut self, tx: &[u8]) -> Result<Vec<u8>> {
        let mut rx = vec![0u8; tx.len()];
        {
            let mut transfer = SpidevTransfer::read_write(tx, &mut rx);
            self.device.transfer(&mut transfer)?;
        }
        tracing::trace!("SPI transfer: sent {:02X?}, received {:02X?}", tx, rx);
        Ok(rx)
    }
}

fn mode_flags(mode: u8) -> Result<SpiModeFlags> {
    match mode {
        0 => Ok(SpiModeFlags::SPI_MODE_0),
        1 => Ok(SpiModeFlags::SPI_MODE_1),
        2 => Ok(SpiModeFlags::SPI_MODE_2),
        3 => Ok(SpiModeFlags::SPI_MODE_3),
        other => Err(BusError::InvalidConfig(format!(
            "SPI mode {} is not in 0-3",
            other
        ))),
    }
}
