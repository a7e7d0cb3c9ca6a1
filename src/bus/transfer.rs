// Full-duplex SPI transfer abstraction

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BusError {
    #[error("SPI device error: {0}")]
    Device(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Transfer returned {received} bytes for {sent} sent")]
    LengthMismatch { sent: usize, received: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, BusError>;

/// A bus that clocks bytes out and reads the same number back
pub trait SpiTransfer {
    /// Send `tx` and return the bytes received while it was clocked out
    fn transfer(&mut self, tx: &[u8]) -> Result<Vec<u8>>;

    /// Clock out `len` zero bytes to read whatever the device has queued
    fn read(&mut self, len: usize) -> Result<Vec<u8>> {
        self.transfer(&vec![0u8; len])
    }
}

impl<T: SpiTransfer + ?Sized> SpiTransfer for Box<T> {
    fn transfer(&mut self, tx: &[u8]) -> Result<Vec<u8>> {
        (**self).transfer(tx)
    }
}

/// Check that a transfer returned one byte per byte sent
pub fn check_duplex(sent: usize, received: &[u8]) -> Result<()> {
    if received.len() != sent {
        return Err(BusError::LengthMismatch {
            sent,
            received: received.len(),
        });
    }
    Ok(())
}
