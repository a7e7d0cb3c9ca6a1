// SPI bus access for the MUX tools
pub mod client;
pub mod transfer;

#[cfg(feature = "spi")]
pub mod spidev;

#[cfg(test)]
pub mod mock;

pub use client::{ClientError, MuxClient};
pub use transfer::{BusError, SpiTransfer};

#[cfg(feature = "spi")]
pub use self::spidev::SpidevBus;
