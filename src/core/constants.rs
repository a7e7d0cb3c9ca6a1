// Bus constants for the MUX board
// Values match the Raspberry Pi wiring and the MUX firmware timing.

/// SPI device the MUX is wired to
pub const DEFAULT_SPI_DEVICE: &str = "/dev/spidev0.0";

/// SPI mode 1: clock idles low, data sampled on the falling edge
pub const DEFAULT_SPI_MODE: u8 = 1;

pub const DEFAULT_BITS_PER_WORD: u8 = 8;

/// The MUX bit-bangs SPI from a pin-change interrupt, so keep the clock slow
pub const DEFAULT_MAX_SPEED_HZ: u32 = 10_000;

/// Bytes clocked out of the MUX per response read
pub const DEFAULT_RESPONSE_LEN: usize = 80;

/// Time the MUX needs between a command and its response
pub const DEFAULT_SETTLE_MS: u64 = 50;
