// MUXI-RS: host tools for the SPI multiplexer of the boiler controller
// Decodes the MUX response bitstream and drives the bus for debugging.

pub mod bitwise;
pub mod bus;
pub mod core;
pub mod formats;
pub mod logging;
pub mod protocol;

// Re-export commonly used types
pub use bitwise::{reverse8, BitOrder, BitReader, Bitstream, BitstreamError};
pub use bus::{BusError, ClientError, MuxClient, SpiTransfer};
pub use core::{MuxConfig, SpiConfig};
pub use formats::{load_capture, save_capture};
pub use protocol::{
    decode, decode_report, encode_command, Command, CommandError, DecodeReport, Message,
};

/// MUXI-RS version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
