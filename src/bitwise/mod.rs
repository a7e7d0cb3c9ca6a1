// Bit-level parsing for the MUX bus
// Byte buffers are flattened into bitstreams that the protocol decoders scan.

pub mod reader;
pub mod reverse;
pub mod types;

pub use reader::{BitReader, Bitstream, BitstreamError};
pub use reverse::{reverse8, reverse_all};
pub use types::{bits_from_str, bits_to_string, bits_to_uint_lsb, bits_to_uint_msb, BitOrder};
