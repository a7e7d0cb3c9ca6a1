// MUX wire protocol: outbound commands, the response bitstream decoder and
// the byte-aligned framing of the polling firmware
pub mod aligned;
pub mod command;
pub mod decoder;
pub mod echo;
pub mod message;

pub use aligned::{read_aligned, write_aligned, AlignedError, FrameSplitter};
pub use command::{encode_command, Command, CommandError};
pub use decoder::{
    decode, decode_bitstream, decode_report, decode_with_order, DecodeReport, FrameDecoder,
    TruncatedField, TruncatedFrame,
};
pub use echo::{check_complement_echo, complement_echo_pattern, EchoMismatch};
pub use message::{Message, MessageError};
