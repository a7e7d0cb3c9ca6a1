// Frame decoder for the MUX response bitstream
//
// Frame layout after per-byte reversal, read left to right:
//   0* 1 LLLLL TT D{L}
// zero padding, a marker bit, the 5-bit length (least significant bit first),
// a 2-bit tag (most significant bit first) and `length` data bits.

use super::message::Message;
use crate::bitwise::{BitOrder, BitReader, Bitstream, BitstreamError};
use serde::Serialize;

/// Width of the length field
pub const LENGTH_BITS: usize = 5;

/// Width of the tag field
pub const TAG_BITS: usize = 2;

/// Decoder states. The marker offset is carried so a truncated frame can be
/// located in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState<'a> {
    Scanning,
    ReadLength {
        marker: usize,
    },
    ReadTag {
        marker: usize,
        length: u8,
    },
    ReadData {
        marker: usize,
        length: u8,
        tag: u8,
    },
    Emit {
        tag: u8,
        data: &'a [bool],
    },
}

/// Field that was being read when the stream ran out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "field", rename_all = "lowercase")]
pub enum TruncatedField {
    Length,
    Tag { length: u8 },
    Data { length: u8, tag: u8 },
}

/// A frame whose marker was seen but whose fields did not fit in the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TruncatedFrame {
    /// Bit offset of the marker
    pub marker: usize,
    pub field: TruncatedField,
}

/// Result of one decode pass
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DecodeReport {
    pub messages: Vec<Message>,
    /// Bits consumed before the pass ended
    pub bits_consumed: usize,
    /// Frame dropped because the buffer ended inside it
    pub discarded: Option<TruncatedFrame>,
}

/// One-pass state machine over a bitstream
pub struct FrameDecoder<'a> {
    reader: BitReader<'a>,
    messages: Vec<Message>,
}

impl<'a> FrameDecoder<'a> {
    pub fn new(stream: &'a Bitstream) -> Self {
        Self {
            reader: stream.reader(),
            messages: Vec::new(),
        }
    }

    /// Advance the machine by one state
    pub fn step(&mut self, state: DecodeState<'a>) -> Result<DecodeState<'a>, BitstreamError> {
        let next = match state {
            DecodeState::Scanning => {
                let marker = self.reader.position();
                if self.reader.peek_bit()? {
                    self.reader.next_bit()?;
                    DecodeState::ReadLength { marker }
                } else {
                    self.reader.next_bit()?;
                    DecodeState::Scanning
                }
            }
            DecodeState::ReadLength { marker } => {
                let length = self.reader.read_reversed_value(LENGTH_BITS)? as u8;
                DecodeState::ReadTag { marker, length }
            }
            DecodeState::ReadTag { marker, length } => {
                let tag = self.reader.read_value(TAG_BITS)? as u8;
                DecodeState::ReadData {
                    marker,
                    length,
                    tag,
                }
            }
            DecodeState::ReadData { length, tag, .. } => {
                let data = self.reader.read_raw(length as usize)?;
                DecodeState::Emit { tag, data }
            }
            DecodeState::Emit { tag, data } => {
                let message = Message::from_frame(tag, data.to_vec());
                tracing::debug!(
                    "Decoded frame ending at bit {}: {}",
                    self.reader.position(),
                    message
                );
                self.messages.push(message);
                DecodeState::Scanning
            }
        };
        Ok(next)
    }

    /// Run until the stream is exhausted
    ///
    /// Running out of bits while scanning ends the pass normally. Running out
    /// inside a frame drops that frame and ends the pass as well; the dropped
    /// frame is only recorded in the report.
    pub fn run(mut self) -> DecodeReport {
        let mut state = DecodeState::Scanning;
        let discarded = loop {
            match self.step(state) {
                Ok(next) => state = next,
                Err(err) => break truncated(state, err),
            }
        };

        DecodeReport {
            messages: self.messages,
            bits_consumed: self.reader.position(),
            discarded,
        }
    }
}

fn truncated(state: DecodeState<'_>, err: BitstreamError) -> Option<TruncatedFrame> {
    let (marker, field) = match state {
        DecodeState::Scanning | DecodeState::Emit { .. } => return None,
        DecodeState::ReadLength { marker } => (marker, TruncatedField::Length),
        DecodeState::ReadTag { marker, length } => (marker, TruncatedField::Tag { length }),
        DecodeState::ReadData {
            marker,
            length,
            tag,
        } => (marker, TruncatedField::Data { length, tag }),
    };
    tracing::debug!(
        "Discarding truncated frame at bit {} ({:?}): {}",
        marker,
        field,
        err
    );
    Some(TruncatedFrame { marker, field })
}

/// Decode a bitstream, with details about how the pass ended
pub fn decode_report(stream: &Bitstream) -> DecodeReport {
    FrameDecoder::new(stream).run()
}

/// Decode a bitstream into messages
pub fn decode_bitstream(stream: &Bitstream) -> Vec<Message> {
    decode_report(stream).messages
}

/// Decode a MUX response buffer, reversing each byte first
pub fn decode(buffer: &[u8]) -> Vec<Message> {
    decode_with_order(buffer, BitOrder::Reversed)
}

/// Decode a response buffer using the given bit order
pub fn decode_with_order(buffer: &[u8], order: BitOrder) -> Vec<Message> {
    decode_bitstream(&Bitstream::from_bytes(buffer, order))
}
