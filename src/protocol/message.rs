// Decoded MUX message: a 2-bit tag and up to 31 data bits

use crate::bitwise::{bits_to_string, bits_to_uint_lsb, bits_to_uint_msb};
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Largest tag that fits the 2-bit field
pub const MAX_TAG: u8 = 0b11;

/// Largest data length that fits the 5-bit length field
pub const MAX_LENGTH: usize = 0b1_1111;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    #[error("Tag {0} does not fit in 2 bits")]
    TagOutOfRange(u8),

    #[error("Message of {0} bits exceeds the 31-bit length field")]
    TooLong(usize),

    #[error("Cannot join messages with tags {0} and {1}")]
    TagMismatch(u8, u8),
}

pub type Result<T> = std::result::Result<T, MessageError>;

/// One frame taken off the MUX bus
///
/// The length is derived from the data, so `data().len() == length()` always
/// holds. Messages are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Message {
    tag: u8,
    length: u8,
    #[serde(serialize_with = "serialize_bits")]
    data: Vec<bool>,
}

impl Message {
    /// Build a message, checking the tag and length field widths
    pub fn new(tag: u8, data: Vec<bool>) -> Result<Self> {
        if tag > MAX_TAG {
            return Err(MessageError::TagOutOfRange(tag));
        }
        if data.len() > MAX_LENGTH {
            return Err(MessageError::TooLong(data.len()));
        }
        Ok(Self {
            tag,
            length: data.len() as u8,
            data,
        })
    }

    /// Build a message from fields already limited by their wire widths
    pub(crate) fn from_frame(tag: u8, data: Vec<bool>) -> Self {
        debug_assert!(tag <= MAX_TAG && data.len() <= MAX_LENGTH);
        Self {
            tag,
            length: data.len() as u8,
            data,
        }
    }

    /// Tag (the sending chip for the MUX firmware)
    pub fn tag(&self) -> u8 {
        self.tag
    }

    /// Number of data bits
    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn data(&self) -> &[bool] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Data bit at `idx`
    pub fn bit(&self, idx: usize) -> Option<bool> {
        self.data.get(idx).copied()
    }

    /// Read `len` data bits starting at `idx` as an unsigned integer
    pub fn uint(&self, idx: usize, len: usize, lsb_first: bool) -> Option<u32> {
        if len > 32 {
            return None;
        }
        let field = self.data.get(idx..idx.checked_add(len)?)?;
        Some(if lsb_first {
            bits_to_uint_lsb(field)
        } else {
            bits_to_uint_msb(field)
        })
    }

    /// Concatenate the data of two messages from the same sender
    pub fn join(&self, other: &Message) -> Result<Message> {
        if self.tag != other.tag {
            return Err(MessageError::TagMismatch(self.tag, other.tag));
        }
        let mut data = self.data.clone();
        data.extend_from_slice(&other.data);
        Message::new(self.tag, data)
    }

    /// Data rendered as '0'/'1' characters
    pub fn bit_string(&self) -> String {
        bits_to_string(&self.data)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02b}:{} {}", self.tag, self.length, self.bit_string())
    }
}

fn serialize_bits<S: Serializer>(bits: &[bool], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&bits_to_string(bits))
}
