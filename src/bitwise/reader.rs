// Bitstream arena and one-pass cursor reader
// A response buffer is flattened into bits once; readers only hold an index into it.

use super::reverse::reverse8;
use super::types::{bits_to_string, bits_to_uint_lsb, bits_to_uint_msb, BitOrder};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitstreamError {
    #[error("End of stream: need {needed} bits at offset {offset}, {available} left")]
    EndOfStream {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Field of {0} bits does not fit in 32 bits")]
    FieldTooWide(usize),
}

pub type Result<T> = std::result::Result<T, BitstreamError>;

/// Immutable, fixed-length sequence of bits built from one bus transfer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bitstream {
    bits: Vec<bool>,
}

impl Bitstream {
    /// Flatten a byte buffer into bits using the given bit order
    pub fn from_bytes(bytes: &[u8], order: BitOrder) -> Self {
        let mut bits = Vec::with_capacity(bytes.len() * 8);
        for &byte in bytes {
            let byte = match order {
                BitOrder::Reversed => reverse8(byte),
                BitOrder::Natural => byte,
            };
            for shift in (0..8).rev() {
                bits.push((byte >> shift) & 1 == 1);
            }
        }
        Self { bits }
    }

    /// Flatten a MUX response, reversing every byte
    pub fn from_response(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes, BitOrder::Reversed)
    }

    /// Wrap an existing bit sequence
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Number of bits in the stream
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Get the raw bits
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Start a new pass over the stream with the cursor at zero
    pub fn reader(&self) -> BitReader<'_> {
        BitReader::new(self)
    }
}

impl fmt::Display for Bitstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bits_to_string(&self.bits))
    }
}

/// Forward-only reader over a `Bitstream`
///
/// The cursor is the only mutable state. Failed reads leave it where it was,
/// so a read either consumes all requested bits or none.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bits: &'a [bool],
    cursor: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(stream: &'a Bitstream) -> Self {
        Self {
            bits: &stream.bits,
            cursor: 0,
        }
    }

    /// Number of bits consumed so far
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Number of bits left to read
    pub fn remaining(&self) -> usize {
        self.bits.len() - self.cursor
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor == self.bits.len()
    }

    fn ensure(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            return Err(BitstreamError::EndOfStream {
                offset: self.cursor,
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    /// Return the bit at the cursor without consuming it
    pub fn peek_bit(&self) -> Result<bool> {
        self.ensure(1)?;
        Ok(self.bits[self.cursor])
    }

    /// Consume and return one bit
    pub fn next_bit(&mut self) -> Result<bool> {
        let bit = self.peek_bit()?;
        self.cursor += 1;
        Ok(bit)
    }

    /// Consume the next `n` bits in stream order
    pub fn read_raw(&mut self, n: usize) -> Result<&'a [bool]> {
        self.ensure(n)?;
        let bits: &'a [bool] = self.bits;
        let field = &bits[self.cursor..self.cursor + n];
        self.cursor += n;
        Ok(field)
    }

    /// Consume `n` bits as an unsigned integer, first bit most significant
    pub fn read_value(&mut self, n: usize) -> Result<u32> {
        check_width(n)?;
        self.read_raw(n).map(bits_to_uint_msb)
    }

    /// Consume `n` bits as an unsigned integer, first bit least significant
    pub fn read_reversed_value(&mut self, n: usize) -> Result<u32> {
        check_width(n)?;
        self.read_raw(n).map(bits_to_uint_lsb)
    }
}

fn check_width(n: usize) -> Result<()> {
    if n > 32 {
        return Err(BitstreamError::FieldTooWide(n));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitwise::types::bits_from_str;

    fn stream(text: &str) -> Bitstream {
        Bitstream::from_bits(bits_from_str(text).unwrap())
    }

    #[test]
    fn test_from_bytes_reversed() {
        // 0x01 reversed is 0x80, read most significant bit first
        let s = Bitstream::from_response(&[0x01, 0x06]);
        assert_eq!(s.to_string(), "1000000001100000");
        assert_eq!(s.len(), 16);
    }

    #[test]
    fn test_from_bytes_natural() {
        let s = Bitstream::from_bytes(&[0x01, 0x06], BitOrder::Natural);
        assert_eq!(s.to_string(), "0000000100000110");
    }

    #[test]
    fn test_empty_stream() {
        let s = Bitstream::from_response(&[]);
        assert!(s.is_empty());
        let mut r = s.reader();
        assert!(r.is_at_end());
        assert!(matches!(
            r.peek_bit(),
            Err(BitstreamError::EndOfStream { offset: 0, needed: 1, available: 0 })
        ));
        assert!(r.next_bit().is_err());
        // A zero-width read always succeeds
        assert!(r.read_raw(0).unwrap().is_empty());
    }

    #[test]
    fn test_peek_and_next() {
        let s = stream("10");
        let mut r = s.reader();
        assert!(r.peek_bit().unwrap());
        assert!(r.peek_bit().unwrap());
        assert_eq!(r.position(), 0);
        assert!(r.next_bit().unwrap());
        assert!(!r.next_bit().unwrap());
        assert!(r.is_at_end());
        assert!(r.next_bit().is_err());
        assert_eq!(r.position(), 2);
    }

    #[test]
    fn test_read_raw_is_all_or_nothing() {
        let s = stream("10110");
        let mut r = s.reader();
        assert_eq!(r.read_raw(2).unwrap(), &[true, false]);

        let err = r.read_raw(4).unwrap_err();
        assert_eq!(
            err,
            BitstreamError::EndOfStream {
                offset: 2,
                needed: 4,
                available: 3
            }
        );
        // Cursor untouched after the failed read
        assert_eq!(r.position(), 2);
        assert_eq!(r.read_raw(3).unwrap(), &[true, true, false]);
    }

    #[test]
    fn test_read_values() {
        let s = stream("1100001");
        let mut r = s.reader();
        assert_eq!(r.read_reversed_value(5).unwrap(), 3);
        assert_eq!(r.read_value(2).unwrap(), 1);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_read_value_too_wide() {
        let s = Bitstream::from_response(&[0u8; 8]);
        let mut r = s.reader();
        assert_eq!(r.read_value(33), Err(BitstreamError::FieldTooWide(33)));
        assert_eq!(r.position(), 0);
        assert_eq!(r.read_reversed_value(32).unwrap(), 0);
    }
}
