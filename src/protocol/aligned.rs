// Byte-aligned MUX framing used by the polling daemon firmware
//
// Header byte: 1 LLLLL CC (marker, 5-bit length, 2-bit chip), followed by
// ceil(length / 8) body bytes. The two directions pack the body differently:
// outbound bits are shifted in from the low end of each byte, inbound bits
// are taken least significant bit first.

use super::message::{Message, MAX_LENGTH};
use nom::{bytes::complete::take, Parser};
use thiserror::Error;

/// Marker bit of the header byte
pub const HEADER_MARKER: u8 = 0b1000_0000;

/// Highest chip number on the board
pub const MAX_CHIP: u8 = 1;

/// Bytes moved by one polling transfer
pub const TRANSFER_LEN: usize = 5;

type NomError<'a> = nom::error::Error<&'a [u8]>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignedError {
    #[error("Invalid frame: no header")]
    NoHeader,

    #[error("Invalid frame: header {0:#010b} lacks the marker bit")]
    MissingMarker(u8),

    #[error("Invalid frame: body needs {needed} bytes, {available} available")]
    ShortBody { needed: usize, available: usize },

    #[error("Invalid message: chip {0} is neither 0 nor 1")]
    InvalidChip(u8),
}

pub type Result<T> = std::result::Result<T, AlignedError>;

/// Number of body bytes for a frame of `length` bits
pub fn body_len(length: u8) -> usize {
    (length as usize + 7) / 8
}

/// Header byte for a frame
pub fn header_byte(chip: u8, length: u8) -> u8 {
    HEADER_MARKER | (length & 0b1_1111) << 2 | (chip & 0b11)
}

/// Encode a message for transmission to the MUX
pub fn write_aligned(message: &Message) -> Result<Vec<u8>> {
    if message.tag() > MAX_CHIP {
        return Err(AlignedError::InvalidChip(message.tag()));
    }

    let mut frame = vec![0u8; 1 + body_len(message.length())];
    frame[0] = header_byte(message.tag(), message.length());

    for (i, &bit) in message.data().iter().enumerate() {
        let byte = &mut frame[1 + i / 8];
        *byte = (*byte << 1) | bit as u8;
    }

    Ok(frame)
}

fn parse_header(input: &[u8]) -> nom::IResult<&[u8], u8> {
    let (rest, byte) = take::<_, _, NomError>(1usize).parse(input)?;
    Ok((rest, byte[0]))
}

/// Decode one frame received from the MUX
pub fn read_aligned(buf: &[u8]) -> Result<Message> {
    let (rest, header) = parse_header(buf).map_err(|_| AlignedError::NoHeader)?;
    if header & HEADER_MARKER == 0 {
        return Err(AlignedError::MissingMarker(header));
    }

    let chip = header & 0b11;
    let length = ((header >> 2) & 0b1_1111) as usize;
    let needed = body_len(length as u8);
    let (_, body) = take::<_, _, NomError>(needed)
        .parse(rest)
        .map_err(|_| AlignedError::ShortBody {
            needed,
            available: rest.len(),
        })?;

    let data: Vec<bool> = body
        .iter()
        .flat_map(|&byte| (0..8).map(move |shift| (byte >> shift) & 1 == 1))
        .take(length)
        .collect();

    debug_assert!(length <= MAX_LENGTH);
    Ok(Message::from_frame(chip, data))
}

/// Splits the bytes of successive polling transfers into whole frames
///
/// Zero bytes between frames are skipped. A frame is only returned once its
/// header and full body have been pushed.
#[derive(Debug, Clone, Default)]
pub struct FrameSplitter {
    buffer: Vec<u8>,
}

impl FrameSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append received bytes
    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Number of buffered bytes not yet returned as a frame
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Take the next complete frame, if one is buffered
    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        let padding = self
            .buffer
            .iter()
            .position(|&b| b != 0)
            .unwrap_or(self.buffer.len());
        self.buffer.drain(..padding);

        let header = *self.buffer.first()?;
        let advance = 1 + body_len((header >> 2) & 0b1_1111);
        if advance > self.buffer.len() {
            return None;
        }

        Some(self.buffer.drain(..advance).collect())
    }

    /// Take the next complete frame and decode it
    pub fn next_message(&mut self) -> Option<Result<Message>> {
        self.next_frame().map(|frame| read_aligned(&frame))
    }

    /// Iterate over all complete frames currently buffered
    pub fn messages(&mut self) -> impl Iterator<Item = Result<Message>> + '_ {
        std::iter::from_fn(move || self.next_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitwise::bits_from_str;

    fn msg(chip: u8, bits: &str) -> Message {
        Message::new(chip, bits_from_str(bits).unwrap()).unwrap()
    }

    #[test]
    fn test_read_known_frame() {
        let m = read_aligned(&[188, 237, 6]).unwrap();
        assert_eq!(m.tag(), 0);
        assert_eq!(m.bit_string(), "101101110110000");
        assert_eq!(m.length(), 15);
    }

    #[test]
    fn test_read_errors() {
        assert_eq!(read_aligned(&[]).unwrap_err(), AlignedError::NoHeader);
        assert_eq!(
            read_aligned(&[0x3C, 0xFF]).unwrap_err(),
            AlignedError::MissingMarker(0x3C)
        );
        assert_eq!(
            read_aligned(&[188, 237]).unwrap_err(),
            AlignedError::ShortBody {
                needed: 2,
                available: 1
            }
        );
    }

    #[test]
    fn test_read_empty_body() {
        let m = read_aligned(&[header_byte(1, 0)]).unwrap();
        assert_eq!(m.tag(), 1);
        assert!(m.is_empty());
    }

    #[test]
    fn test_write_frame() {
        assert_eq!(write_aligned(&msg(1, "101")).unwrap(), vec![0x8D, 0b101]);
        assert_eq!(write_aligned(&msg(0, "1")).unwrap(), vec![0x84, 0x01]);

        let frame = write_aligned(&msg(0, "111111110")).unwrap();
        assert_eq!(frame, vec![header_byte(0, 9), 0xFF, 0x00]);
    }

    #[test]
    fn test_write_rejects_unknown_chip() {
        assert_eq!(
            write_aligned(&msg(2, "1")).unwrap_err(),
            AlignedError::InvalidChip(2)
        );
    }

    #[test]
    fn test_directions_pack_differently() {
        let sent = msg(0, "10000000");
        let frame = write_aligned(&sent).unwrap();
        assert_eq!(frame, vec![0xA0, 0x80]);
        assert_eq!(read_aligned(&frame).unwrap().bit_string(), "00000001");
    }

    #[test]
    fn test_splitter_skips_padding_and_waits() {
        let mut splitter = FrameSplitter::new();
        splitter.push(&[0, 0, 188, 237]);
        assert!(splitter.next_frame().is_none());
        assert_eq!(splitter.pending(), 2);

        splitter.push(&[6, 0, 0]);
        assert_eq!(splitter.next_frame(), Some(vec![188, 237, 6]));
        assert!(splitter.next_frame().is_none());
        assert_eq!(splitter.pending(), 0);
    }

    #[test]
    fn test_splitter_multiple_frames_across_transfers() {
        let mut splitter = FrameSplitter::new();
        // Two 5-byte polling transfers
        splitter.push(&[0, header_byte(1, 3), 0b101, header_byte(0, 15), 237]);
        splitter.push(&[6, 0, 0, 0, 0]);

        let messages: Vec<_> = splitter.messages().collect::<Result<_>>().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].tag(), 1);
        assert_eq!(messages[0].bit_string(), "101");
        assert_eq!(messages[1].tag(), 0);
        assert_eq!(messages[1].bit_string(), "101101110110000");
    }

    #[test]
    fn test_splitter_reports_bad_header() {
        let mut splitter = FrameSplitter::new();
        splitter.push(&[0x04, 0xFF]);
        assert_eq!(
            splitter.next_message(),
            Some(Err(AlignedError::MissingMarker(0x04)))
        );
    }

    #[test]
    fn test_join_reassembles_split_reply() {
        let mut splitter = FrameSplitter::new();
        splitter.push(&[header_byte(1, 8), 0xFF, header_byte(1, 8), 0x00]);
        let parts: Vec<_> = splitter.messages().collect::<Result<_>>().unwrap();
        let reply = parts[0].join(&parts[1]).unwrap();
        assert_eq!(reply.length(), 16);
        assert_eq!(reply.bit_string(), "1111111100000000");
    }
}
