// Outbound MUX command frame
// Wire form: reverse8((address << 6) | (0b1000 << 1) | 1), reverse8(payload)

use crate::bitwise::reverse8;
use thiserror::Error;

/// Largest address that fits the 2-bit field
pub const MAX_ADDRESS: u8 = 0b11;

/// Fixed bits of the first command byte below the address field
pub const COMMAND_FLAGS: u8 = (0b1000 << 1) | 1;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Invalid argument: address {0} does not fit in 2 bits")]
    InvalidArgument(u32),
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// A command addressed to one of the chips behind the MUX
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    address: u8,
    payload: u8,
}

impl Command {
    /// Create a command, rejecting addresses wider than 2 bits
    pub fn new(address: u32, payload: u8) -> Result<Self> {
        if address > MAX_ADDRESS as u32 {
            return Err(CommandError::InvalidArgument(address));
        }
        Ok(Self {
            address: address as u8,
            payload,
        })
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn payload(&self) -> u8 {
        self.payload
    }

    /// First byte before bit reversal
    pub fn header_byte(&self) -> u8 {
        (self.address << 6) | COMMAND_FLAGS
    }

    /// Encode to the two bytes put on the bus
    pub fn encode(&self) -> [u8; 2] {
        [reverse8(self.header_byte()), reverse8(self.payload)]
    }
}

/// Encode a command frame for `address` carrying `payload`
pub fn encode_command(address: u32, payload: u8) -> Result<[u8; 2]> {
    Command::new(address, payload).map(|cmd| cmd.encode())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_frame() {
        // (0 << 6) | 0b10000 | 1 = 0b0001_0001 -> reversed 0b1000_1000
        assert_eq!(encode_command(0, 0x01).unwrap(), [0b1000_1000, 0b1000_0000]);
        // (2 << 6) | 0b10001 = 0b1001_0001 -> reversed 0b1000_1001
        assert_eq!(encode_command(2, 0xF0).unwrap(), [0b1000_1001, 0x0F]);
    }

    #[test]
    fn test_encode_reconstructs_fields() {
        for address in 0..=3u32 {
            for payload in 0..=255u8 {
                let [b1, b2] = encode_command(address, payload).unwrap();
                assert_eq!(reverse8(b1), ((address as u8) << 6) | (0b1000 << 1) | 1);
                assert_eq!(reverse8(b2), payload);
            }
        }
    }

    #[test]
    fn test_address_out_of_range() {
        assert_eq!(
            encode_command(4, 0).unwrap_err(),
            CommandError::InvalidArgument(4)
        );
        assert!(Command::new(u32::MAX, 0xAA).is_err());
    }

    #[test]
    fn test_command_accessors() {
        let cmd = Command::new(3, 0x5A).unwrap();
        assert_eq!(cmd.address(), 3);
        assert_eq!(cmd.payload(), 0x5A);
        assert_eq!(cmd.header_byte(), 0b1101_0001);
    }
}
