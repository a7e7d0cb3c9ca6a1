// Common type definitions for bit-level parsing

use serde::{Deserialize, Serialize};

/// Order in which the bits of each received byte enter the bitstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BitOrder {
    /// Each byte is bit-reversed first, so its least significant bit is read first
    Reversed,
    /// Each byte is read most significant bit first, as it arrives
    Natural,
}

impl BitOrder {
    pub fn is_reversed(&self) -> bool {
        matches!(self, BitOrder::Reversed)
    }

    pub fn is_natural(&self) -> bool {
        matches!(self, BitOrder::Natural)
    }
}

impl Default for BitOrder {
    fn default() -> Self {
        BitOrder::Reversed
    }
}

impl std::str::FromStr for BitOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reversed" | "lsb" => Ok(BitOrder::Reversed),
            "natural" | "msb" => Ok(BitOrder::Natural),
            other => Err(format!("Unknown bit order: {}", other)),
        }
    }
}

/// Render bits as a string of '0' and '1'
pub fn bits_to_string(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// Parse a string of '0' and '1' into bits; any other character is rejected
pub fn bits_from_str(text: &str) -> Option<Vec<bool>> {
    text.chars()
        .map(|c| match c {
            '0' => Some(false),
            '1' => Some(true),
            _ => None,
        })
        .collect()
}

/// Interpret bits as an unsigned integer, first bit most significant
pub fn bits_to_uint_msb(bits: &[bool]) -> u32 {
    bits.iter().fold(0, |acc, &b| (acc << 1) | b as u32)
}

/// Interpret bits as an unsigned integer, first bit least significant
pub fn bits_to_uint_lsb(bits: &[bool]) -> u32 {
    bits.iter().rev().fold(0, |acc, &b| (acc << 1) | b as u32)
}
