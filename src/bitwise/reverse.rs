// Bit reversal helpers
// The MUX shifts every byte out least significant bit first, so both
// directions of the bus go through reverse8.

/// Reverse the bit order of a byte (bit 7 <-> bit 0, bit 6 <-> bit 1, ...)
/// Example: 0b1000_0000 -> 0b0000_0001, 0b1101_0000 -> 0b0000_1011
#[inline]
pub fn reverse8(mut byte: u8) -> u8 {
    byte = (byte & 0xF0) >> 4 | (byte & 0x0F) << 4;
    byte = (byte & 0xCC) >> 2 | (byte & 0x33) << 2;
    byte = (byte & 0xAA) >> 1 | (byte & 0x55) << 1;
    byte
}

/// Reverse every byte of a buffer
pub fn reverse_all(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().map(|&b| reverse8(b)).collect()
}
