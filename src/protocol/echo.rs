// Echo check for the loopback test firmware
// The firmware answers every byte with the complement of the byte before it.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EchoMismatch {
    #[error("Echo length mismatch: sent {sent} bytes, received {received}")]
    Length { sent: usize, received: usize },

    #[error("Echo mismatch at byte {index}: expected {expected:#04x}, got {actual:#04x}")]
    Byte {
        index: usize,
        expected: u8,
        actual: u8,
    },
}

/// Every byte value once, in order
pub fn complement_echo_pattern() -> Vec<u8> {
    (0..=255u8).collect()
}

/// Verify that `received[i + 1] == !sent[i]` for the whole transfer
///
/// The first received byte is whatever the firmware held before the
/// transfer and is not checked.
pub fn check_complement_echo(sent: &[u8], received: &[u8]) -> Result<(), EchoMismatch> {
    if sent.len() != received.len() {
        return Err(EchoMismatch::Length {
            sent: sent.len(),
            received: received.len(),
        });
    }

    for (i, (&tx, &rx)) in sent.iter().zip(received.iter().skip(1)).enumerate() {
        if rx != !tx {
            return Err(EchoMismatch::Byte {
                index: i + 1,
                expected: !tx,
                actual: rx,
            });
        }
    }

    Ok(())
}
