// Mock SPI bus for testing without hardware

use super::transfer::{Result, SpiTransfer};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Mock bus that replays queued responses
///
/// Clones share their buffers, so a test can keep a handle after moving the
/// bus into a client. With nothing queued the bus answers with zeros, like an
/// idle MUX.
#[derive(Clone, Default)]
pub struct MockBus {
    /// Responses for upcoming transfers (simulates the MUX)
    responses: Arc<Mutex<VecDeque<Vec<u8>>>>,

    /// Every transfer sent, in order
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the bytes returned by the next transfer
    pub fn push_response(&self, data: &[u8]) {
        self.responses.lock().unwrap().push_back(data.to_vec());
    }

    /// Get all transfers sent so far
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of responses not yet consumed
    pub fn queued(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

impl SpiTransfer for MockBus {
    fn transfer(&mut self, tx: &[u8]) -> Result<Vec<u8>> {
        self.sent.lock().unwrap().push(tx.to_vec());

        let mut rx = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default();
        rx.resize(tx.len(), 0);
        Ok(rx)
    }
}

/// Helper to create a mock bus with pre-loaded responses
pub fn mock_bus_with_responses(responses: &[&[u8]]) -> MockBus {
    let bus = MockBus::new();
    for response in responses {
        bus.push_response(response);
    }
    bus
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_replays_in_order() {
        let mut bus = mock_bus_with_responses(&[&[1, 2], &[3]]);
        assert_eq!(bus.transfer(&[9, 9]).unwrap(), vec![1, 2]);
        assert_eq!(bus.transfer(&[9]).unwrap(), vec![3]);
        assert_eq!(bus.queued(), 0);
        assert_eq!(bus.sent(), vec![vec![9, 9], vec![9]]);
    }

    #[test]
    fn test_mock_idle_and_resize() {
        let mut bus = MockBus::new();
        assert_eq!(bus.read(4).unwrap(), vec![0; 4]);

        bus.push_response(&[7, 7, 7]);
        assert_eq!(bus.transfer(&[0]).unwrap(), vec![7]);
    }

    #[test]
    fn test_mock_clones_share_state() {
        let handle = MockBus::new();
        let mut bus = handle.clone();
        handle.push_response(&[5]);
        bus.transfer(&[1]).unwrap();
        assert_eq!(handle.sent(), vec![vec![1]]);
    }
}
