// MUX client: command/response transactions over an SPI bus

use super::transfer::{check_duplex, BusError, SpiTransfer};
use crate::bitwise::Bitstream;
use crate::core::MuxConfig;
use crate::protocol::aligned::{self, AlignedError, FrameSplitter, TRANSFER_LEN};
use crate::protocol::{
    check_complement_echo, complement_echo_pattern, decode_report, Command, CommandError,
    DecodeReport, EchoMismatch, Message,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Bus error: {0}")]
    Bus(#[from] BusError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Frame error: {0}")]
    Aligned(#[from] AlignedError),

    #[error("Echo check failed: {0}")]
    Echo(#[from] EchoMismatch),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Talks to the MUX over any `SpiTransfer` bus
///
/// Each `query` is a self-contained transaction. Only the aligned-frame
/// splitter keeps bytes between polls, since the polling firmware may split
/// a frame across transfers.
pub struct MuxClient<B: SpiTransfer> {
    bus: B,
    config: MuxConfig,
    splitter: FrameSplitter,
}

impl<B: SpiTransfer> MuxClient<B> {
    pub fn new(bus: B, config: MuxConfig) -> Self {
        Self {
            bus,
            config,
            splitter: FrameSplitter::new(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &MuxConfig {
        &self.config
    }

    /// Give back the underlying bus
    pub fn into_inner(self) -> B {
        self.bus
    }

    /// Transfer fixed bytes and return what came back
    pub fn transfer_raw(&mut self, tx: &[u8]) -> Result<Vec<u8>> {
        let rx = self.bus.transfer(tx)?;
        check_duplex(tx.len(), &rx)?;
        tracing::debug!("Sent {:02X?}, received {:02X?}", tx, rx);
        Ok(rx)
    }

    /// Put an encoded command on the bus; returns the bytes clocked back
    pub fn send_command(&mut self, command: &Command) -> Result<Vec<u8>> {
        let frame = command.encode();
        tracing::debug!(
            "Sending command to address {}: payload {:#010b}",
            command.address(),
            command.payload()
        );
        self.transfer_raw(&frame)
    }

    /// Clock out one response buffer of the configured length
    pub fn read_response(&mut self) -> Result<Vec<u8>> {
        let len = self.config.response_len;
        let rx = self.bus.read(len)?;
        check_duplex(len, &rx)?;
        Ok(rx)
    }

    /// Decode a response buffer with the configured bit order
    pub fn decode_response(&self, buffer: &[u8]) -> DecodeReport {
        let stream = Bitstream::from_bytes(buffer, self.config.bit_order);
        let report = decode_report(&stream);

        tracing::info!(
            "Decoded {} message(s) from {} bytes",
            report.messages.len(),
            buffer.len()
        );
        if let Some(truncated) = &report.discarded {
            tracing::debug!("Response ended inside a frame at bit {}", truncated.marker);
        }
        report
    }

    /// Send a command, wait for the MUX to settle, and read the raw response
    pub async fn query_raw(&mut self, command: &Command) -> Result<Vec<u8>> {
        self.send_command(command)?;

        let settle = self.config.settle();
        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }

        self.read_response()
    }

    /// Send a command and decode its response
    pub async fn query_report(&mut self, command: &Command) -> Result<DecodeReport> {
        let buffer = self.query_raw(command).await?;
        Ok(self.decode_response(&buffer))
    }

    /// Send a command and return the decoded messages
    pub async fn query(&mut self, command: &Command) -> Result<Vec<Message>> {
        Ok(self.query_report(command).await?.messages)
    }

    /// Send an aligned frame to one of the chips
    ///
    /// Bytes received during the transfer go through the frame splitter, so
    /// frames arriving at the same time are returned by the next poll.
    pub fn send_aligned(&mut self, message: &Message) -> Result<()> {
        let mut frame = aligned::write_aligned(message)?;
        frame.resize(TRANSFER_LEN.max(frame.len()), 0);
        let rx = self.transfer_raw(&frame)?;
        self.splitter.push(&rx);
        Ok(())
    }

    /// Clock out one idle transfer and return every complete aligned frame
    ///
    /// Each frame is decoded on its own, so a bad header does not take the
    /// frames around it down with it. Only bus failures fail the poll.
    pub fn poll_aligned(&mut self) -> Result<Vec<aligned::Result<Message>>> {
        let rx = self.transfer_raw(&[0u8; TRANSFER_LEN])?;
        self.splitter.push(&rx);

        let frames: Vec<_> = self.splitter.messages().collect();
        for err in frames.iter().filter_map(|f| f.as_ref().err()) {
            tracing::warn!("Dropping aligned frame: {}", err);
        }
        if !frames.is_empty() {
            tracing::debug!("Polled {} aligned frame(s)", frames.len());
        }
        Ok(frames)
    }

    /// Run the complement echo test against the loopback firmware
    pub fn echo_check(&mut self) -> Result<()> {
        let pattern = complement_echo_pattern();
        let received = self.transfer_raw(&pattern)?;
        check_complement_echo(&pattern, &received)?;
        tracing::info!("Echo check passed for {} bytes", pattern.len());
        Ok(())
    }
}
