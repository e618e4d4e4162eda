//! Paced multi-byte frame exchange.

use std::time::Duration;

use psx_pad_protocol::{CMD_BUFFER_SIZE, PADDING_BYTE, is_valid_header, reply_length};
use tracing::{trace, warn};

use crate::clock::Clock;
use crate::transport::Transport;

/// Minimum spacing between frames. Controllers expect to be polled at most
/// once per video field (60 Hz) and misbehave when driven faster.
pub const ATTENTION_INTERVAL: Duration = Duration::from_micros(1_000_000 / 60);

/// How long to wait for the acknowledge pulse after each byte.
const ACK_TIMEOUT: Duration = Duration::from_micros(100);

/// Inter-byte delay used when the transport has no acknowledge line.
const INTER_BYTE_DELAY: Duration = Duration::from_micros(15);

/// Address echo, discriminator, padding/config marker.
const HEADER_LEN: usize = 3;

/// One command/reply exchange over the attention window.
///
/// Owns the transport, the clock and a fixed reply buffer. Reply views
/// returned by [`exchange`](Self::exchange) borrow from that buffer and die
/// at the next exchange.
#[derive(Debug)]
pub struct FrameExchanger<T, C> {
    transport: T,
    clock: C,
    buffer: [u8; CMD_BUFFER_SIZE],
    last_deselect: Option<Duration>,
}

impl<T: Transport, C: Clock> FrameExchanger<T, C> {
    pub fn new(transport: T, clock: C) -> Self {
        Self {
            transport,
            clock,
            buffer: [0; CMD_BUFFER_SIZE],
            last_deselect: None,
        }
    }

    pub(crate) fn now(&mut self) -> Duration {
        self.clock.now()
    }

    pub(crate) fn sleep(&mut self, duration: Duration) {
        self.clock.sleep(duration);
    }

    /// Exchange one frame: clock `command` out (padded with 0x5A once
    /// exhausted) and collect the reply.
    ///
    /// The reply is self-sizing: its second byte tells how many payload
    /// bytes follow the 3-byte header, and the exchange always covers the
    /// longer of reply and command. Returns `None` when nothing answered,
    /// the header was malformed, or the frame would not fit the buffer.
    pub fn exchange(&mut self, command: &[u8]) -> Option<&[u8]> {
        if command.len() > CMD_BUFFER_SIZE {
            warn!(len = command.len(), "command too long for exchange buffer");
            return None;
        }

        self.pace();
        self.transport.select();

        // The header is never the end of a frame (every reply carries at
        // least a 2-byte payload), so each header byte gets an ack wait.
        for i in 0..HEADER_LEN {
            let out = command.get(i).copied().unwrap_or(PADDING_BYTE);
            self.buffer[i] = self.transport.exchange_byte(out);
            if !self.wait_ack() {
                trace!(byte = i, "no ack during header, aborting frame");
                self.finish();
                return None;
            }
        }

        if !is_valid_header(&self.buffer[..HEADER_LEN]) {
            trace!(
                discriminator = self.buffer[1],
                "malformed reply header"
            );
            self.finish();
            return None;
        }

        let payload = reply_length(self.buffer[1]);
        let total = HEADER_LEN + payload.max(command.len().saturating_sub(HEADER_LEN));
        if total > CMD_BUFFER_SIZE {
            warn!(total, "reply does not fit the exchange buffer");
            self.finish();
            return None;
        }

        for i in HEADER_LEN..total {
            let out = command.get(i).copied().unwrap_or(PADDING_BYTE);
            self.buffer[i] = self.transport.exchange_byte(out);
            // No ack follows the final byte of a frame.
            if i + 1 < total && !self.wait_ack() {
                trace!(byte = i, "no ack mid-frame, aborting");
                self.finish();
                return None;
            }
        }

        self.finish();
        trace!(total, discriminator = self.buffer[1], "frame exchanged");
        Some(&self.buffer[..total])
    }

    /// Hold off until the attention interval since the previous frame has
    /// passed.
    fn pace(&mut self) {
        if let Some(last) = self.last_deselect {
            let elapsed = self.clock.now().saturating_sub(last);
            if elapsed < ATTENTION_INTERVAL {
                self.clock.sleep(ATTENTION_INTERVAL - elapsed);
            }
        }
    }

    fn finish(&mut self) {
        self.transport.deselect();
        self.last_deselect = Some(self.clock.now());
    }

    /// Wait for the peripheral to acknowledge the last byte.
    ///
    /// Returns `false` when the pulse never came within the timeout. On
    /// wirings without an ack line this degrades to a fixed delay.
    fn wait_ack(&mut self) -> bool {
        if !self.transport.has_ack_line() {
            self.clock.sleep(INTER_BYTE_DELAY);
            return true;
        }
        let start = self.clock.now();
        while !self.transport.acknowledged() {
            if self.clock.now().saturating_sub(start) >= ACK_TIMEOUT {
                return false;
            }
        }
        true
    }
}
