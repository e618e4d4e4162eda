//! Byte-level bus transport trait.
//!
//! The controller bus is SPI mode 3, LSB first, with an active-low
//! attention (chip select) line and an open-collector acknowledge line the
//! peripheral pulses after each byte it accepts. Implementations wrap
//! whatever gives access to those wires (a hardware SPI peripheral, a
//! bit-banged GPIO block, an FTDI bridge); all pacing and framing decisions
//! stay in the driver.

/// One half-duplex bus port with a single peripheral behind it.
///
/// All operations are infallible at this level: a dead or absent peripheral
/// simply returns 0xFF data and never acknowledges, which the layers above
/// classify as "no reply".
pub trait Transport {
    /// Assert the attention line.
    fn select(&mut self);

    /// Release the attention line.
    fn deselect(&mut self);

    /// Clock one byte out while sampling one byte in.
    fn exchange_byte(&mut self, out: u8) -> u8;

    /// Non-blocking check of the acknowledge line. Cleared by the next
    /// `exchange_byte`.
    fn acknowledged(&mut self) -> bool;

    /// Whether this wiring has the acknowledge line connected at all.
    /// Without it the driver falls back to a fixed inter-byte delay.
    fn has_ack_line(&self) -> bool {
        true
    }
}

pub mod mock {
    use super::Transport;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct Inner {
        replies: VecDeque<Vec<u8>>,
        frames: Vec<Vec<u8>>,
        current: Option<Vec<u8>>,
        cursor: usize,
        selected: bool,
    }

    /// Scripted transport: each select consumes the next queued reply and
    /// plays it back byte for byte, recording everything the driver sends.
    ///
    /// With no reply queued the mock behaves like an empty port: all-0xFF
    /// data and no acknowledge pulses. Clones share the same script and
    /// recording, letting a test keep a handle while the driver owns its
    /// own copy.
    #[derive(Debug, Clone)]
    pub struct MockTransport {
        inner: Arc<Mutex<Inner>>,
        ack_line: bool,
    }

    impl Default for MockTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self {
                inner: Arc::new(Mutex::new(Inner::default())),
                ack_line: true,
            }
        }

        /// A wiring without the acknowledge line connected.
        pub fn without_ack_line() -> Self {
            Self {
                ack_line: false,
                ..Self::new()
            }
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
            self.inner.lock().unwrap_or_else(|e| e.into_inner())
        }

        /// Queue the reply played back at the next select.
        pub fn queue_reply(&self, reply: Vec<u8>) {
            self.lock().replies.push_back(reply);
        }

        /// Every frame the driver has sent, one `Vec<u8>` per select.
        pub fn sent_frames(&self) -> Vec<Vec<u8>> {
            self.lock().frames.clone()
        }

        /// Whether the attention line is currently asserted.
        pub fn is_selected(&self) -> bool {
            self.lock().selected
        }
    }

    impl Transport for MockTransport {
        fn select(&mut self) {
            let mut inner = self.lock();
            inner.selected = true;
            inner.cursor = 0;
            inner.current = inner.replies.pop_front();
            inner.frames.push(Vec::new());
        }

        fn deselect(&mut self) {
            let mut inner = self.lock();
            inner.selected = false;
            inner.current = None;
        }

        fn exchange_byte(&mut self, out: u8) -> u8 {
            let mut inner = self.lock();
            if let Some(frame) = inner.frames.last_mut() {
                frame.push(out);
            }
            let cursor = inner.cursor;
            inner.cursor += 1;
            inner
                .current
                .as_ref()
                .and_then(|reply| reply.get(cursor))
                .copied()
                .unwrap_or(0xFF)
        }

        fn acknowledged(&mut self) -> bool {
            // A scripted device acknowledges every byte; an empty port never
            // does.
            self.lock().current.is_some()
        }

        fn has_ack_line(&self) -> bool {
            self.ack_line
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockTransport;
    use super::*;

    #[test]
    fn mock_plays_back_queued_reply() {
        let mut transport = MockTransport::new();
        transport.queue_reply(vec![0xAA, 0xBB]);

        transport.select();
        assert!(transport.is_selected());
        assert_eq!(transport.exchange_byte(0x01), 0xAA);
        assert!(transport.acknowledged());
        assert_eq!(transport.exchange_byte(0x42), 0xBB);
        // Past the scripted bytes the line idles high.
        assert_eq!(transport.exchange_byte(0x00), 0xFF);
        transport.deselect();
        assert!(!transport.is_selected());

        assert_eq!(transport.sent_frames(), vec![vec![0x01, 0x42, 0x00]]);
    }

    #[test]
    fn empty_port_never_acknowledges() {
        let mut transport = MockTransport::new();
        transport.select();
        assert_eq!(transport.exchange_byte(0x01), 0xFF);
        assert!(!transport.acknowledged());
    }

    #[test]
    fn clones_share_script_and_recording() {
        let handle = MockTransport::new();
        let mut transport = handle.clone();
        handle.queue_reply(vec![0x01]);

        transport.select();
        assert_eq!(transport.exchange_byte(0x55), 0x01);
        assert_eq!(handle.sent_frames(), vec![vec![0x55]]);
    }
}
