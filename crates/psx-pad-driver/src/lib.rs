//! Bus master for PlayStation controllers and multi-taps.
//!
//! This crate owns everything that touches time and wires: the [`Transport`]
//! and [`Clock`] trait seams, the paced frame exchanger, the retrying
//! configuration-mode sequencer and the multi-tap fan-out. All byte-level
//! knowledge (command templates, reply classification, decoding) lives in
//! `psx-pad-protocol`.
//!
//! The driver is single-threaded and blocking: one frame is in flight at a
//! time, and the only intra-byte blocking point is the bounded acknowledge
//! wait. Configuration commands may block for their full retry budget plus
//! the settle delay, so keep them out of latency-sensitive paths.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod clock;
pub mod controller;
pub mod exchange;
pub mod multitap;
pub mod transport;

pub use clock::{Clock, SystemClock};
pub use controller::PsxController;
pub use exchange::FrameExchanger;
pub use multitap::MultiTap;
pub use transport::Transport;

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadError {
    /// No well-formed reply on the bus: nothing attached, an unsupported
    /// device, or a frame that died mid-exchange.
    #[error("no valid reply from controller")]
    NoReply,

    /// A configuration command did not reach its success condition within
    /// the retry budget.
    #[error("configuration command timed out")]
    CommandTimeout,
}

pub type PadResult<T> = Result<T, PadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            format!("{}", PadError::NoReply),
            "no valid reply from controller"
        );
        assert_eq!(
            format!("{}", PadError::CommandTimeout),
            "configuration command timed out"
        );
    }
}
