//! Multi-tap fan-out: one frame, four controllers.

use psx_pad_protocol::{
    MULTITAP_SLOT_COUNT, PadState, ReplyKind, build_multitap_poll, classify_reply,
    decode_multitap_slot, multitap_slot,
};
use tracing::{debug, trace};

use crate::clock::Clock;
use crate::exchange::FrameExchanger;
use crate::transport::Transport;
use crate::{PadError, PadResult};

/// A four-port multi-tap on the bus.
///
/// The tap answers the extended poll frame with all four slots in one
/// 35-byte reply; each slot is classified and decoded independently.
/// Controllers behind a tap cannot carry DualShock 2 pressure data and
/// cannot be put through configuration commands, so they stay in whatever
/// mode their own ANALOG button selects.
#[derive(Debug)]
pub struct MultiTap<T, C> {
    link: FrameExchanger<T, C>,
    states: [PadState; MULTITAP_SLOT_COUNT],
}

impl<T: Transport, C: Clock> MultiTap<T, C> {
    pub fn new(transport: T, clock: C) -> Self {
        Self {
            link: FrameExchanger::new(transport, clock),
            states: std::array::from_fn(|_| PadState::new()),
        }
    }

    /// State of one slot as of the last successful poll.
    pub fn state(&self, slot: usize) -> Option<&PadState> {
        self.states.get(slot)
    }

    /// Detect and enable the multi-tap.
    ///
    /// The first extended frame only switches the tap into multi-tap
    /// replies; whatever was attached answers it in its previous mode. The
    /// second frame (spaced by the exchanger's attention interval) must
    /// then come back as a multi-tap reply.
    ///
    /// # Errors
    ///
    /// [`PadError::NoReply`] when no tap answered the second frame.
    pub fn enable(&mut self) -> PadResult<()> {
        let frame = build_multitap_poll();

        let primed = self.link.exchange(&frame).is_some();
        trace!(primed, "first multi-tap frame sent");

        match self.classify_exchange(&frame) {
            Some(ReplyKind::MultiTapPresent) => {
                debug!("multi-tap detected");
                Ok(())
            }
            _ => Err(PadError::NoReply),
        }
    }

    /// Poll all four slots with one frame.
    ///
    /// # Errors
    ///
    /// [`PadError::NoReply`] when the bus did not answer with a multi-tap
    /// reply (tap unplugged, or a bare controller attached instead). Slot
    /// states keep their previous values except the validity flags.
    pub fn poll(&mut self) -> PadResult<&[PadState; MULTITAP_SLOT_COUNT]> {
        for state in &mut self.states {
            state.invalidate_analog();
        }

        let frame = build_multitap_poll();
        let Some(reply) = self.link.exchange(&frame) else {
            return Err(PadError::NoReply);
        };
        if classify_reply(reply.get(1).copied().unwrap_or(0xFF)) != ReplyKind::MultiTapPresent {
            return Err(PadError::NoReply);
        }

        for (slot, state) in self.states.iter_mut().enumerate() {
            match multitap_slot(reply, slot) {
                Some(view) => decode_multitap_slot(view, state),
                // Truncated tap reply; treat the slot as gone.
                None => state.clear(),
            }
        }

        Ok(&self.states)
    }

    fn classify_exchange(&mut self, frame: &[u8]) -> Option<ReplyKind> {
        let reply = self.link.exchange(frame)?;
        Some(classify_reply(reply.get(1).copied().unwrap_or(0xFF)))
    }
}
