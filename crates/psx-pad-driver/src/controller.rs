//! Single-controller interface: polling plus the configuration-mode
//! command sequencer.

use std::time::Duration;

use psx_pad_protocol::{
    ControllerType, PadState, ReplyKind, build_enable_rumble, build_enter_config,
    build_exit_config, build_poll, build_set_mode, build_set_pressures, build_type_read,
    classify_reply, decode_reply, identify_controller_type,
};
use tracing::{debug, trace, warn};

use crate::clock::Clock;
use crate::exchange::FrameExchanger;
use crate::transport::Transport;
use crate::{PadError, PadResult};

/// Spacing between attempts of one configuration command.
pub(crate) const COMMAND_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Wall-clock budget for one configuration command.
pub(crate) const COMMAND_TIMEOUT: Duration = Duration::from_millis(250);

/// Settle delay after a configuration command completes, success or not.
/// Controllers need this long before they answer polls coherently again.
pub(crate) const MODE_SWITCH_SETTLE: Duration = Duration::from_millis(500);

/// Replies in a row a mode toggle needs before it counts as applied.
/// Empirical; one reply is not enough on real hardware.
const MODE_TOGGLE_CONFIRMATIONS: u8 = 3;

/// Disposable polls sent before the first one that counts. Controllers
/// ignore the first few frames after power-up or a replug.
const WARM_UP_READS: usize = 5;

/// When a configuration command counts as having taken effect.
#[derive(Debug, Clone, Copy)]
enum SuccessRule {
    /// The reply classifies as configuration mode.
    ConfigReply,
    /// The reply no longer classifies as configuration mode.
    NonConfigReply,
    /// This many well-formed replies in a row, any protocol. A missing
    /// reply resets the count.
    ConsecutiveReplies(u8),
}

/// One directly-attached controller.
///
/// Owns the frame exchanger and the canonical [`PadState`]; callers read
/// state through [`state`](Self::state) or the reference `poll` returns.
#[derive(Debug)]
pub struct PsxController<T, C> {
    link: FrameExchanger<T, C>,
    state: PadState,
    slot: u8,
    rumble_enabled: bool,
}

impl<T: Transport, C: Clock> PsxController<T, C> {
    pub fn new(transport: T, clock: C) -> Self {
        Self {
            link: FrameExchanger::new(transport, clock),
            state: PadState::new(),
            slot: 0,
            rumble_enabled: false,
        }
    }

    /// State as of the last successful poll.
    pub fn state(&self) -> &PadState {
        &self.state
    }

    /// Request a rumble state. Folded into poll frames once
    /// [`enable_rumble`](Self::enable_rumble) has succeeded.
    pub fn set_rumble(&mut self, motor1_active: bool, motor2_level: u8) {
        self.state.set_rumble(motor1_active, motor2_level);
    }

    /// Wake the controller and check that something supported answers.
    ///
    /// A handful of disposable polls (paced by the attention interval)
    /// precedes the one whose result counts. Call this before anything
    /// else, and again after an unplug.
    ///
    /// # Errors
    ///
    /// [`PadError::NoReply`] when the deciding poll went unanswered.
    pub fn begin(&mut self) -> PadResult<&PadState> {
        for attempt in 0..WARM_UP_READS {
            if let Err(error) = self.poll() {
                trace!(attempt, %error, "warm-up poll unanswered");
            }
        }
        self.poll()
    }

    /// Poll the controller once and decode the reply into the state.
    ///
    /// A controller found lingering in configuration mode (after a brownout
    /// or a mid-sequence unplug) is sent an exit-config as recovery; the
    /// poll itself still reports failure.
    ///
    /// # Errors
    ///
    /// [`PadError::NoReply`] when nothing answered or the reply was
    /// malformed. Previous state stays put, except the analog validity
    /// flags, which drop at the start of every attempt.
    pub fn poll(&mut self) -> PadResult<&PadState> {
        self.state.invalidate_analog();
        let rumble = self.rumble_enabled.then(|| self.state.rumble_request());
        let command = build_poll(self.slot, rumble);

        let kind = match self.link.exchange(&command) {
            Some(reply) => {
                let kind = classify_reply(reply.get(1).copied().unwrap_or(0xFF));
                if kind != ReplyKind::ConfigMode {
                    decode_reply(kind, reply, &mut self.state);
                }
                kind
            }
            None => return Err(PadError::NoReply),
        };

        if kind == ReplyKind::ConfigMode {
            warn!("controller stuck in config mode, sending exit-config");
            if let Err(error) = self.exit_config() {
                warn!(%error, "config-mode recovery failed");
            }
            return Err(PadError::NoReply);
        }

        Ok(&self.state)
    }

    /// Put the controller into configuration (escape) mode.
    ///
    /// # Errors
    ///
    /// [`PadError::CommandTimeout`] when the controller never produced a
    /// config-mode reply within the retry budget.
    pub fn enter_config(&mut self) -> PadResult<()> {
        let command = build_enter_config(self.slot);
        self.run_command(&command, SuccessRule::ConfigReply)?;
        Ok(())
    }

    /// Leave configuration mode.
    ///
    /// # Errors
    ///
    /// [`PadError::CommandTimeout`] when the controller kept answering in
    /// config mode for the whole retry budget.
    pub fn exit_config(&mut self) -> PadResult<()> {
        let command = build_exit_config(self.slot);
        self.run_command(&command, SuccessRule::NonConfigReply)?;
        Ok(())
    }

    /// Toggle the analog sticks. Must be called in configuration mode;
    /// `locked` also disables the controller's own ANALOG button.
    ///
    /// # Errors
    ///
    /// [`PadError::CommandTimeout`] when confirmation never arrived.
    pub fn enable_analog_sticks(&mut self, enabled: bool, locked: bool) -> PadResult<()> {
        let command = build_set_mode(self.slot, enabled, locked);
        self.run_command(
            &command,
            SuccessRule::ConsecutiveReplies(MODE_TOGGLE_CONFIRMATIONS),
        )?;
        Ok(())
    }

    /// Toggle pressure-sensitive button reporting (DualShock 2 only). Must
    /// be called in configuration mode.
    ///
    /// # Errors
    ///
    /// [`PadError::CommandTimeout`] when confirmation never arrived.
    pub fn enable_analog_buttons(&mut self, enabled: bool) -> PadResult<()> {
        let command = build_set_pressures(self.slot, enabled);
        self.run_command(
            &command,
            SuccessRule::ConsecutiveReplies(MODE_TOGGLE_CONFIRMATIONS),
        )?;
        Ok(())
    }

    /// Map the rumble motors onto poll frames. Must be called in
    /// configuration mode; afterwards every poll carries the motor bytes
    /// set through [`set_rumble`](Self::set_rumble).
    ///
    /// # Errors
    ///
    /// [`PadError::CommandTimeout`] when confirmation never arrived; rumble
    /// stays disabled in that case.
    pub fn enable_rumble(&mut self) -> PadResult<()> {
        let command = build_enable_rumble(self.slot);
        self.run_command(
            &command,
            SuccessRule::ConsecutiveReplies(MODE_TOGGLE_CONFIRMATIONS),
        )?;
        self.rumble_enabled = true;
        Ok(())
    }

    /// Read the controller type. Must be called in configuration mode.
    ///
    /// Known to misreport on some hardware; prefer
    /// [`PadState::protocol`] where it answers the question.
    ///
    /// # Errors
    ///
    /// [`PadError::CommandTimeout`] when the controller never answered the
    /// type-read in config mode.
    pub fn controller_type(&mut self) -> PadResult<ControllerType> {
        let command = build_type_read(self.slot);
        let reply = self.run_command(&command, SuccessRule::ConfigReply)?;
        Ok(identify_controller_type(&reply))
    }

    /// Send one configuration command until its success rule holds.
    ///
    /// Retries at a fixed interval within the wall-clock budget, then
    /// settles regardless of outcome. Returns the reply that satisfied the
    /// rule.
    fn run_command(&mut self, command: &[u8], rule: SuccessRule) -> PadResult<Vec<u8>> {
        let deadline = self.link.now() + COMMAND_TIMEOUT;
        let needed = match rule {
            SuccessRule::ConsecutiveReplies(n) => n,
            _ => 1,
        };
        let mut streak: u8 = 0;
        let mut attempts: u32 = 0;

        let result = loop {
            attempts += 1;
            let mut last_reply = Vec::new();
            let success = match self.link.exchange(command) {
                Some(reply) => {
                    last_reply = reply.to_vec();
                    let kind = classify_reply(reply.get(1).copied().unwrap_or(0xFF));
                    match rule {
                        SuccessRule::ConfigReply => kind == ReplyKind::ConfigMode,
                        SuccessRule::NonConfigReply => kind != ReplyKind::ConfigMode,
                        SuccessRule::ConsecutiveReplies(_) => true,
                    }
                }
                None => false,
            };

            if success {
                streak += 1;
            } else {
                streak = 0;
            }
            if streak >= needed {
                debug!(attempts, command = command[1], "config command applied");
                break Ok(last_reply);
            }
            if self.link.now() >= deadline {
                warn!(attempts, command = command[1], "config command timed out");
                break Err(PadError::CommandTimeout);
            }
            self.link.sleep(COMMAND_RETRY_INTERVAL);
        };

        self.link.sleep(MODE_SWITCH_SETTLE);
        result
    }
}
