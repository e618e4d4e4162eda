//! Per-protocol reply decoding into [`PadState`].
//!
//! Decoding is a total function: any byte slice and any [`ReplyKind`]
//! produce a well-defined state update and never panic. Truncated replies
//! simply leave the affected validity flags down.

use tracing::trace;

use crate::reply::{ReplyKind, classify_reply};
use crate::state::{ANALOG_BUTTON_COUNT, AnalogButton, Button, ControllerType, PadState, Protocol};

/// Analog level at which the neGcon's I/II buttons count as digitally
/// pressed. Empirically tuned; do not expect it to generalize to
/// third-party wheels.
pub const NEGCON_I_II_BUTTON_THRESHOLD: u8 = 128;

/// Analog level at which the neGcon's L button counts as digitally pressed.
/// Tuned so L triggers at about the same depth as the non-analog R button.
pub const NEGCON_L_BUTTON_THRESHOLD: u8 = 240;

/// First reply byte carrying DualShock 2 button pressure data.
const ANALOG_BUTTON_BASE: usize = 9;

fn byte_at(reply: &[u8], index: usize, fallback: u8) -> u8 {
    reply.get(index).copied().unwrap_or(fallback)
}

/// Decode a directly-attached controller's poll reply.
///
/// `kind` should come from [`classify_reply`] on the same bytes. Replies
/// that match no known shape decode as [`Protocol::Digital`]: they still
/// carry a button word in bytes 3–4, and treating them as digital is what
/// real consoles do.
pub fn decode_reply(kind: ReplyKind, reply: &[u8], state: &mut PadState) {
    let protocol = match kind {
        ReplyKind::DualShock2 => Protocol::DualShock2,
        ReplyKind::DualShock => Protocol::DualShock,
        ReplyKind::Flightstick => Protocol::Flightstick,
        ReplyKind::Guncon => Protocol::Guncon,
        ReplyKind::Negcon => Protocol::Negcon,
        ReplyKind::Jogcon => Protocol::Jogcon,
        _ => Protocol::Digital,
    };
    apply(protocol, reply, state);
}

/// Decode one slot view of a multi-tap reply.
///
/// Runs the same classifier and decoder as the direct path, with two
/// multi-tap quirks: unmatched slots stay [`Protocol::Unknown`] (an empty
/// slot answers all-0xFF), and DualShock 2 pads are decoded as plain
/// DualShock because the tap cannot carry the pressure block.
pub fn decode_multitap_slot(slot: &[u8], state: &mut PadState) {
    let protocol = match classify_reply(byte_at(slot, 1, 0xFF)) {
        ReplyKind::DualShock | ReplyKind::DualShock2 => Protocol::DualShock,
        ReplyKind::Flightstick => Protocol::Flightstick,
        ReplyKind::Guncon => Protocol::Guncon,
        ReplyKind::Negcon => Protocol::Negcon,
        ReplyKind::Jogcon => Protocol::Jogcon,
        ReplyKind::Digital => Protocol::Digital,
        _ => Protocol::Unknown,
    };
    apply(protocol, slot, state);
}

fn apply(protocol: Protocol, reply: &[u8], state: &mut PadState) {
    state.protocol = protocol;

    // Every shape carries the digital button word, active-low.
    state.button_word_prev = state.button_word;
    state.button_word =
        (u16::from(byte_at(reply, 4, 0xFF)) << 8) | u16::from(byte_at(reply, 3, 0xFF));

    match protocol {
        Protocol::DualShock2 => {
            decode_sticks(reply, state);
            if let Some(pressures) = reply.get(ANALOG_BUTTON_BASE..ANALOG_BUTTON_BASE + ANALOG_BUTTON_COUNT)
            {
                state.analog_buttons.copy_from_slice(pressures);
                state.analog_buttons_valid = true;
            }
        }
        Protocol::DualShock | Protocol::Flightstick | Protocol::Guncon => {
            // The Guncon reuses the DualShock layout: RX/RY hold the
            // horizontal beam timestamp and LX/LY the vertical.
            decode_sticks(reply, state);
        }
        Protocol::Negcon => decode_negcon(reply, state),
        Protocol::Jogcon => decode_jogcon(reply, state),
        Protocol::Digital | Protocol::Unknown => {}
    }

    trace!(?protocol, button_word = state.button_word, "decoded reply");
}

fn decode_sticks(reply: &[u8], state: &mut PadState) {
    if let [rx, ry, lx, ly] = *reply.get(5..9).unwrap_or_default() {
        state.rx = rx;
        state.ry = ry;
        state.lx = lx;
        state.ly = ly;
        state.sticks_valid = true;
    }
}

/// The neGcon: twist axis plus three analog-only buttons.
///
/// The wheel never asserts I/II/L in the digital word, so a digital press is
/// synthesized into it whenever the analog value crosses the button's
/// threshold.
fn decode_negcon(reply: &[u8], state: &mut PadState) {
    let [twist, button_i, button_ii, button_l] = *reply.get(5..9).unwrap_or_default() else {
        return;
    };

    // Twist maps onto the left stick X axis.
    state.lx = twist;
    state.sticks_valid = true;

    state.analog_buttons[AnalogButton::Cross.index()] = button_i;
    state.analog_buttons[AnalogButton::Square.index()] = button_ii;
    state.analog_buttons[AnalogButton::L1.index()] = button_l;
    state.analog_buttons_valid = true;

    if button_ii >= NEGCON_I_II_BUTTON_THRESHOLD {
        state.button_word &= !Button::Square.mask();
    }
    if button_i >= NEGCON_I_II_BUTTON_THRESHOLD {
        state.button_word &= !Button::Cross.mask();
    }
    if button_l >= NEGCON_L_BUTTON_THRESHOLD {
        state.button_word &= !Button::L1.mask();
    }
}

/// The Jogcon: wheel position folded onto the left stick X axis.
///
/// Byte 5 is the wheel position (0 at power-up, 0x01..=0x80 clockwise,
/// 0xFF..=0x80 counter-clockwise), byte 6 counts full clockwise rotations.
/// Movement is capped at half a rotation per direction and re-biased into
/// the usual 0–255 stick range.
fn decode_jogcon(reply: &[u8], state: &mut PadState) {
    if reply.len() < 7 {
        return;
    }
    let position = byte_at(reply, 5, 0);
    let rotations = byte_at(reply, 6, 0);

    state.lx = if rotations < 0x80 {
        // Net clockwise: cap at half a turn right of center.
        position.min(0x7F)
    } else {
        // Net counter-clockwise: cap at half a turn left of center.
        position.max(0x81)
    }
    .wrapping_add(0x80);
    state.sticks_valid = true;
}

/// Interpret a type-read reply (command 0x45, config mode only).
///
/// Known to misreport: an SCPH-1200 DualShock identifies as Guitar Hero.
pub fn identify_controller_type(reply: &[u8]) -> ControllerType {
    let discriminator = byte_at(reply, 1, 0xFF);
    match byte_at(reply, 3, 0xFF) {
        0x03 => ControllerType::DualShock,
        0x01 if discriminator != 0x42 => ControllerType::GuitarHero,
        0x0C => ControllerType::DualShockWireless,
        _ => ControllerType::Unknown,
    }
}
