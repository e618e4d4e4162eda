//! Command templates for the controller bus.
//!
//! All templates are immutable constants; the builders return per-call local
//! copies with the target bus address patched into byte 0, so no shared
//! mutable state ever crosses between controller slots.
//!
//! Byte 0's low nibble addresses a multi-tap slot (`slot + 1`); `0x01` is the
//! directly-attached controller. Byte 1 is the command proper, byte 2 is
//! always `0x00` on the way out.

/// Filler byte sent when a command is shorter than the peripheral's reply.
pub const PADDING_BYTE: u8 = 0x5A;

/// Size of the frame exchanger's reply buffer.
///
/// The longest frame on the bus is the 35-byte multi-tap poll; round up for
/// headroom.
pub const CMD_BUFFER_SIZE: usize = 40;

/// Total length of a multi-tap poll frame.
pub const MULTITAP_FRAME_LEN: usize = 35;

/// Number of controller slots behind a multi-tap.
pub const MULTITAP_SLOT_COUNT: usize = 4;

/// Offsets of the per-slot "request 0x42" markers in a multi-tap poll frame.
const MULTITAP_REQUEST_OFFSETS: [usize; MULTITAP_SLOT_COUNT] = [3, 11, 19, 27];

/// Enter configuration (also known as escape) mode.
///
/// The long form is used deliberately: the short 5-byte variant is rejected
/// by the SCPH-1200.
pub const ENTER_CONFIG: [u8; 9] = [0x01, 0x43, 0x00, 0x01, 0x5A, 0x5A, 0x5A, 0x5A, 0x5A];

/// Leave configuration mode.
pub const EXIT_CONFIG: [u8; 9] = [0x01, 0x43, 0x00, 0x00, 0x5A, 0x5A, 0x5A, 0x5A, 0x5A];

/// Read the controller type. Only answered while in configuration mode.
pub const TYPE_READ: [u8; 9] = [0x01, 0x45, 0x00, 0x5A, 0x5A, 0x5A, 0x5A, 0x5A, 0x5A];

/// Enable/disable the analog sticks. Byte 3 = enabled, byte 4 = locked.
pub const SET_MODE: [u8; 9] = [0x01, 0x44, 0x00, 0x01, 0x03, 0x00, 0x00, 0x00, 0x00];

/// Enable analog (pressure) button reporting on DualShock 2 pads.
pub const SET_PRESSURES: [u8; 9] = [0x01, 0x4F, 0x00, 0xFF, 0xFF, 0x03, 0x00, 0x00, 0x00];

/// Map the rumble motors onto poll command bytes 3 and 4.
pub const ENABLE_RUMBLE: [u8; 5] = [0x01, 0x4D, 0x00, 0x00, 0x01];

/// Poll button and axis state.
pub const POLL: [u8; 5] = [0x01, 0x42, 0x00, 0xFF, 0xFF];

/// Poll through a multi-tap (byte 2 = 0x01 selects the tap itself).
pub const MULTITAP_POLL: [u8; 5] = [0x01, 0x42, 0x01, 0x00, 0x00];

/// Switch value for the small rumble motor when it is requested on.
const MOTOR1_ON: u8 = 0xFF;

fn patch_address(frame: &mut [u8], slot: u8) {
    if let Some(byte0) = frame.first_mut() {
        *byte0 = (*byte0 & 0xF0) | ((slot + 1) & 0x0F);
    }
}

/// Build an enter-config command addressed to `slot`.
pub fn build_enter_config(slot: u8) -> [u8; 9] {
    let mut out = ENTER_CONFIG;
    patch_address(&mut out, slot);
    out
}

/// Build an exit-config command addressed to `slot`.
pub fn build_exit_config(slot: u8) -> [u8; 9] {
    let mut out = EXIT_CONFIG;
    patch_address(&mut out, slot);
    out
}

/// Build a type-read command addressed to `slot`.
pub fn build_type_read(slot: u8) -> [u8; 9] {
    let mut out = TYPE_READ;
    patch_address(&mut out, slot);
    out
}

/// Build a set-mode (analog stick toggle) command.
///
/// `locked` disables the ANALOG button on the controller so the user cannot
/// turn the sticks back off.
pub fn build_set_mode(slot: u8, enabled: bool, locked: bool) -> [u8; 9] {
    let mut out = SET_MODE;
    patch_address(&mut out, slot);
    out[3] = if enabled { 0x01 } else { 0x00 };
    out[4] = if locked { 0x03 } else { 0x00 };
    out
}

/// Build a set-pressures (analog button toggle) command.
pub fn build_set_pressures(slot: u8, enabled: bool) -> [u8; 9] {
    let mut out = SET_PRESSURES;
    patch_address(&mut out, slot);
    if !enabled {
        out[3] = 0x00;
        out[4] = 0x00;
        out[5] = 0x00;
    }
    out
}

/// Build an enable-rumble (motor mapping) command.
pub fn build_enable_rumble(slot: u8) -> [u8; 5] {
    let mut out = ENABLE_RUMBLE;
    patch_address(&mut out, slot);
    out
}

/// Build a poll command.
///
/// Once rumble has been enabled, bytes 3 and 4 drive the motors: pass
/// `Some((motor1_active, motor2_level))` to fold the caller's rumble request
/// into this poll. Without a mapping the controller ignores those bytes.
pub fn build_poll(slot: u8, rumble: Option<(bool, u8)>) -> [u8; 5] {
    let mut out = POLL;
    patch_address(&mut out, slot);
    if let Some((motor1, motor2)) = rumble {
        out[3] = if motor1 { MOTOR1_ON } else { 0x00 };
        out[4] = motor2;
    }
    out
}

/// Build the 35-byte multi-tap poll frame.
///
/// The frame carries a "request 0x42" marker for each of the four slots; the
/// tap answers with an 8-byte stride per slot.
pub fn build_multitap_poll() -> [u8; MULTITAP_FRAME_LEN] {
    let mut out = [0u8; MULTITAP_FRAME_LEN];
    out[..MULTITAP_POLL.len()].copy_from_slice(&MULTITAP_POLL);
    for &offset in &MULTITAP_REQUEST_OFFSETS {
        out[offset] = 0x42;
    }
    out
}
