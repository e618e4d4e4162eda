//! Reply framing: header validation, length computation and protocol
//! classification.
//!
//! Every reply starts with a 3-byte header: device address echo, a
//! discriminator byte, and either `0x5A` (normal mode) or `0x00`
//! (configuration mode). The discriminator's high nibble identifies the
//! protocol; its low nibble encodes the payload length in 16-bit words.

use crate::commands::{MULTITAP_SLOT_COUNT, PADDING_BYTE};

/// Stride of one controller slot inside a multi-tap reply.
pub const MULTITAP_SLOT_STRIDE: usize = 8;

/// Offset of the first controller slot inside a multi-tap reply.
pub const MULTITAP_SLOT_OFFSET: usize = 2;

/// Protocol tag derived from a reply's discriminator byte.
///
/// The set is closed: controllers speak exactly one of these shapes and new
/// ones have not appeared since the hardware went out of production, so an
/// exhaustive match is worth more than open extensibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// Original digital pad (SCPH-1010 and friends).
    Digital,
    /// Green-mode / Flightstick extended reply (no Select/L3/R3 semantics).
    Flightstick,
    /// DualShock analog reply.
    DualShock,
    /// DualShock 2 analog reply with button pressure data.
    DualShock2,
    /// Namco neGcon.
    Negcon,
    /// Namco Jogcon.
    Jogcon,
    /// Namco Guncon light gun.
    Guncon,
    /// The controller is in configuration mode; not a polling protocol.
    ConfigMode,
    /// A multi-tap answered the extended poll frame.
    MultiTapPresent,
    /// Discriminator matched nothing we know.
    Unknown,
}

/// Classify a reply from its discriminator byte (byte 1 of the reply).
///
/// Exact-byte checks run before the nibble masks: 0x79 would otherwise be
/// swallowed by the DualShock 0x70 mask, and the Negcon/Guncon bytes do not
/// live under any mask at all.
pub fn classify_reply(discriminator: u8) -> ReplyKind {
    match discriminator {
        0x79 => ReplyKind::DualShock2,
        0x23 => ReplyKind::Negcon,
        0x63 => ReplyKind::Guncon,
        d => match d & 0xF0 {
            0xF0 => ReplyKind::ConfigMode,
            0x40 => ReplyKind::Digital,
            0x50 => ReplyKind::Flightstick,
            0x70 => ReplyKind::DualShock,
            0xE0 => ReplyKind::Jogcon,
            0x80 => ReplyKind::MultiTapPresent,
            _ => ReplyKind::Unknown,
        },
    }
}

/// Check the 3-byte reply header.
///
/// A discriminator of 0xFF means nothing drove the data line (no device, or
/// an unsupported one); byte 2 must be either the padding byte or the
/// configuration-mode marker 0x00.
pub fn is_valid_header(header: &[u8]) -> bool {
    match header {
        [_, b1, b2, ..] => *b1 != 0xFF && (*b2 == PADDING_BYTE || *b2 == 0x00),
        _ => false,
    }
}

/// Payload length encoded in a reply discriminator, in bytes.
///
/// The low nibble counts 16-bit words beyond the 3-byte header; a nibble of
/// zero means 16 words. A digital reply (0x41) therefore carries 2 payload
/// bytes, a DualShock 2 reply (0x79) 18, and a multi-tap reply (0x80) 32.
pub fn reply_length(discriminator: u8) -> usize {
    let n = usize::from(discriminator & 0x0F);
    if n == 0 { 32 } else { n * 2 }
}

/// Borrow the decode view for `slot` out of a multi-tap reply.
///
/// Slot strides are 8 bytes apart but the view spans 9: a slot mirrors the
/// direct-path reply layout, whose last stick byte lands on the next slot's
/// boundary byte. The last slot's view ends exactly at byte 35.
///
/// Returns `None` for out-of-range slots or truncated replies.
pub fn multitap_slot(reply: &[u8], slot: usize) -> Option<&[u8]> {
    if slot >= MULTITAP_SLOT_COUNT {
        return None;
    }
    let start = MULTITAP_SLOT_OFFSET + slot * MULTITAP_SLOT_STRIDE;
    reply.get(start..start + MULTITAP_SLOT_STRIDE + 1)
}
