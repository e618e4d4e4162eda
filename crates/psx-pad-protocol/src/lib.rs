//! PlayStation controller bus protocol: command templates, reply
//! classification and per-controller decoding.
//!
//! This crate is intentionally I/O-free and allocation-free. It provides pure
//! functions and types that can be tested and fuzzed without hardware or any
//! bus-level plumbing; the companion `psx-pad-driver` crate supplies the
//! half-duplex transport, pacing and retry machinery.
//!
//! ## Wire format
//!
//! The bus is SPI-mode-3, LSB-first, one peripheral behind an active-low
//! attention line. Every exchange is full-duplex: each command byte clocked
//! out returns one data byte. Replies are self-describing — the second byte
//! carries a protocol discriminator in its high nibble and the payload length
//! in its low nibble (see [`reply_length`]).
//!
//! ## Verification sources
//!
//! Command templates, reply discriminators and the per-controller field
//! layouts were cross-referenced against hardware captures of SCPH-1010,
//! SCPH-1200 (DualShock), SCPH-10010 (DualShock 2), the Namco neGcon
//! (NPC-101), Jogcon (NPC-105) and Guncon (NPC-103), plus the SCPH-1070
//! multi-tap. The neGcon digital-synthesis thresholds and the "accept after
//! three replies" rule used by the driver crate are empirically tuned values,
//! not documented hardware behavior.

#![deny(static_mut_refs)]

pub mod commands;
pub mod decode;
pub mod reply;
pub mod state;

pub use commands::{
    CMD_BUFFER_SIZE, ENABLE_RUMBLE, ENTER_CONFIG, EXIT_CONFIG, MULTITAP_FRAME_LEN, MULTITAP_POLL,
    MULTITAP_SLOT_COUNT, PADDING_BYTE, POLL, SET_MODE, SET_PRESSURES, TYPE_READ,
    build_enable_rumble, build_enter_config, build_exit_config, build_multitap_poll, build_poll,
    build_set_mode, build_set_pressures, build_type_read,
};
pub use decode::{
    NEGCON_I_II_BUTTON_THRESHOLD, NEGCON_L_BUTTON_THRESHOLD, decode_multitap_slot, decode_reply,
    identify_controller_type,
};
pub use reply::{ReplyKind, classify_reply, is_valid_header, multitap_slot, reply_length};
pub use state::{
    ANALOG_IDLE_VALUE, ANALOG_MAX_VALUE, ANALOG_MIN_VALUE, AnalogButton, Button, ControllerType,
    GunconReading, PadState, Protocol,
};
