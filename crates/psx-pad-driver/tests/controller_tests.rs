//! End-to-end controller scenarios against the mock transport and clock.

use psx_pad_driver::clock::mock::MockClock;
use psx_pad_driver::transport::mock::MockTransport;
use psx_pad_driver::{PadError, PsxController};
use psx_pad_protocol::{AnalogButton, Button, ControllerType, Protocol};

fn controller() -> (PsxController<MockTransport, MockClock>, MockTransport) {
    let transport = MockTransport::new();
    let controller = PsxController::new(transport.clone(), MockClock::new());
    (controller, transport)
}

#[test]
fn begin_discards_warm_up_polls_before_the_deciding_one() {
    let (mut pad, transport) = controller();
    for _ in 0..6 {
        transport.queue_reply(vec![0x01, 0x41, 0x5A, 0xF7, 0xFF]);
    }

    let state = pad.begin().expect("controller detected");
    assert_eq!(state.protocol(), Protocol::Digital);
    // Five disposable reads plus the one that counts.
    assert_eq!(transport.sent_frames().len(), 6);
}

#[test]
fn begin_reports_an_empty_port() {
    let (mut pad, transport) = controller();
    assert_eq!(pad.begin(), Err(PadError::NoReply));
    assert_eq!(transport.sent_frames().len(), 6);
}

#[test]
fn begin_detects_a_late_waking_controller() {
    let (mut pad, transport) = controller();
    // Silent for the disposable reads, awake for the deciding one.
    for _ in 0..5 {
        transport.queue_reply(Vec::new());
    }
    transport.queue_reply(vec![0x01, 0x73, 0x5A, 0xFF, 0xFF, 0x80, 0x80, 0x80, 0x80]);

    let state = pad.begin().expect("controller woke up");
    assert_eq!(state.protocol(), Protocol::DualShock);
}

#[test]
fn poll_decodes_a_digital_pad() {
    let (mut pad, transport) = controller();
    transport.queue_reply(vec![0x01, 0x41, 0x5A, 0xF7, 0xFF]);

    let state = pad.poll().expect("digital pad answered");
    assert_eq!(state.protocol(), Protocol::Digital);
    assert!(state.button_pressed(Button::Start));
    assert!(state.button_just_pressed(Button::Start));
    assert_eq!(state.left_analog(), None);

    assert_eq!(
        transport.sent_frames(),
        vec![vec![0x01, 0x42, 0x00, 0xFF, 0xFF]]
    );
}

#[test]
fn poll_decodes_a_dualshock() {
    let (mut pad, transport) = controller();
    transport.queue_reply(vec![0x01, 0x73, 0x5A, 0xB3, 0xFF, 0x90, 0xA0, 0x70, 0x60]);

    let state = pad.poll().expect("dualshock answered");
    assert_eq!(state.protocol(), Protocol::DualShock);
    assert_eq!(state.right_analog(), Some((0x90, 0xA0)));
    assert_eq!(state.left_analog(), Some((0x70, 0x60)));

    // The 5-byte poll is padded out to the 9-byte analog reply.
    assert_eq!(
        transport.sent_frames(),
        vec![vec![0x01, 0x42, 0x00, 0xFF, 0xFF, 0x5A, 0x5A, 0x5A, 0x5A]]
    );
}

#[test]
fn poll_decodes_dualshock2_pressures() {
    let (mut pad, transport) = controller();
    let mut reply = vec![0x01, 0x79, 0x5A, 0xFF, 0xFF, 0x80, 0x80, 0x80, 0x80];
    reply.extend((0..12).map(|i| 0xA0 + i));
    transport.queue_reply(reply);

    let state = pad.poll().expect("dualshock 2 answered");
    assert_eq!(state.protocol(), Protocol::DualShock2);
    assert_eq!(state.analog_button(AnalogButton::Right), 0xA0);
    assert_eq!(state.analog_button(AnalogButton::R2), 0xAB);
}

#[test]
fn failed_poll_invalidates_analog_but_keeps_buttons() {
    let (mut pad, transport) = controller();
    transport.queue_reply(vec![0x01, 0x73, 0x5A, 0xB3, 0xFF, 0x90, 0xA0, 0x70, 0x60]);
    pad.poll().expect("first poll answered");
    assert!(pad.state().left_analog().is_some());

    // Nothing queued: the port is empty now.
    assert_eq!(pad.poll(), Err(PadError::NoReply));
    assert_eq!(pad.state().left_analog(), None);
    // The last decoded button word survives the failed poll.
    assert_eq!(pad.state().button_word(), !0xFFB3u16);
}

#[test]
fn stuck_in_config_mode_triggers_recovery() {
    let (mut pad, transport) = controller();
    // The poll comes back as a config-mode reply.
    transport.queue_reply(vec![0x01, 0xF3, 0x5A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    // The recovery exit-config gets a normal digital reply.
    transport.queue_reply(vec![0x01, 0x41, 0x5A, 0xFF, 0xFF]);

    assert_eq!(pad.poll(), Err(PadError::NoReply));

    let frames = transport.sent_frames();
    assert_eq!(frames.len(), 2, "poll then exit-config");
    assert_eq!(&frames[1][..4], &[0x01, 0x43, 0x00, 0x00]);
}

#[test]
fn rumble_request_rides_the_poll_frame() {
    let (mut pad, transport) = controller();
    // Motor mapping wants three consecutive replies.
    for _ in 0..3 {
        transport.queue_reply(vec![0x01, 0xF3, 0x5A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    }
    pad.enable_rumble().expect("rumble mapping applied");

    pad.set_rumble(true, 0x80);
    transport.queue_reply(vec![0x01, 0x73, 0x5A, 0xFF, 0xFF, 0x80, 0x80, 0x80, 0x80]);
    pad.poll().expect("poll answered");

    let frames = transport.sent_frames();
    let poll_frame = frames.last().expect("at least one frame");
    // Byte 3 switches the small motor, byte 4 levels the big one.
    assert_eq!(&poll_frame[..5], &[0x01, 0x42, 0x00, 0xFF, 0x80]);
}

#[test]
fn polls_do_not_carry_motor_bytes_before_rumble_is_enabled() {
    let (mut pad, transport) = controller();
    pad.set_rumble(true, 0xFF);
    transport.queue_reply(vec![0x01, 0x41, 0x5A, 0xFF, 0xFF]);
    pad.poll().expect("poll answered");

    assert_eq!(
        transport.sent_frames(),
        vec![vec![0x01, 0x42, 0x00, 0xFF, 0xFF]]
    );
}

#[test]
fn controller_type_read_in_config_mode() {
    let (mut pad, transport) = controller();
    transport.queue_reply(vec![0x01, 0xF3, 0x5A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    pad.enter_config().expect("entered config mode");

    transport.queue_reply(vec![0x01, 0xF3, 0x5A, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00]);
    let kind = pad.controller_type().expect("type read answered");
    assert_eq!(kind, ControllerType::DualShock);
}
