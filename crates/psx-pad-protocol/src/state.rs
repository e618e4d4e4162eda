//! Canonical controller state and the public accessor surface.

/// Minimum analog axis value (stick fully up or left).
pub const ANALOG_MIN_VALUE: u8 = 0;

/// Maximum analog axis value (stick fully down or right).
pub const ANALOG_MAX_VALUE: u8 = 255;

/// Idle (center) analog axis value.
///
/// The two half-ranges are off by one: 0–127 covers up/left with 128 steps,
/// 129–255 covers down/right with 127. Worn sticks rarely self-center on
/// this exact value.
pub const ANALOG_IDLE_VALUE: u8 = 0x80;

/// Number of pressure-sensitive buttons reported by a DualShock 2.
pub const ANALOG_BUTTON_COUNT: usize = 12;

/// A digital button, identified by its bit position in the button word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Button {
    Select = 0,
    L3,
    R3,
    Start,
    Up,
    Right,
    Down,
    Left,
    L2,
    R2,
    L1,
    R1,
    Triangle,
    Circle,
    Cross,
    Square,
}

impl Button {
    /// Guitar Hero controllers reuse the face-button bits for fret colors.
    pub const GREEN: Button = Button::Triangle;
    pub const RED: Button = Button::Circle;
    pub const BLUE: Button = Button::Cross;
    pub const PINK: Button = Button::Square;

    /// Bitmask of this button inside a button word.
    pub const fn mask(self) -> u16 {
        1 << (self as u16)
    }
}

/// A pressure-sensitive button, identified by its index in the analog
/// button block of a DualShock 2 reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AnalogButton {
    Right = 0,
    Left,
    Up,
    Down,
    Triangle,
    Circle,
    Cross,
    Square,
    L1,
    R1,
    L2,
    R2,
}

impl AnalogButton {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Reply protocol a controller spoke at the last successful poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    Unknown,
    Digital,
    DualShock,
    DualShock2,
    Flightstick,
    Negcon,
    Jogcon,
    Guncon,
}

/// Controller type as reported by the type-read command in config mode.
///
/// Not trustworthy: an SCPH-1200 DualShock reports itself as a Guitar Hero
/// controller. Use [`Protocol`] where possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerType {
    #[default]
    Unknown,
    DualShock,
    DualShockWireless,
    GuitarHero,
}

/// One Guncon trigger-pull reading.
///
/// Coordinates are raw beam timestamps: x counts 8 MHz clock ticks from
/// horizontal sync (roughly 77 per scanline), y counts scanlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GunconReading {
    /// The gun saw the beam at the given screen position.
    Position { x: u16, y: u16 },
    /// Light was seen outside the expected window (gun pointed at a lamp,
    /// or the TV is too bright).
    UnexpectedLight,
    /// No light seen at all (gun off-screen or trigger pulled at a dark
    /// frame).
    NoLight,
}

/// Canonical state of one controller slot.
///
/// Written exclusively by the driver's poll path, read through the accessor
/// methods. Button words are stored exactly as they travel on the wire
/// (active-low); the accessors complement them so callers see 1 = pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PadState {
    pub(crate) button_word_prev: u16,
    pub(crate) button_word: u16,
    pub(crate) protocol: Protocol,
    pub(crate) lx: u8,
    pub(crate) ly: u8,
    pub(crate) rx: u8,
    pub(crate) ry: u8,
    pub(crate) sticks_valid: bool,
    pub(crate) analog_buttons: [u8; ANALOG_BUTTON_COUNT],
    pub(crate) analog_buttons_valid: bool,
    /// Rumble request: small motor switch, consumed by the next poll once
    /// rumble has been enabled.
    pub(crate) motor1_active: bool,
    /// Rumble request: large motor level, 0–255.
    pub(crate) motor2_level: u8,
}

impl Default for PadState {
    fn default() -> Self {
        Self::new()
    }
}

impl PadState {
    pub const fn new() -> Self {
        Self {
            // All-ones on the wire means every button released.
            button_word_prev: 0xFFFF,
            button_word: 0xFFFF,
            protocol: Protocol::Unknown,
            lx: ANALOG_IDLE_VALUE,
            ly: ANALOG_IDLE_VALUE,
            rx: ANALOG_IDLE_VALUE,
            ry: ANALOG_IDLE_VALUE,
            sticks_valid: false,
            analog_buttons: [0; ANALOG_BUTTON_COUNT],
            analog_buttons_valid: false,
            motor1_active: false,
            motor2_level: 0,
        }
    }

    /// Reset to the just-constructed state (controller unplugged/replugged).
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Drop the analog validity flags.
    ///
    /// Called at the start of every poll attempt so a failed poll can never
    /// leave stale analog data looking fresh.
    pub fn invalidate_analog(&mut self) {
        self.sticks_valid = false;
        self.analog_buttons_valid = false;
    }

    /// Protocol spoken at the last successful poll.
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// The button word, complemented so 1 = pressed.
    pub fn button_word(&self) -> u16 {
        !self.button_word
    }

    /// The previous poll's button word, complemented so 1 = pressed.
    pub fn previous_button_word(&self) -> u16 {
        !self.button_word_prev
    }

    /// True if any button changed state between the last two polls.
    pub fn buttons_changed(&self) -> bool {
        (self.button_word_prev ^ self.button_word) != 0
    }

    /// True if `button` changed state between the last two polls.
    pub fn button_changed(&self, button: Button) -> bool {
        (self.button_word_prev ^ self.button_word) & button.mask() != 0
    }

    /// True if `button` was pressed at the last poll.
    pub fn button_pressed(&self, button: Button) -> bool {
        self.button_word() & button.mask() != 0
    }

    /// True if `button` is pressed now and was not at the previous poll.
    pub fn button_just_pressed(&self, button: Button) -> bool {
        self.button_changed(button) && self.button_pressed(button)
    }

    /// True if `button` was pressed at the previous poll and is not now.
    pub fn button_just_released(&self, button: Button) -> bool {
        self.button_changed(button) && self.previous_button_word() & button.mask() != 0
    }

    /// True if no button at all was pressed at the last poll.
    pub fn no_button_pressed(&self) -> bool {
        self.button_word == 0xFFFF
    }

    /// Left stick position, if this controller reported stick data.
    pub fn left_analog(&self) -> Option<(u8, u8)> {
        self.sticks_valid.then_some((self.lx, self.ly))
    }

    /// Right stick position, if this controller reported stick data.
    pub fn right_analog(&self) -> Option<(u8, u8)> {
        self.sticks_valid.then_some((self.rx, self.ry))
    }

    /// Pressure of one analog button, 0 = released, 255 = fully pressed.
    ///
    /// Returns 0 when no analog button data was reported this poll.
    pub fn analog_button(&self, button: AnalogButton) -> u8 {
        if self.analog_buttons_valid {
            self.analog_buttons[button.index()]
        } else {
            0
        }
    }

    /// The whole analog button block, if valid this poll.
    pub fn analog_button_data(&self) -> Option<&[u8; ANALOG_BUTTON_COUNT]> {
        self.analog_buttons_valid.then_some(&self.analog_buttons)
    }

    /// Reinterpret the stick bytes of a Guncon reply as screen coordinates.
    ///
    /// Only meaningful when the last poll spoke the Guncon protocol; the two
    /// sentinel coordinate pairs the hardware uses for error reporting are
    /// mapped onto the non-position variants.
    pub fn guncon_reading(&self) -> Option<GunconReading> {
        if self.protocol != Protocol::Guncon || !self.sticks_valid {
            return None;
        }
        let x = u16::from_le_bytes([self.rx, self.ry]);
        let y = u16::from_le_bytes([self.lx, self.ly]);
        Some(match (x, y) {
            (1, 5) => GunconReading::UnexpectedLight,
            (1, 10) => GunconReading::NoLight,
            _ => GunconReading::Position { x, y },
        })
    }

    /// Request a rumble state, consumed by the next poll if rumble has been
    /// enabled via the configuration sequencer.
    pub fn set_rumble(&mut self, motor1_active: bool, motor2_level: u8) {
        self.motor1_active = motor1_active;
        self.motor2_level = motor2_level;
    }

    /// The pending rumble request as poll command bytes.
    pub fn rumble_request(&self) -> (bool, u8) {
        (self.motor1_active, self.motor2_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_masks_match_wire_layout() {
        assert_eq!(Button::Select.mask(), 0x0001);
        assert_eq!(Button::L3.mask(), 0x0002);
        assert_eq!(Button::R3.mask(), 0x0004);
        assert_eq!(Button::Start.mask(), 0x0008);
        assert_eq!(Button::Up.mask(), 0x0010);
        assert_eq!(Button::Right.mask(), 0x0020);
        assert_eq!(Button::Down.mask(), 0x0040);
        assert_eq!(Button::Left.mask(), 0x0080);
        assert_eq!(Button::L2.mask(), 0x0100);
        assert_eq!(Button::R2.mask(), 0x0200);
        assert_eq!(Button::L1.mask(), 0x0400);
        assert_eq!(Button::R1.mask(), 0x0800);
        assert_eq!(Button::Triangle.mask(), 0x1000);
        assert_eq!(Button::Circle.mask(), 0x2000);
        assert_eq!(Button::Cross.mask(), 0x4000);
        assert_eq!(Button::Square.mask(), 0x8000);
    }

    #[test]
    fn guitar_hero_aliases() {
        assert_eq!(Button::GREEN.mask(), Button::Triangle.mask());
        assert_eq!(Button::PINK.mask(), Button::Square.mask());
    }

    #[test]
    fn fresh_state_reads_released_and_idle() {
        let state = PadState::new();
        assert_eq!(state.button_word(), 0);
        assert!(state.no_button_pressed());
        assert!(!state.buttons_changed());
        assert_eq!(state.left_analog(), None);
        assert_eq!(state.right_analog(), None);
        assert_eq!(state.analog_button(AnalogButton::Cross), 0);
        assert_eq!(state.protocol(), Protocol::Unknown);
    }

    #[test]
    fn edge_detection() {
        let mut state = PadState::new();
        state.button_word_prev = 0xFFFF;
        state.button_word = !Button::Cross.mask();
        assert!(state.button_pressed(Button::Cross));
        assert!(state.button_just_pressed(Button::Cross));
        assert!(!state.button_just_released(Button::Cross));

        state.button_word_prev = state.button_word;
        state.button_word = 0xFFFF;
        assert!(!state.button_pressed(Button::Cross));
        assert!(state.button_just_released(Button::Cross));
        assert!(!state.button_just_pressed(Button::Cross));
    }

    #[test]
    fn analog_button_zero_when_invalid() {
        let mut state = PadState::new();
        state.analog_buttons[AnalogButton::L1.index()] = 0xEE;
        assert_eq!(state.analog_button(AnalogButton::L1), 0);
        state.analog_buttons_valid = true;
        assert_eq!(state.analog_button(AnalogButton::L1), 0xEE);
    }

    #[test]
    fn guncon_sentinels() {
        let mut state = PadState::new();
        state.protocol = Protocol::Guncon;
        state.sticks_valid = true;

        state.rx = 0x01;
        state.ry = 0x00;
        state.lx = 0x05;
        state.ly = 0x00;
        assert_eq!(state.guncon_reading(), Some(GunconReading::UnexpectedLight));

        state.lx = 0x0A;
        assert_eq!(state.guncon_reading(), Some(GunconReading::NoLight));

        state.rx = 0x40;
        state.ry = 0x01;
        state.lx = 0x78;
        state.ly = 0x00;
        assert_eq!(
            state.guncon_reading(),
            Some(GunconReading::Position { x: 0x0140, y: 0x0078 })
        );
    }

    #[test]
    fn guncon_reading_gated_on_protocol() {
        let mut state = PadState::new();
        state.sticks_valid = true;
        state.protocol = Protocol::DualShock;
        assert_eq!(state.guncon_reading(), None);
    }
}
