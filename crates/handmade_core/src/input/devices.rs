//! Raw device samples and their translation into [`ControllerInput`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::button::{process_button_state, Button, ControllerInput};

/// Stick values with magnitude at or below this read as centered.
pub const STICK_DEADZONE: i16 = 8000;

/// Trigger values at or below this read as released.
pub const TRIGGER_THRESHOLD: i16 = 16000;

/// Keyboard keys the game listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// W key.
    W,
    /// A key.
    A,
    /// S key.
    S,
    /// D key.
    D,
    /// Q key.
    Q,
    /// E key.
    E,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Escape key.
    Escape,
    /// Space bar.
    Space,
}

impl Key {
    /// Every key, one per [`Button`].
    pub const ALL: [Self; Button::COUNT] = [
        Self::W,
        Self::A,
        Self::S,
        Self::D,
        Self::Q,
        Self::E,
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
        Self::Escape,
        Self::Space,
    ];

    /// The controller button this key drives.
    #[must_use]
    pub const fn button(self) -> Button {
        match self {
            Self::W => Button::MoveUp,
            Self::A => Button::MoveLeft,
            Self::S => Button::MoveDown,
            Self::D => Button::MoveRight,
            Self::Q => Button::LeftShoulder,
            Self::E => Button::RightShoulder,
            Self::Up => Button::ActionUp,
            Self::Down => Button::ActionDown,
            Self::Left => Button::ActionLeft,
            Self::Right => Button::ActionRight,
            Self::Escape => Button::Back,
            Self::Space => Button::Start,
        }
    }

    const fn mask(self) -> u16 {
        1 << self.button().index()
    }

    const fn name(self) -> &'static str {
        match self {
            Self::W => "W",
            Self::A => "A",
            Self::S => "S",
            Self::D => "D",
            Self::Q => "Q",
            Self::E => "E",
            Self::Up => "Up",
            Self::Down => "Down",
            Self::Left => "Left",
            Self::Right => "Right",
            Self::Escape => "Escape",
            Self::Space => "Space",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a key name is not recognised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown key: {0}")]
pub struct ParseKeyError(pub String);

impl FromStr for Key {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseKeyError(s.to_owned()))
    }
}

/// Which keys are held, sampled once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardState {
    held: u16,
}

impl KeyboardState {
    /// A keyboard with `keys` held.
    #[must_use]
    pub fn from_keys(keys: &[Key]) -> Self {
        let mut state = Self::default();
        for &key in keys {
            state.press(key);
        }
        state
    }

    /// Marks `key` held.
    #[inline]
    pub fn press(&mut self, key: Key) {
        self.held |= key.mask();
    }

    /// Marks `key` up.
    #[inline]
    pub fn release(&mut self, key: Key) {
        self.held &= !key.mask();
    }

    /// Returns true if `key` is held.
    #[inline]
    #[must_use]
    pub const fn is_down(&self, key: Key) -> bool {
        self.held & key.mask() != 0
    }
}

/// Raw gamepad sample as reported by the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GamepadState {
    /// Held state per [`Button::index`]. Directional entries are the d-pad.
    pub buttons: [bool; Button::COUNT],
    /// Left stick X, full `i16` range, right is positive.
    pub stick_x: i16,
    /// Left stick Y, full `i16` range, down is positive.
    pub stick_y: i16,
    /// Left trigger, `0..=32767`.
    pub left_trigger: i16,
    /// Right trigger, `0..=32767`.
    pub right_trigger: i16,
}

impl GamepadState {
    /// Marks `button` held.
    #[must_use]
    pub fn with_button(mut self, button: Button) -> Self {
        self.buttons[button.index()] = true;
        self
    }
}

/// Maps a raw stick axis to `[-1, 1]`, snapping the dead zone to zero.
#[must_use]
pub fn normalize_stick(value: i16, deadzone: i16) -> f32 {
    if value.unsigned_abs() <= deadzone.unsigned_abs() {
        return 0.0;
    }

    let normalized = if value < 0 {
        f32::from(value) / 32768.0
    } else {
        f32::from(value) / 32767.0
    };
    normalized.clamp(-1.0, 1.0)
}

/// Maps a raw trigger to `[0, 1]`. Values at or below
/// [`TRIGGER_THRESHOLD`] read as zero.
#[must_use]
pub fn normalize_trigger(value: i16) -> f32 {
    if value <= TRIGGER_THRESHOLD {
        return 0.0;
    }
    (f32::from(value) / 32767.0).min(1.0)
}

/// Processes a keyboard sample into the keyboard slot.
pub fn process_keyboard(new: &mut ControllerInput, old: &ControllerInput, keys: &KeyboardState) {
    new.is_connected = true;
    new.is_analog = false;
    new.stick_average_x = 0.0;
    new.stick_average_y = 0.0;
    new.left_trigger = 0.0;
    new.right_trigger = 0.0;

    for key in Key::ALL {
        let index = key.button().index();
        process_button_state(&mut new.buttons[index], old.buttons[index], keys.is_down(key));
    }
}

/// Processes a gamepad sample into a gamepad slot.
///
/// Stick movement outside the dead zone marks the controller analog; a held
/// d-pad direction overrides that.
pub fn process_gamepad(
    new: &mut ControllerInput,
    old: &ControllerInput,
    pad: &GamepadState,
    deadzone: i16,
) {
    new.is_connected = true;
    new.stick_average_x = normalize_stick(pad.stick_x, deadzone);
    // Device Y grows downward
    new.stick_average_y = -normalize_stick(pad.stick_y, deadzone);
    new.is_analog = new.stick_average_x != 0.0 || new.stick_average_y != 0.0;
    new.left_trigger = normalize_trigger(pad.left_trigger);
    new.right_trigger = normalize_trigger(pad.right_trigger);

    for button in Button::ALL {
        let index = button.index();
        let is_down = pad.buttons[index];
        process_button_state(&mut new.buttons[index], old.buttons[index], is_down);

        if button.is_directional() && is_down {
            new.is_analog = false;
        }
    }
}
