//! Button and controller state.

/// Number of controller slots: the keyboard plus [`MAX_GAMEPADS`].
pub const MAX_CONTROLLERS: usize = 1 + MAX_GAMEPADS;

/// Number of gamepad slots.
pub const MAX_GAMEPADS: usize = 4;

/// Slot occupied by the keyboard.
pub const KEYBOARD_SLOT: usize = 0;

/// State of one button at the end of a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    /// Whether the button was held when the frame was sampled.
    pub ended_down: bool,
    /// Whether the held state changed since the previous frame.
    pub transitioned: bool,
}

impl ButtonState {
    /// Derives this frame's state from the previous one and a fresh sample.
    #[inline]
    #[must_use]
    pub const fn process(previous: Self, is_down: bool) -> Self {
        Self {
            ended_down: is_down,
            transitioned: previous.ended_down != is_down,
        }
    }

    /// Returns true if the button went down this frame.
    #[inline]
    #[must_use]
    pub const fn was_pressed(self) -> bool {
        self.ended_down && self.transitioned
    }

    /// Returns true if the button came up this frame.
    #[inline]
    #[must_use]
    pub const fn was_released(self) -> bool {
        !self.ended_down && self.transitioned
    }

    /// Returns true if the button is held.
    #[inline]
    #[must_use]
    pub const fn is_down(self) -> bool {
        self.ended_down
    }
}

/// Writes the processed state of one button into `new`.
#[inline]
pub fn process_button_state(new: &mut ButtonState, previous: ButtonState, is_down: bool) {
    *new = ButtonState::process(previous, is_down);
}

/// Logical buttons every controller exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Button {
    /// Move up (W, d-pad up).
    MoveUp,
    /// Move down (S, d-pad down).
    MoveDown,
    /// Move left (A, d-pad left).
    MoveLeft,
    /// Move right (D, d-pad right).
    MoveRight,
    /// Upper face button (arrow up, Y/North).
    ActionUp,
    /// Lower face button (arrow down, A/South).
    ActionDown,
    /// Left face button (arrow left, X/West).
    ActionLeft,
    /// Right face button (arrow right, B/East).
    ActionRight,
    /// Left shoulder (Q).
    LeftShoulder,
    /// Right shoulder (E).
    RightShoulder,
    /// Back / select (Escape).
    Back,
    /// Start (Space).
    Start,
}

impl Button {
    /// Number of buttons.
    pub const COUNT: usize = 12;

    /// Every button in index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::MoveUp,
        Self::MoveDown,
        Self::MoveLeft,
        Self::MoveRight,
        Self::ActionUp,
        Self::ActionDown,
        Self::ActionLeft,
        Self::ActionRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::Back,
        Self::Start,
    ];

    /// Position of this button in [`ControllerInput::buttons`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns true for the four directional buttons.
    #[inline]
    #[must_use]
    pub const fn is_directional(self) -> bool {
        matches!(
            self,
            Self::MoveUp | Self::MoveDown | Self::MoveLeft | Self::MoveRight
        )
    }
}

/// Input from one controller slot for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControllerInput {
    /// Whether a device currently occupies this slot.
    pub is_connected: bool,
    /// Whether the stick, rather than the d-pad, drove movement this frame.
    pub is_analog: bool,
    /// Horizontal stick position in `[-1, 1]`, right is positive.
    pub stick_average_x: f32,
    /// Vertical stick position in `[-1, 1]`, up is positive.
    pub stick_average_y: f32,
    /// Left trigger in `[0, 1]`, zero below the threshold.
    pub left_trigger: f32,
    /// Right trigger in `[0, 1]`, zero below the threshold.
    pub right_trigger: f32,
    /// Button states, indexed by [`Button::index`].
    pub buttons: [ButtonState; Button::COUNT],
}

impl ControllerInput {
    /// Returns the state of `button`.
    #[inline]
    #[must_use]
    pub fn button(&self, button: Button) -> ButtonState {
        self.buttons[button.index()]
    }

    /// Returns the state of `button` for writing.
    #[inline]
    pub fn button_mut(&mut self, button: Button) -> &mut ButtonState {
        &mut self.buttons[button.index()]
    }

    /// Clears every transition flag, keeping held states.
    pub fn clear_transitions(&mut self) {
        for state in &mut self.buttons {
            state.transitioned = false;
        }
    }

    /// Marks the slot empty. Held buttons come up this frame so the game
    /// sees their release; sticks and triggers return to rest.
    pub fn disconnect(&mut self) {
        for state in &mut self.buttons {
            let previous = *state;
            process_button_state(state, previous, false);
        }
        self.is_connected = false;
        self.is_analog = false;
        self.stick_average_x = 0.0;
        self.stick_average_y = 0.0;
        self.left_trigger = 0.0;
        self.right_trigger = 0.0;
    }
}

/// Input from every controller slot for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GameInput {
    /// Slot [`KEYBOARD_SLOT`] is the keyboard, the rest are gamepads.
    pub controllers: [ControllerInput; MAX_CONTROLLERS],
}

impl GameInput {
    /// The keyboard slot.
    #[inline]
    #[must_use]
    pub fn keyboard(&self) -> &ControllerInput {
        &self.controllers[KEYBOARD_SLOT]
    }

    /// The keyboard slot, for writing.
    #[inline]
    pub fn keyboard_mut(&mut self) -> &mut ControllerInput {
        &mut self.controllers[KEYBOARD_SLOT]
    }

    /// Gamepad `index` (0-based), if the index is in range.
    #[inline]
    #[must_use]
    pub fn gamepad(&self, index: usize) -> Option<&ControllerInput> {
        if index >= MAX_GAMEPADS {
            return None;
        }
        self.controllers.get(KEYBOARD_SLOT + 1 + index)
    }

    /// Gamepad `index` (0-based), for writing.
    #[inline]
    pub fn gamepad_mut(&mut self, index: usize) -> Option<&mut ControllerInput> {
        if index >= MAX_GAMEPADS {
            return None;
        }
        self.controllers.get_mut(KEYBOARD_SLOT + 1 + index)
    }

    /// Iterates over connected controllers.
    pub fn connected(&self) -> impl Iterator<Item = &ControllerInput> {
        self.controllers.iter().filter(|c| c.is_connected)
    }

    /// Clears every transition flag on every slot.
    pub fn clear_transitions(&mut self) {
        for controller in &mut self.controllers {
            controller.clear_transitions();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_sequence() {
        let samples = [true, true, false, false];
        let mut previous = ButtonState::default();
        let mut pressed = Vec::new();
        let mut released = Vec::new();

        for is_down in samples {
            let mut current = previous;
            current.transitioned = false;
            process_button_state(&mut current, previous, is_down);
            pressed.push(current.was_pressed());
            released.push(current.was_released());
            previous = current;
        }

        assert_eq!(pressed, [true, false, false, false]);
        assert_eq!(released, [false, false, true, false]);
    }

    #[test]
    fn test_button_indices_match_all() {
        for (i, button) in Button::ALL.iter().enumerate() {
            assert_eq!(button.index(), i);
        }
    }

    #[test]
    fn test_gamepad_slots() {
        let mut input = GameInput::default();
        assert!(input.gamepad(0).is_some());
        assert!(input.gamepad(MAX_GAMEPADS - 1).is_some());
        assert!(input.gamepad(MAX_GAMEPADS).is_none());

        input.gamepad_mut(2).unwrap().is_connected = true;
        assert!(input.controllers[3].is_connected);
        assert_eq!(input.connected().count(), 1);
    }

    #[test]
    fn test_disconnect_releases_buttons() {
        let mut controller = ControllerInput {
            is_connected: true,
            stick_average_x: 0.5,
            right_trigger: 0.75,
            ..Default::default()
        };
        controller.button_mut(Button::Start).ended_down = true;

        controller.disconnect();
        assert!(!controller.is_connected);
        assert!(!controller.button(Button::Start).is_down());
        assert!(controller.button(Button::Start).was_released());
        assert!(!controller.button(Button::Back).was_released(), "was never held");
        assert!(controller.stick_average_x.abs() < f32::EPSILON);
        assert!(controller.right_trigger.abs() < f32::EPSILON);
    }
}
