//! # Input with Edge Detection
//!
//! Platforms only report whether a button is held *right now*. Games want
//! to know when it was *just* pressed or released.
//!
//! ## The Solution: Double Buffering
//!
//! ```text
//! Frame N:
//!   previous = snapshot N-1   (read only)
//!   current  = copy of N-1, transition flags cleared
//!   poll devices -> current   (ended_down, transitioned = changed?)
//!
//! Frame N+1:
//!   SWAP (index toggle)
//!   previous = snapshot N
//! ```
//!
//! Pressed  = ended down AND transitioned.
//! Released = ended up   AND transitioned.
//!
//! Slots nobody polls keep their last known state.

mod button;
mod devices;
mod frames;

pub use button::{
    process_button_state, Button, ButtonState, ControllerInput, GameInput, KEYBOARD_SLOT,
    MAX_CONTROLLERS, MAX_GAMEPADS,
};
pub use devices::{
    normalize_stick, normalize_trigger, process_gamepad, process_keyboard, GamepadState, Key,
    KeyboardState, ParseKeyError, STICK_DEADZONE, TRIGGER_THRESHOLD,
};
pub use frames::InputFrames;
