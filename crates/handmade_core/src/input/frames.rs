//! # Double-Buffered Input
//!
//! Two complete [`GameInput`] snapshots, swapped by index every frame.
//!
//! ## Architecture
//!
//! ```text
//!                    ┌─────────────────────────────┐
//!                    │         InputFrames         │
//!                    │                             │
//!                    │  ┌─────────┐  ┌─────────┐   │
//!                    │  │ Input A │  │ Input B │   │
//!                    │  └────┬────┘  └────┬────┘   │
//!                    │       │            │        │
//!                    │  ┌────┴────────────┴────┐   │
//!                    │  │  write index (0/1)   │   │
//!                    │  └──────────────────────┘   │
//!                    └─────────────────────────────┘
//! ```
//!
//! The write buffer is `current`, the other one is `previous`. Nothing is
//! allocated after construction.

use super::button::GameInput;

/// Ping-pong pair of input snapshots.
///
/// ## Usage
///
/// ```rust
/// use handmade_core::input::{process_keyboard, InputFrames, Key, KeyboardState};
///
/// let mut frames = InputFrames::new();
///
/// frames.begin_frame();
/// let (previous, current) = frames.split_mut();
/// process_keyboard(
///     current.keyboard_mut(),
///     previous.keyboard(),
///     &KeyboardState::from_keys(&[Key::Space]),
/// );
/// assert!(frames.current().keyboard().buttons[11].was_pressed());
/// frames.end_frame();
/// ```
#[derive(Debug, Clone, Default)]
pub struct InputFrames {
    /// The two snapshots.
    buffers: [GameInput; 2],

    /// Index of the current (write) snapshot.
    /// Previous is always `write_index ^ 1`.
    write_index: usize,

    /// Number of completed frames.
    frame_count: u64,
}

impl InputFrames {
    /// Creates a pair of empty snapshots: every slot disconnected, every
    /// button up.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of completed frames.
    #[inline]
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Returns the index of the write snapshot (for debugging).
    #[inline]
    #[must_use]
    pub const fn write_index(&self) -> usize {
        self.write_index
    }

    /// Starts a frame.
    ///
    /// The current snapshot becomes a copy of the previous one, so slots
    /// that are not polled this frame keep their last known state. Every
    /// transition flag is then cleared.
    pub fn begin_frame(&mut self) {
        let previous = self.buffers[self.write_index ^ 1];
        let current = &mut self.buffers[self.write_index];
        *current = previous;
        current.clear_transitions();
    }

    /// The snapshot being written this frame.
    #[inline]
    #[must_use]
    pub fn current(&self) -> &GameInput {
        &self.buffers[self.write_index]
    }

    /// The snapshot being written this frame, mutably.
    #[inline]
    pub fn current_mut(&mut self) -> &mut GameInput {
        &mut self.buffers[self.write_index]
    }

    /// Last frame's snapshot.
    #[inline]
    #[must_use]
    pub fn previous(&self) -> &GameInput {
        &self.buffers[self.write_index ^ 1]
    }

    /// Borrows `(previous, current)` at once for processing device samples.
    pub fn split_mut(&mut self) -> (&GameInput, &mut GameInput) {
        let [a, b] = &mut self.buffers;
        if self.write_index == 0 {
            (b, a)
        } else {
            (a, b)
        }
    }

    /// Ends the frame: the current snapshot becomes the previous one.
    #[inline]
    pub fn end_frame(&mut self) {
        self.write_index ^= 1;
        self.frame_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{process_keyboard, Button, Key, KeyboardState};

    fn run_keyboard_frame(frames: &mut InputFrames, keys: &[Key]) -> (bool, bool) {
        frames.begin_frame();
        let (previous, current) = frames.split_mut();
        process_keyboard(
            current.keyboard_mut(),
            previous.keyboard(),
            &KeyboardState::from_keys(keys),
        );
        let state = frames.current().keyboard().button(Button::Start);
        frames.end_frame();
        (state.was_pressed(), state.was_released())
    }

    #[test]
    fn test_creation() {
        let frames = InputFrames::new();
        assert_eq!(frames.frame_count(), 0);
        assert_eq!(frames.write_index(), 0);
        assert_eq!(frames.current(), frames.previous());
    }

    #[test]
    fn test_swap_toggles_index() {
        let mut frames = InputFrames::new();
        frames.end_frame();
        assert_eq!(frames.write_index(), 1);
        frames.end_frame();
        assert_eq!(frames.write_index(), 0);
        assert_eq!(frames.frame_count(), 2);
    }

    #[test]
    fn test_pressed_and_released_edges() {
        let mut frames = InputFrames::new();
        let held: &[Key] = &[Key::Space];
        let up: &[Key] = &[];

        let edges: Vec<(bool, bool)> = [held, held, up, up]
            .into_iter()
            .map(|keys| run_keyboard_frame(&mut frames, keys))
            .collect();

        assert_eq!(
            edges,
            [(true, false), (false, false), (false, true), (false, false)]
        );
    }

    #[test]
    fn test_unpolled_slot_keeps_last_state() {
        let mut frames = InputFrames::new();

        frames.begin_frame();
        {
            let pad = frames.current_mut().gamepad_mut(0).unwrap();
            pad.is_connected = true;
            pad.button_mut(Button::ActionDown).ended_down = true;
            pad.button_mut(Button::ActionDown).transitioned = true;
        }
        frames.end_frame();

        // Nobody polls the gamepad for several frames
        for _ in 0..5 {
            frames.begin_frame();
            frames.end_frame();
        }

        frames.begin_frame();
        let pad = frames.current().gamepad(0).unwrap();
        assert!(pad.is_connected);
        assert!(pad.button(Button::ActionDown).is_down());
        assert!(!pad.button(Button::ActionDown).was_pressed());
    }

    #[test]
    fn test_previous_holds_last_frame() {
        let mut frames = InputFrames::new();
        let _ = run_keyboard_frame(&mut frames, &[Key::W]);

        frames.begin_frame();
        assert!(frames.previous().keyboard().button(Button::MoveUp).is_down());
        assert!(frames.previous().keyboard().button(Button::MoveUp).was_pressed());
        // Current starts as a copy with transitions cleared
        assert!(frames.current().keyboard().button(Button::MoveUp).is_down());
        assert!(!frames.current().keyboard().button(Button::MoveUp).transitioned);
    }
}
