//! # Game Update
//!
//! Reads one frame of input, updates state in the permanent arena and draws.
//! Knows nothing about windows or devices.

use bytemuck::{Pod, Zeroable};
use handmade_core::input::Button;
use handmade_core::{ArenaResult, ArenaSlice, GameInput, GameMemory};

use crate::constants::{MAX_TONE_HZ, MIN_TONE_HZ};
use crate::render::{render_weird_gradient, OffscreenBuffer};
use crate::sound::{AudioSettings, ToneGenerator};

/// Pixels per frame the gradient scrolls at full stick deflection.
const STICK_SCROLL_SPEED: f32 = 4.0;

/// Hz the tone moves at full stick deflection.
const STICK_TONE_RANGE: f32 = 128.0;

/// State that survives across frames. Lives in the permanent arena.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameState {
    /// Horizontal gradient scroll.
    pub blue_offset: i32,
    /// Vertical gradient scroll.
    pub green_offset: i32,
    /// Current tone frequency.
    pub tone_hz: f32,
}

/// What the frame asks of the platform layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameOutput {
    /// Start or Back was pressed this frame.
    pub quit_requested: bool,
    /// Frequency for this frame's audio.
    pub tone_hz: f32,
}

/// The game, holding its handle into permanent memory.
#[derive(Debug, Clone, Copy)]
pub struct Game {
    state: Option<ArenaSlice<GameState>>,
    base_tone_hz: f32,
}

impl Game {
    /// A game whose tone rests at `base_tone_hz`.
    #[must_use]
    pub const fn new(base_tone_hz: f32) -> Self {
        Self {
            state: None,
            base_tone_hz,
        }
    }

    /// Changes the resting tone. Takes effect on the next analog update.
    pub fn set_base_tone_hz(&mut self, hz: f32) {
        self.base_tone_hz = hz;
    }

    /// Reads the state, if the first update has run.
    #[must_use]
    pub fn state(&self, memory: &GameMemory) -> Option<GameState> {
        let handle = self.state.as_ref()?;
        memory.permanent.value(handle).ok().copied()
    }

    /// Runs one frame.
    ///
    /// # Errors
    ///
    /// Fails if the permanent arena cannot hold the state or the state
    /// handle went stale.
    pub fn update_and_render(
        &mut self,
        memory: &mut GameMemory,
        input: &GameInput,
        buffer: &mut OffscreenBuffer,
    ) -> ArenaResult<GameOutput> {
        let handle = match self.state {
            Some(handle) => handle,
            None => {
                let handle = memory.permanent.alloc_initialized(GameState {
                    blue_offset: 0,
                    green_offset: 0,
                    tone_hz: self.base_tone_hz,
                })?;
                tracing::debug!(offset = handle.offset(), "game state allocated");
                self.state = Some(handle);
                handle
            }
        };

        let state = memory.permanent.value_mut(&handle)?;
        let mut quit_requested = false;

        for (index, controller) in input.controllers.iter().enumerate() {
            if !controller.is_connected {
                continue;
            }

            if controller.is_analog {
                #[allow(clippy::cast_possible_truncation)]
                let scroll = (STICK_SCROLL_SPEED * controller.stick_average_x) as i32;
                state.blue_offset = state.blue_offset.wrapping_add(scroll);
                state.tone_hz = self.base_tone_hz + STICK_TONE_RANGE * controller.stick_average_y;
            } else {
                let axis = |negative: Button, positive: Button| {
                    i32::from(controller.button(positive).is_down())
                        - i32::from(controller.button(negative).is_down())
                };
                state.blue_offset = state
                    .blue_offset
                    .wrapping_add(axis(Button::MoveLeft, Button::MoveRight));
                state.green_offset = state
                    .green_offset
                    .wrapping_add(axis(Button::MoveUp, Button::MoveDown));
            }

            if controller.button(Button::ActionDown).was_pressed() {
                tracing::info!(controller = index, "action down pressed");
            }
            if controller.button(Button::ActionRight).was_pressed() {
                tracing::info!(controller = index, "action right pressed");
            }
            if controller.left_trigger > 0.0 || controller.right_trigger > 0.0 {
                tracing::debug!(
                    controller = index,
                    left = controller.left_trigger,
                    right = controller.right_trigger,
                    "triggers"
                );
            }
            if controller.button(Button::Start).was_pressed()
                || controller.button(Button::Back).was_pressed()
            {
                tracing::info!(controller = index, "quit requested");
                quit_requested = true;
            }
        }

        state.tone_hz = state.tone_hz.clamp(MIN_TONE_HZ, MAX_TONE_HZ);
        let snapshot = *state;

        render_weird_gradient(buffer, snapshot.blue_offset, snapshot.green_offset);

        Ok(GameOutput {
            quit_requested,
            tone_hz: snapshot.tone_hz,
        })
    }
}

/// Writes `samples` of the current tone. Returns frames written.
pub fn output_sound(
    tone_hz: f32,
    generator: &mut ToneGenerator,
    settings: &AudioSettings,
    samples: &mut [f32],
) -> usize {
    generator.fill(settings, tone_hz, samples)
}
