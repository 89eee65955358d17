//! # Scripted Platform
//!
//! No window, no audio device. Input comes from a script, presented frames
//! are kept in memory, and the audio queue drains at real-time speed as if
//! a device were playing it.

use std::collections::VecDeque;

use handmade_core::input::{GamepadState, KeyboardState, MAX_GAMEPADS};

use super::{Platform, PlatformEvent};
use crate::config::HeadlessConfig;
use crate::error::{ConfigError, PlatformError};
use crate::render::OffscreenBuffer;
use crate::sound::AudioSettings;

/// Input held for a run of frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptStep {
    /// How many frames the step lasts.
    pub frames: u32,
    /// Keys held.
    pub keys: KeyboardState,
    /// Gamepad plugged in during the step, with its slot.
    pub gamepad: Option<(usize, GamepadState)>,
}

/// Headless [`Platform`] that replays a script, then asks to quit.
#[derive(Debug)]
pub struct ScriptedPlatform {
    steps: Vec<ScriptStep>,
    step_index: usize,
    frames_left: u32,
    current: ScriptStep,
    quit_sent: bool,
    pending: VecDeque<PlatformEvent>,

    channels: usize,
    drain_per_poll: usize,
    queued_frames: usize,
    total_queued_frames: usize,

    last_frame: OffscreenBuffer,
    present_count: u64,
}

impl ScriptedPlatform {
    /// A platform replaying `steps`, draining `drain_per_poll` audio frames
    /// per poll of a `channels`-channel stream.
    #[must_use]
    pub fn new(steps: Vec<ScriptStep>, channels: u16, drain_per_poll: usize) -> Self {
        Self {
            steps,
            step_index: 0,
            frames_left: 0,
            current: ScriptStep::default(),
            quit_sent: false,
            pending: VecDeque::new(),
            channels: usize::from(channels.max(1)),
            drain_per_poll,
            queued_frames: 0,
            total_queued_frames: 0,
            last_frame: OffscreenBuffer::default(),
            present_count: 0,
        }
    }

    /// Builds the script from the `[headless]` section. The device drains
    /// one frame's worth of samples per poll at `target_fps`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] on unknown key or button names.
    pub fn from_config(
        config: &HeadlessConfig,
        audio: &AudioSettings,
        target_fps: u32,
    ) -> Result<Self, ConfigError> {
        let mut steps = Vec::with_capacity(config.script.len());
        for step in &config.script {
            let keys = KeyboardState::from_keys(&step.parsed_keys()?);
            let gamepad = match &step.gamepad {
                Some(pad) => {
                    let mut state = GamepadState {
                        stick_x: pad.stick_x,
                        stick_y: pad.stick_y,
                        left_trigger: pad.left_trigger,
                        right_trigger: pad.right_trigger,
                        ..GamepadState::default()
                    };
                    for button in pad.parsed_buttons()? {
                        state = state.with_button(button);
                    }
                    Some((pad.slot, state))
                }
                None => None,
            };
            steps.push(ScriptStep {
                frames: step.frames,
                keys,
                gamepad,
            });
        }

        let drain = usize::try_from(audio.sample_rate / target_fps.max(1)).unwrap_or(usize::MAX);
        tracing::debug!(steps = steps.len(), drain, "script loaded");
        Ok(Self::new(steps, audio.channels, drain))
    }

    /// Queues an event for the next poll.
    pub fn push_event(&mut self, event: PlatformEvent) {
        self.pending.push_back(event);
    }

    /// The most recently presented frame.
    #[must_use]
    pub const fn last_frame(&self) -> &OffscreenBuffer {
        &self.last_frame
    }

    /// Frames presented so far.
    #[must_use]
    pub const fn present_count(&self) -> u64 {
        self.present_count
    }

    /// Audio frames queued over the whole run.
    #[must_use]
    pub const fn total_queued_frames(&self) -> usize {
        self.total_queued_frames
    }

    /// Returns true once every step has been replayed.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.quit_sent
    }

    /// Moves to the next step with frames left, emitting device changes.
    fn advance(&mut self, events: &mut Vec<PlatformEvent>) {
        while self.frames_left == 0 {
            let Some(&next) = self.steps.get(self.step_index) else {
                self.finish(events);
                return;
            };
            self.step_index += 1;
            if next.frames == 0 {
                continue;
            }

            let before = self.current.gamepad.map(|(slot, _)| slot);
            let after = next.gamepad.map(|(slot, _)| slot);
            if before != after {
                if let Some(slot) = before {
                    events.push(PlatformEvent::GamepadRemoved { slot });
                }
                if let Some(slot) = after {
                    events.push(PlatformEvent::GamepadAdded { slot });
                }
            }

            self.current = next;
            self.frames_left = next.frames;
        }
        self.frames_left -= 1;
    }

    fn finish(&mut self, events: &mut Vec<PlatformEvent>) {
        if self.quit_sent {
            return;
        }
        if let Some((slot, _)) = self.current.gamepad {
            events.push(PlatformEvent::GamepadRemoved { slot });
        }
        self.current = ScriptStep::default();
        self.quit_sent = true;
        events.push(PlatformEvent::Quit);
        tracing::debug!("script finished");
    }
}

impl Platform for ScriptedPlatform {
    fn poll_events(&mut self, events: &mut Vec<PlatformEvent>) {
        self.queued_frames = self.queued_frames.saturating_sub(self.drain_per_poll);
        events.extend(self.pending.drain(..));
        self.advance(events);
    }

    fn keyboard(&self) -> KeyboardState {
        self.current.keys
    }

    fn gamepad(&self, slot: usize) -> Option<GamepadState> {
        match self.current.gamepad {
            Some((pad_slot, state)) if pad_slot == slot && slot < MAX_GAMEPADS => Some(state),
            _ => None,
        }
    }

    fn queued_audio_frames(&self) -> usize {
        self.queued_frames
    }

    fn queue_audio(&mut self, samples: &[f32]) -> Result<(), PlatformError> {
        if samples.len() % self.channels != 0 {
            return Err(PlatformError::Audio(format!(
                "{} samples is not a whole number of {}-channel frames",
                samples.len(),
                self.channels
            )));
        }
        let frames = samples.len() / self.channels;
        self.queued_frames += frames;
        self.total_queued_frames += frames;
        Ok(())
    }

    fn present(&mut self, buffer: &OffscreenBuffer) -> Result<(), PlatformError> {
        self.last_frame.clone_from(buffer);
        self.present_count += 1;
        Ok(())
    }
}
