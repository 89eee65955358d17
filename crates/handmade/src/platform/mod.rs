//! # Platform Seam
//!
//! Everything the loop needs from the operating system, behind one trait.
//!
//! ```text
//! ┌──────────────┐   events, keys, pads   ┌──────────────┐
//! │   Platform   │───────────────────────>│     App      │
//! │ (OS / script)│<───────────────────────│ (frame loop) │
//! └──────────────┘   samples, pixels      └──────────────┘
//! ```
//!
//! Only the headless [`ScriptedPlatform`] ships here. A windowed backend
//! implements the same trait.

mod scripted;

pub use scripted::{ScriptStep, ScriptedPlatform};

use handmade_core::input::{GamepadState, KeyboardState};

use crate::error::PlatformError;
use crate::render::OffscreenBuffer;

/// Something the platform noticed since the last poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    // =========================================================================
    // Window
    // =========================================================================
    /// The user asked to close.
    Quit,

    /// The drawable area changed size.
    Resized {
        /// New width in pixels.
        width: u32,
        /// New height in pixels.
        height: u32,
    },

    /// The window gained (`true`) or lost focus.
    FocusChanged(bool),

    // =========================================================================
    // Devices
    // =========================================================================
    /// A gamepad was plugged into `slot`.
    GamepadAdded {
        /// Gamepad slot, `0..MAX_GAMEPADS`.
        slot: usize,
    },

    /// The gamepad in `slot` went away.
    GamepadRemoved {
        /// Gamepad slot, `0..MAX_GAMEPADS`.
        slot: usize,
    },
}

/// Operating system services used by the frame loop.
pub trait Platform {
    /// Appends pending events to `events`.
    fn poll_events(&mut self, events: &mut Vec<PlatformEvent>);

    /// Keys held right now.
    fn keyboard(&self) -> KeyboardState;

    /// The gamepad in `slot`, or `None` when nothing is plugged in.
    fn gamepad(&self, slot: usize) -> Option<GamepadState>;

    /// Frames queued on the audio device and not yet played.
    fn queued_audio_frames(&self) -> usize;

    /// Queues interleaved samples for playback.
    ///
    /// # Errors
    ///
    /// [`PlatformError::Audio`] if the device rejects them.
    fn queue_audio(&mut self, samples: &[f32]) -> Result<(), PlatformError>;

    /// Shows a finished frame.
    ///
    /// # Errors
    ///
    /// [`PlatformError::Present`] if the frame cannot be shown.
    fn present(&mut self, buffer: &OffscreenBuffer) -> Result<(), PlatformError>;
}
