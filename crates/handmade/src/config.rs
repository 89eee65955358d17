//! # Configuration
//!
//! `handmade.toml`, loaded once at startup and re-read when its modification
//! time advances. Every section and field is optional.
//!
//! ```toml
//! [window]
//! width = 640
//! height = 360
//!
//! [audio]
//! tone_hz = 256.0
//!
//! [[headless.script]]
//! frames = 30
//! keys = ["D"]
//! ```

use std::path::{Path, PathBuf};

use handmade_core::input::{Button, Key, STICK_DEADZONE};
use handmade_core::{megabytes, read_entire_file, Arena};
use serde::{Deserialize, Serialize};

use crate::constants::{
    CHANNELS, PERMANENT_MB, SAMPLE_RATE, TARGET_FPS, TARGET_LATENCY_MS, TONE_HZ, TONE_VOLUME,
    TRANSIENT_MB, WINDOW_HEIGHT, WINDOW_TITLE, WINDOW_WIDTH,
};
use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Window / back buffer.
    pub window: WindowConfig,
    /// Arena sizes.
    pub memory: MemoryConfig,
    /// Tone output.
    pub audio: AudioConfig,
    /// Device tuning.
    pub input: InputConfig,
    /// Loop pacing and diagnostics.
    pub frame: FrameConfig,
    /// Scripted platform.
    pub headless: HeadlessConfig,
}

/// Window / back buffer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title.
    pub title: String,
    /// Back buffer width in pixels.
    pub width: u32,
    /// Back buffer height in pixels.
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: WINDOW_TITLE.to_owned(),
            width: WINDOW_WIDTH,
            height: WINDOW_HEIGHT,
        }
    }
}

/// Arena sizes in MiB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Memory that lives for the whole run.
    pub permanent_mb: usize,
    /// Memory rewound every frame.
    pub transient_mb: usize,
}

impl MemoryConfig {
    /// Permanent block size in bytes.
    #[must_use]
    pub const fn permanent_bytes(&self) -> usize {
        megabytes(self.permanent_mb)
    }

    /// Transient block size in bytes.
    #[must_use]
    pub const fn transient_bytes(&self) -> usize {
        megabytes(self.transient_mb)
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            permanent_mb: PERMANENT_MB,
            transient_mb: TRANSIENT_MB,
        }
    }
}

/// Tone output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Samples per second per channel.
    pub sample_rate: u32,
    /// Interleaved channels.
    pub channels: u16,
    /// How far ahead the device queue is kept filled.
    pub target_latency_ms: u32,
    /// Amplitude, `0..=1`.
    pub volume: f32,
    /// Frequency with the stick centered.
    pub tone_hz: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            channels: CHANNELS,
            target_latency_ms: TARGET_LATENCY_MS,
            volume: TONE_VOLUME,
            tone_hz: TONE_HZ,
        }
    }
}

/// Device tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Raw stick magnitude treated as centered.
    pub stick_deadzone: i16,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            stick_deadzone: STICK_DEADZONE,
        }
    }
}

/// Loop pacing and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Frames per second the loop aims for.
    pub target_fps: u32,
    /// Sleep out the rest of each frame.
    pub pace: bool,
    /// Log frames that blow the budget.
    pub enable_timing_logs: bool,
    /// Check the config file every this many frames; 0 disables reloading.
    pub reload_check_frames: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            target_fps: TARGET_FPS,
            pace: false,
            enable_timing_logs: false,
            reload_check_frames: 60,
        }
    }
}

/// Scripted platform settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlessConfig {
    /// Where to write the last frame as PPM.
    pub snapshot_path: Option<PathBuf>,
    /// Input replayed one step after another; the run quits at the end.
    pub script: Vec<ScriptStepConfig>,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            script: vec![
                ScriptStepConfig::keys(60, &["D"]),
                ScriptStepConfig::keys(30, &["S"]),
                ScriptStepConfig::keys(30, &[]),
                ScriptStepConfig::keys(1, &["Escape"]),
            ],
        }
    }
}

/// One step of the headless script.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptStepConfig {
    /// How many frames the step lasts.
    pub frames: u32,
    /// Keys held during the step (`W`, `Escape`, `Space`, ...).
    pub keys: Vec<String>,
    /// Gamepad sample during the step; absent means unplugged.
    pub gamepad: Option<GamepadStepConfig>,
}

impl ScriptStepConfig {
    fn keys(frames: u32, keys: &[&str]) -> Self {
        Self {
            frames,
            keys: keys.iter().map(|&k| k.to_owned()).collect(),
            gamepad: None,
        }
    }

    /// Parses the key names.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] on an unknown key.
    pub fn parsed_keys(&self) -> Result<Vec<Key>, ConfigError> {
        self.keys
            .iter()
            .map(|name| {
                name.parse::<Key>()
                    .map_err(|e| ConfigError::Invalid(e.to_string()))
            })
            .collect()
    }
}

/// Gamepad sample inside a script step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamepadStepConfig {
    /// Gamepad slot, `0..4`.
    pub slot: usize,
    /// Raw left stick X.
    pub stick_x: i16,
    /// Raw left stick Y (down is positive).
    pub stick_y: i16,
    /// Raw left trigger, `0..=32767`.
    pub left_trigger: i16,
    /// Raw right trigger, `0..=32767`.
    pub right_trigger: i16,
    /// Held buttons by name (`start`, `action_down`, `move_left`, ...).
    pub buttons: Vec<String>,
}

impl GamepadStepConfig {
    /// Parses the button names.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] on an unknown button.
    pub fn parsed_buttons(&self) -> Result<Vec<Button>, ConfigError> {
        self.buttons
            .iter()
            .map(|name| {
                parse_button(name)
                    .ok_or_else(|| ConfigError::Invalid(format!("unknown button: {name}")))
            })
            .collect()
    }
}

fn parse_button(name: &str) -> Option<Button> {
    let button = match name.to_ascii_lowercase().as_str() {
        "move_up" | "dpad_up" => Button::MoveUp,
        "move_down" | "dpad_down" => Button::MoveDown,
        "move_left" | "dpad_left" => Button::MoveLeft,
        "move_right" | "dpad_right" => Button::MoveRight,
        "action_up" | "north" => Button::ActionUp,
        "action_down" | "south" => Button::ActionDown,
        "action_left" | "west" => Button::ActionLeft,
        "action_right" | "east" => Button::ActionRight,
        "left_shoulder" => Button::LeftShoulder,
        "right_shoulder" => Button::RightShoulder,
        "back" => Button::Back,
        "start" => Button::Start,
        _ => return None,
    };
    Some(button)
}

impl AppConfig {
    /// Parses and validates TOML text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `path` into `arena` and parses it. Returns the config and the
    /// file's modification time.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`].
    pub fn load(path: impl AsRef<Path>, arena: &mut Arena) -> Result<(Self, i64), ConfigError> {
        let path = path.as_ref();
        let file = read_entire_file(path, arena)?;
        let text = std::str::from_utf8(arena.bytes(&file.bytes)?)?;
        let config = Self::from_toml_str(text)?;

        tracing::info!(path = %path.display(), "config loaded");
        Ok((config, file.last_modified))
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_owned()));

        if self.memory.permanent_mb == 0 || self.memory.transient_mb == 0 {
            return invalid("memory sizes must be greater than zero");
        }
        let fits = |mb: usize| mb.checked_mul(1024 * 1024).is_some();
        if !fits(self.memory.permanent_mb) || !fits(self.memory.transient_mb) {
            return invalid("memory sizes overflow the address space");
        }
        if self.audio.sample_rate == 0 {
            return invalid("audio.sample_rate must be greater than zero");
        }
        if !(1..=8).contains(&self.audio.channels) {
            return invalid("audio.channels must be between 1 and 8");
        }
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return invalid("audio.volume must be between 0 and 1");
        }
        if !(self.audio.tone_hz.is_finite() && self.audio.tone_hz > 0.0) {
            return invalid("audio.tone_hz must be a positive number");
        }
        if self.frame.target_fps == 0 {
            return invalid("frame.target_fps must be greater than zero");
        }
        if self.input.stick_deadzone < 0 {
            return invalid("input.stick_deadzone must not be negative");
        }
        for step in &self.headless.script {
            step.parsed_keys()?;
            if let Some(pad) = &step.gamepad {
                if pad.slot >= handmade_core::input::MAX_GAMEPADS {
                    return invalid("headless.script gamepad slot out of range");
                }
                if pad.left_trigger < 0 || pad.right_trigger < 0 {
                    return invalid("headless.script gamepad triggers must not be negative");
                }
                pad.parsed_buttons()?;
            }
        }
        Ok(())
    }
}
