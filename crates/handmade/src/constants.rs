//! # Defaults
//!
//! Values used when the configuration file does not say otherwise.

// =============================================================================
// WINDOW
// =============================================================================

/// Window title.
pub const WINDOW_TITLE: &str = "Handmade Hero";

/// Back buffer width in pixels.
pub const WINDOW_WIDTH: u32 = 1280;

/// Back buffer height in pixels.
pub const WINDOW_HEIGHT: u32 = 720;

/// Frames per second the loop aims for.
pub const TARGET_FPS: u32 = 60;

// =============================================================================
// MEMORY
// =============================================================================

/// Permanent block size in MiB.
pub const PERMANENT_MB: usize = 64;

/// Transient block size in MiB.
pub const TRANSIENT_MB: usize = 64;

/// Scratch arena used to read the config before game memory exists.
pub const CONFIG_ARENA_KB: usize = 256;

// =============================================================================
// AUDIO
// =============================================================================

/// Output sample rate.
pub const SAMPLE_RATE: u32 = 48_000;

/// Interleaved output channels.
pub const CHANNELS: u16 = 2;

/// How far ahead the device queue is kept filled.
pub const TARGET_LATENCY_MS: u32 = 100;

/// Tone amplitude, `0..=1`.
pub const TONE_VOLUME: f32 = 0.1;

/// Tone frequency with the stick centered.
pub const TONE_HZ: f32 = 440.0;

/// Lowest tone the stick can reach.
pub const MIN_TONE_HZ: f32 = 20.0;

/// Highest tone the stick can reach.
pub const MAX_TONE_HZ: f32 = 20_000.0;

// =============================================================================
// FILES
// =============================================================================

/// Config file read when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "handmade.toml";
