//! # Handmade
//!
//! The game, the frame loop that drives it and the seam to the operating
//! system.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                               App                                   │
//! │                                                                     │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────────────┐    │
//! │  │   Platform   │──>│ InputFrames  │──>│        Game          │    │
//! │  │ (scripted or │   │ (edge detect)│   │ state in permanent   │    │
//! │  │   windowed)  │   └──────────────┘   │ arena, draws buffer  │    │
//! │  │              │<──────────────────────┤ tone_hz              │    │
//! │  │              │   OffscreenBuffer     └──────────────────────┘    │
//! │  │              │<── ToneGenerator (scratch in transient arena)     │
//! │  └──────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `app`: Context struct, frame loop, timing
//! - `config`: `handmade.toml`
//! - `game`: Update and render
//! - `platform`: `Platform` trait, headless implementation
//! - `render`: Software back buffer
//! - `sound`: Sine tone

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod game;
pub mod platform;
pub mod render;
pub mod sound;

pub use app::{App, FrameStats, FrameStatsAccumulator};
pub use config::AppConfig;
pub use error::{AppError, AppResult, ConfigError, PlatformError};
pub use game::{Game, GameOutput, GameState};
pub use platform::{Platform, PlatformEvent, ScriptStep, ScriptedPlatform};
pub use render::OffscreenBuffer;
pub use sound::{AudioSettings, ToneGenerator};
