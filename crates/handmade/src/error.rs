//! # Application Error Types
//!
//! All errors that can stop the application or a reload.

use handmade_core::{ArenaError, FileError};
use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error(transparent)]
    File(#[from] FileError),

    /// The file is not UTF-8.
    #[error("config is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The file is not valid TOML for this schema.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The loaded bytes could not be viewed.
    #[error(transparent)]
    Memory(#[from] ArenaError),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors reported by a [`Platform`](crate::platform::Platform).
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The frame could not be shown.
    #[error("present failed: {0}")]
    Present(String),

    /// Samples could not be queued.
    #[error("audio queue failed: {0}")]
    Audio(String),
}

/// Errors that stop the application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration failed to load or validate.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Game memory failed.
    #[error("memory: {0}")]
    Memory(#[from] ArenaError),

    /// The platform failed.
    #[error("platform: {0}")]
    Platform(#[from] PlatformError),

    /// A file could not be written.
    #[error(transparent)]
    File(#[from] FileError),
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;
