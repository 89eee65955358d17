//! # Core Error Types
//!
//! All errors that can occur in arena allocation and file I/O.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while carving memory out of an [`Arena`](crate::Arena).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    /// The arena does not have enough room left for the request.
    #[error("arena exhausted: requested {requested} bytes, {remaining} remaining")]
    OutOfMemory {
        /// Bytes requested, including alignment padding.
        requested: usize,
        /// Bytes left in the arena before the request.
        remaining: usize,
    },

    /// The requested alignment is zero, not a power of two, or too large.
    #[error("invalid alignment {0}")]
    InvalidAlignment(usize),

    /// The backing store could not be reserved.
    #[error("failed to reserve {0} bytes of backing memory")]
    BackingAllocation(usize),

    /// The handle was issued before the arena was reset or destroyed.
    #[error("stale arena handle (generation {handle}, arena at {arena})")]
    StaleHandle {
        /// Generation recorded in the handle.
        handle: u32,
        /// Current arena generation.
        arena: u32,
    },

    /// The handle's byte range does not fit a `T` view.
    #[error("arena view cast failed: {0}")]
    Cast(String),
}

/// Result type for arena operations.
pub type ArenaResult<T> = Result<T, ArenaError>;

/// Errors that can occur while reading or writing whole files.
///
/// Each variant names the stage that failed.
#[derive(Error, Debug)]
pub enum FileError {
    /// The file could not be opened.
    #[error("failed to open {path}: {source}")]
    InvalidFile {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The modification time could not be read.
    #[error("failed to get the modification time of {path}: {source}")]
    StatReadFailed {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The file size could not be read.
    #[error("failed to get the size of {path}: {source}")]
    SizeReadFailed {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The arena had no room for the file contents.
    #[error("failed to allocate {size} bytes for {path}: {source}")]
    AllocationFailed {
        /// File path.
        path: PathBuf,
        /// File size in bytes.
        size: usize,
        /// Arena failure.
        #[source]
        source: ArenaError,
    },

    /// The contents could not be read completely.
    #[error("failed to read entire file {path}: {source}")]
    ReadFailed {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The output file could not be created.
    #[error("failed to create file {path}: {source}")]
    CreateFailed {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The data could not be written completely.
    #[error("failed to write complete data to {path}: {source}")]
    WriteFailed {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

/// Result type for file operations.
pub type FileResult<T> = Result<T, FileError>;
