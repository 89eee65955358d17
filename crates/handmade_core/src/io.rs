//! # Whole-File I/O
//!
//! Reads files straight into arena memory and writes buffers out in one go.
//! Each failure names the stage that failed.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{FileError, FileResult};
use crate::memory::{Arena, ArenaSlice, DEFAULT_BYTE_ALIGNMENT};

/// A file loaded into an arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileData {
    /// The contents, inside the arena passed to [`read_entire_file`].
    pub bytes: ArenaSlice<u8>,
    /// Size in bytes.
    pub size: usize,
    /// Modification time in nanoseconds since the Unix epoch.
    pub last_modified: i64,
}

/// Converts a modification time to signed nanoseconds since the Unix epoch,
/// saturating outside the `i64` range (years 1677 to 2262).
fn unix_nanos(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_nanos()).unwrap_or(i64::MAX),
        Err(before) => i64::try_from(before.duration().as_nanos()).map_or(i64::MIN, |n| -n),
    }
}

/// Returns the modification time of `path` in nanoseconds since the Unix
/// epoch. Edits within the same second still compare as newer.
///
/// # Errors
///
/// [`FileError::StatReadFailed`] if the metadata cannot be read.
pub fn last_modified(path: impl AsRef<Path>) -> FileResult<i64> {
    let path = path.as_ref();
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map(unix_nanos)
        .map_err(|source| FileError::StatReadFailed {
            path: path.to_path_buf(),
            source,
        })
}

/// Reads all of `path` into `arena`.
///
/// # Errors
///
/// One [`FileError`] variant per stage: open, modification time, size,
/// arena allocation, read.
pub fn read_entire_file(path: impl AsRef<Path>, arena: &mut Arena) -> FileResult<FileData> {
    let path = path.as_ref();

    let mut file = File::open(path).map_err(|source| {
        tracing::warn!(path = %path.display(), error = %source, "failed to open file");
        FileError::InvalidFile {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let modified = file
        .metadata()
        .and_then(|meta| meta.modified())
        .map_err(|source| {
            tracing::warn!(
                path = %path.display(),
                error = %source,
                "failed to get the file modification time"
            );
            FileError::StatReadFailed {
                path: path.to_path_buf(),
                source,
            }
        })?;

    let length = file.metadata().map(|meta| meta.len()).map_err(|source| {
        tracing::warn!(path = %path.display(), error = %source, "failed to get file size");
        FileError::SizeReadFailed {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let size = usize::try_from(length).map_err(|_| FileError::SizeReadFailed {
        path: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, "file too large"),
    })?;

    let bytes = arena
        .alloc_bytes(size, DEFAULT_BYTE_ALIGNMENT)
        .map_err(|source| {
            tracing::warn!(path = %path.display(), size, "failed to allocate bytes for file");
            FileError::AllocationFailed {
                path: path.to_path_buf(),
                size,
                source,
            }
        })?;

    let destination = arena
        .bytes_mut(&bytes)
        .map_err(|source| FileError::AllocationFailed {
            path: path.to_path_buf(),
            size,
            source,
        })?;

    file.read_exact(destination).map_err(|source| {
        tracing::warn!(path = %path.display(), error = %source, "failed to read entire file");
        FileError::ReadFailed {
            path: path.to_path_buf(),
            source,
        }
    })?;

    tracing::debug!(path = %path.display(), size, "file loaded");

    Ok(FileData {
        bytes,
        size,
        last_modified: unix_nanos(modified),
    })
}

/// Writes `data` to `path`, replacing any existing file.
///
/// # Errors
///
/// [`FileError::CreateFailed`] or [`FileError::WriteFailed`].
pub fn write_file(path: impl AsRef<Path>, data: &[u8]) -> FileResult<()> {
    let path = path.as_ref();

    let mut file = File::create(path).map_err(|source| {
        tracing::warn!(path = %path.display(), error = %source, "failed to create file");
        FileError::CreateFailed {
            path: path.to_path_buf(),
            source,
        }
    })?;

    file.write_all(data)
        .and_then(|()| file.flush())
        .map_err(|source| {
            tracing::warn!(path = %path.display(), error = %source, "failed to write complete data");
            FileError::WriteFailed {
                path: path.to_path_buf(),
                source,
            }
        })
}
