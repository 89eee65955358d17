//! # Handmade Core
//!
//! Frame-oriented building blocks for a small platform-layer game:
//! - Bump arenas for permanent and per-frame memory
//! - Double-buffered input with pressed/released edge detection
//! - Whole-file reads into arena memory
//!
//! ## Architecture Rules
//!
//! 1. **No heap allocations in the frame loop** - memory is reserved at startup
//! 2. **No platform types** - devices are sampled by the caller and handed in
//! 3. **Running out of memory is an error value** - never an abort
//!
//! ## Example
//!
//! ```rust
//! use handmade_core::{megabytes, GameMemory};
//!
//! let mut memory = GameMemory::create(megabytes(1), megabytes(1)).unwrap();
//! let scratch = memory.transient.alloc::<f32>(1024).unwrap();
//! assert_eq!(scratch.len(), 1024);
//! memory.begin_frame(); // scratch is gone
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod input;
pub mod io;
pub mod memory;

pub use error::{ArenaError, ArenaResult, FileError, FileResult};
pub use input::{Button, ButtonState, ControllerInput, GameInput, InputFrames};
pub use io::{last_modified, read_entire_file, write_file, FileData};
pub use memory::{gigabytes, kilobytes, megabytes, Arena, ArenaSlice, GameMemory};
