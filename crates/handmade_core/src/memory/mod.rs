//! # Memory Management
//!
//! Pre-allocated arenas for zero-allocation frames.
//!
//! ## Design Philosophy
//!
//! All memory is reserved once at startup and split by lifetime:
//! - `permanent`: lives for the whole run (game state)
//! - `transient`: rewound at the start of every frame (scratch buffers)

mod arena;

pub use arena::{
    gigabytes, kilobytes, megabytes, Arena, ArenaSlice, DEFAULT_BYTE_ALIGNMENT, MAX_ALIGNMENT,
};

use crate::error::ArenaResult;

/// The two memory blocks handed to the game each frame.
#[derive(Debug)]
pub struct GameMemory {
    /// Memory that persists for the whole run.
    pub permanent: Arena,
    /// Memory that is rewound every frame.
    pub transient: Arena,
}

impl GameMemory {
    /// Reserves both blocks.
    ///
    /// # Errors
    ///
    /// Fails if either backing store cannot be reserved.
    pub fn create(permanent_bytes: usize, transient_bytes: usize) -> ArenaResult<Self> {
        let permanent = Arena::create(permanent_bytes)?;
        let transient = Arena::create(transient_bytes)?;

        tracing::info!(
            permanent_bytes,
            transient_bytes,
            "game memory reserved"
        );

        Ok(Self {
            permanent,
            transient,
        })
    }

    /// Rewinds the transient block. Call once at the top of every frame.
    #[inline]
    pub fn begin_frame(&mut self) {
        self.transient.reset();
    }

    /// Releases both blocks.
    pub fn destroy(&mut self) {
        self.transient.destroy();
        self.permanent.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_rewinds_each_frame() {
        let mut memory = GameMemory::create(kilobytes(1), kilobytes(1)).unwrap();

        let state = memory.permanent.alloc_initialized(42u32).unwrap();
        let _ = memory.transient.alloc::<u8>(100).unwrap();
        assert_eq!(memory.transient.used(), 100);

        memory.begin_frame();
        assert_eq!(memory.transient.used(), 0);
        // Permanent allocations survive
        assert_eq!(*memory.permanent.value(&state).unwrap(), 42);
    }

    #[test]
    fn test_destroy() {
        let mut memory = GameMemory::create(64, 64).unwrap();
        memory.destroy();
        assert_eq!(memory.permanent.capacity(), 0);
        assert_eq!(memory.transient.capacity(), 0);
    }
}
