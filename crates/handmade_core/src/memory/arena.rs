//! # Arena Allocator
//!
//! A bump allocator carved out of one zero-filled block. Allocations are
//! never freed individually; the whole arena is reset or destroyed at once.

use std::marker::PhantomData;
use std::mem::{align_of, size_of};

use bytemuck::Pod;

use crate::error::{ArenaError, ArenaResult};

/// Backing word. Its alignment is the largest alignment the arena serves.
type Word = u128;

/// Largest alignment an allocation may request.
pub const MAX_ALIGNMENT: usize = align_of::<Word>();

/// Alignment used by [`Arena::alloc_bytes`] callers that have no opinion.
pub const DEFAULT_BYTE_ALIGNMENT: usize = size_of::<usize>();

/// Returns `kb` kibibytes in bytes, saturating at `usize::MAX`.
///
/// A saturated size can never be reserved, so [`Arena::create`] reports it
/// as [`ArenaError::BackingAllocation`].
#[inline]
#[must_use]
pub const fn kilobytes(kb: usize) -> usize {
    kb.saturating_mul(1024)
}

/// Returns `mb` mebibytes in bytes, saturating at `usize::MAX`.
#[inline]
#[must_use]
pub const fn megabytes(mb: usize) -> usize {
    kilobytes(mb).saturating_mul(1024)
}

/// Returns `gb` gibibytes in bytes, saturating at `usize::MAX`.
#[inline]
#[must_use]
pub const fn gigabytes(gb: usize) -> usize {
    megabytes(gb).saturating_mul(1024)
}

/// Handle to `len` values of `T` carved out of an [`Arena`].
///
/// Handles are plain data: copy them freely, store them in other arena
/// allocations. Access always goes through the arena that issued them.
pub struct ArenaSlice<T> {
    offset: usize,
    len: usize,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ArenaSlice<T> {
    /// Byte offset of the first element from the start of the arena.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the handle covers no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size of the allocation in bytes.
    #[inline]
    #[must_use]
    pub const fn byte_len(&self) -> usize {
        self.len * size_of::<T>()
    }

    /// One past the last byte of the allocation.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset + self.byte_len()
    }
}

impl<T> Clone for ArenaSlice<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ArenaSlice<T> {}

impl<T> PartialEq for ArenaSlice<T> {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset && self.len == other.len && self.generation == other.generation
    }
}

impl<T> Eq for ArenaSlice<T> {}

impl<T> std::fmt::Debug for ArenaSlice<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArenaSlice")
            .field("type", &std::any::type_name::<T>())
            .field("offset", &self.offset)
            .field("len", &self.len)
            .field("generation", &self.generation)
            .finish()
    }
}

/// A bump-pointer arena allocator.
///
/// The whole block is reserved and zeroed up front. Each allocation bumps
/// `used` to the next suitably aligned offset; `used <= capacity` always
/// holds. Running out of room is reported as [`ArenaError::OutOfMemory`]
/// and leaves the arena untouched.
///
/// Values are viewed through [`bytemuck::Pod`], so the arena needs no
/// `unsafe` to hand out typed slices.
///
/// # Example
///
/// ```rust
/// use handmade_core::Arena;
///
/// let mut arena = Arena::create(1024).unwrap();
/// let bytes = arena.alloc::<u8>(10).unwrap();
/// let word = arena.alloc::<u32>(1).unwrap();
/// assert_eq!(bytes.offset(), 0);
/// assert_eq!(word.offset(), 12);
/// ```
pub struct Arena {
    /// Backing store, `capacity` rounded up to whole words.
    storage: Vec<Word>,
    /// Usable size in bytes.
    capacity: usize,
    /// Current allocation offset.
    used: usize,
    /// Bumped on reset/destroy so older handles are rejected.
    generation: u32,
}

impl Arena {
    /// Reserves and zero-fills `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::BackingAllocation`] if the block cannot be
    /// reserved.
    pub fn create(size: usize) -> ArenaResult<Self> {
        let words = size.div_ceil(size_of::<Word>());

        let mut storage: Vec<Word> = Vec::new();
        if storage.try_reserve_exact(words).is_err() {
            tracing::error!(bytes = size, "failed to reserve arena backing memory");
            return Err(ArenaError::BackingAllocation(size));
        }
        storage.resize(words, 0);

        tracing::debug!(bytes = size, "arena created");

        Ok(Self {
            storage,
            capacity: size,
            used: 0,
            generation: 0,
        })
    }

    /// Releases the backing store. Every later allocation fails and every
    /// earlier handle is stale.
    pub fn destroy(&mut self) {
        self.storage = Vec::new();
        self.capacity = 0;
        self.used = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Rewinds the cursor to zero. Earlier handles become stale.
    ///
    /// Memory is not re-zeroed.
    #[inline]
    pub fn reset(&mut self) {
        self.used = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Returns the total capacity in bytes.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the current used space in bytes.
    #[inline]
    #[must_use]
    pub const fn used(&self) -> usize {
        self.used
    }

    /// Returns the remaining free space in bytes.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.capacity - self.used
    }

    /// Carves out room for `count` values of `T`, aligned to `align_of::<T>()`.
    ///
    /// The memory is whatever the arena holds: zero for a fresh arena,
    /// possibly stale data after [`reset`](Self::reset).
    ///
    /// # Errors
    ///
    /// [`ArenaError::OutOfMemory`] if the request does not fit,
    /// [`ArenaError::InvalidAlignment`] if `T` needs more than
    /// [`MAX_ALIGNMENT`].
    pub fn alloc<T: Pod>(&mut self, count: usize) -> ArenaResult<ArenaSlice<T>> {
        let Some(size) = size_of::<T>().checked_mul(count) else {
            return Err(ArenaError::OutOfMemory {
                requested: usize::MAX,
                remaining: self.remaining(),
            });
        };

        let offset = self.bump(size, align_of::<T>())?;

        Ok(ArenaSlice {
            offset,
            len: count,
            generation: self.generation,
            _marker: PhantomData,
        })
    }

    /// Carves out one `T` and stores `value` in it.
    ///
    /// # Errors
    ///
    /// Same as [`alloc`](Self::alloc).
    pub fn alloc_initialized<T: Pod>(&mut self, value: T) -> ArenaResult<ArenaSlice<T>> {
        let handle = self.alloc::<T>(1)?;
        *self.value_mut(&handle)? = value;
        Ok(handle)
    }

    /// Carves out `size` raw bytes at `alignment`.
    ///
    /// # Errors
    ///
    /// [`ArenaError::InvalidAlignment`] if `alignment` is not a power of two
    /// no larger than [`MAX_ALIGNMENT`], [`ArenaError::OutOfMemory`] if the
    /// request does not fit.
    pub fn alloc_bytes(&mut self, size: usize, alignment: usize) -> ArenaResult<ArenaSlice<u8>> {
        let offset = self.bump(size, alignment)?;

        Ok(ArenaSlice {
            offset,
            len: size,
            generation: self.generation,
            _marker: PhantomData,
        })
    }

    /// Views an allocation as a slice of `T`.
    ///
    /// # Errors
    ///
    /// [`ArenaError::StaleHandle`] if the arena was reset or destroyed since
    /// the handle was issued.
    pub fn slice<T: Pod>(&self, handle: &ArenaSlice<T>) -> ArenaResult<&[T]> {
        let bytes = self.byte_range(handle)?;
        let bytes = &bytemuck::cast_slice::<Word, u8>(&self.storage)[bytes];
        bytemuck::try_cast_slice(bytes).map_err(|e| ArenaError::Cast(format!("{e:?}")))
    }

    /// Views an allocation as a mutable slice of `T`.
    ///
    /// # Errors
    ///
    /// Same as [`slice`](Self::slice).
    pub fn slice_mut<T: Pod>(&mut self, handle: &ArenaSlice<T>) -> ArenaResult<&mut [T]> {
        let bytes = self.byte_range(handle)?;
        let bytes = &mut bytemuck::cast_slice_mut::<Word, u8>(&mut self.storage)[bytes];
        bytemuck::try_cast_slice_mut(bytes).map_err(|e| ArenaError::Cast(format!("{e:?}")))
    }

    /// Views the first element of an allocation.
    ///
    /// # Errors
    ///
    /// Same as [`slice`](Self::slice), plus [`ArenaError::Cast`] for an
    /// empty handle.
    pub fn value<T: Pod>(&self, handle: &ArenaSlice<T>) -> ArenaResult<&T> {
        self.slice(handle)?
            .first()
            .ok_or_else(|| ArenaError::Cast("empty allocation".to_owned()))
    }

    /// Mutably views the first element of an allocation.
    ///
    /// # Errors
    ///
    /// Same as [`value`](Self::value).
    pub fn value_mut<T: Pod>(&mut self, handle: &ArenaSlice<T>) -> ArenaResult<&mut T> {
        self.slice_mut(handle)?
            .first_mut()
            .ok_or_else(|| ArenaError::Cast("empty allocation".to_owned()))
    }

    /// Views any allocation as raw bytes.
    ///
    /// # Errors
    ///
    /// Same as [`slice`](Self::slice).
    pub fn bytes<T>(&self, handle: &ArenaSlice<T>) -> ArenaResult<&[u8]> {
        let range = self.byte_range(handle)?;
        Ok(&bytemuck::cast_slice::<Word, u8>(&self.storage)[range])
    }

    /// Mutably views any allocation as raw bytes.
    ///
    /// # Errors
    ///
    /// Same as [`slice`](Self::slice).
    pub fn bytes_mut<T>(&mut self, handle: &ArenaSlice<T>) -> ArenaResult<&mut [u8]> {
        let range = self.byte_range(handle)?;
        Ok(&mut bytemuck::cast_slice_mut::<Word, u8>(&mut self.storage)[range])
    }

    /// Moves the cursor past `size` bytes at `alignment`, returning the
    /// start offset. Leaves the cursor alone on failure.
    fn bump(&mut self, size: usize, alignment: usize) -> ArenaResult<usize> {
        if !alignment.is_power_of_two() || alignment > MAX_ALIGNMENT {
            return Err(ArenaError::InvalidAlignment(alignment));
        }

        let aligned_used = (self.used + alignment - 1) & !(alignment - 1);
        let padding = aligned_used - self.used;

        let fits = aligned_used
            .checked_add(size)
            .is_some_and(|end| end <= self.capacity);
        if !fits {
            tracing::warn!(
                requested = size,
                padding,
                remaining = self.remaining(),
                "arena exhausted"
            );
            return Err(ArenaError::OutOfMemory {
                requested: size.saturating_add(padding),
                remaining: self.remaining(),
            });
        }

        self.used = aligned_used + size;
        Ok(aligned_used)
    }

    fn byte_range<T>(&self, handle: &ArenaSlice<T>) -> ArenaResult<std::ops::Range<usize>> {
        if handle.generation != self.generation {
            return Err(ArenaError::StaleHandle {
                handle: handle.generation,
                arena: self.generation,
            });
        }
        Ok(handle.offset..handle.end())
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.capacity)
            .field("used", &self.used)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_allocation_at_offset_zero() {
        let mut arena = Arena::create(64).unwrap();
        let first = arena.alloc::<u64>(2).unwrap();
        assert_eq!(first.offset(), 0);
        assert_eq!(arena.used(), 16);
    }

    #[test]
    fn test_alignment_padding() {
        let mut arena = Arena::create(1024).unwrap();
        let bytes = arena.alloc::<u8>(10).unwrap();
        let word = arena.alloc::<u32>(1).unwrap();

        assert_eq!(bytes.offset(), 0);
        assert_eq!(word.offset(), 12);
        assert_eq!(arena.used(), 16);
    }

    #[test]
    fn test_allocations_do_not_overlap() {
        let mut arena = Arena::create(4096).unwrap();
        let mut ends = 0;

        for (count, align) in [(3, 1), (5, 8), (1, 2), (7, 4), (2, 8), (9, 1)] {
            let handle = arena.alloc_bytes(count, align).unwrap();
            assert_eq!(handle.offset() % align, 0);
            assert!(handle.offset() >= ends, "overlaps previous allocation");
            ends = handle.end();
        }
        assert_eq!(arena.used(), ends);
    }

    #[test]
    fn test_typed_views_are_aligned() {
        let mut arena = Arena::create(256).unwrap();
        let _ = arena.alloc::<u8>(3).unwrap();
        let floats = arena.alloc::<f32>(4).unwrap();
        let longs = arena.alloc::<u64>(2).unwrap();

        arena.slice_mut(&floats).unwrap().copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
        arena.slice_mut(&longs).unwrap().copy_from_slice(&[u64::MAX, 7]);

        assert_eq!(arena.slice(&floats).unwrap(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(arena.slice(&longs).unwrap(), &[u64::MAX, 7]);
        assert_eq!(arena.slice(&floats).unwrap().as_ptr() as usize % 4, 0);
        assert_eq!(arena.slice(&longs).unwrap().as_ptr() as usize % 8, 0);
    }

    #[test]
    fn test_fresh_memory_is_zeroed() {
        let mut arena = Arena::create(128).unwrap();
        let handle = arena.alloc::<u32>(32).unwrap();
        assert!(arena.slice(&handle).unwrap().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_alloc_initialized() {
        let mut arena = Arena::create(64).unwrap();
        let handle = arena.alloc_initialized(0xDEAD_BEEFu32).unwrap();
        assert_eq!(*arena.value(&handle).unwrap(), 0xDEAD_BEEF);

        *arena.value_mut(&handle).unwrap() += 1;
        assert_eq!(*arena.value(&handle).unwrap(), 0xDEAD_BEF0);
    }

    #[test]
    fn test_exhaustion_is_detected_before_handing_out() {
        let mut arena = Arena::create(16).unwrap();
        let _ = arena.alloc::<u8>(10).unwrap();

        let err = arena.alloc::<u32>(2).unwrap_err();
        assert_eq!(
            err,
            ArenaError::OutOfMemory {
                requested: 10,
                remaining: 6,
            }
        );
        // Failed request leaves the cursor alone
        assert_eq!(arena.used(), 10);

        // Something that fits still succeeds
        let tail = arena.alloc::<u8>(6).unwrap();
        assert_eq!(tail.end(), 16);
        assert_eq!(arena.remaining(), 0);
    }

    #[test]
    fn test_count_overflow_is_out_of_memory() {
        let mut arena = Arena::create(16).unwrap();
        assert!(matches!(
            arena.alloc::<u64>(usize::MAX),
            Err(ArenaError::OutOfMemory { .. })
        ));
    }

    #[test]
    fn test_invalid_alignment() {
        let mut arena = Arena::create(64).unwrap();
        assert_eq!(arena.alloc_bytes(4, 3), Err(ArenaError::InvalidAlignment(3)));
        assert_eq!(arena.alloc_bytes(4, 0), Err(ArenaError::InvalidAlignment(0)));
        assert_eq!(
            arena.alloc_bytes(4, MAX_ALIGNMENT * 2),
            Err(ArenaError::InvalidAlignment(MAX_ALIGNMENT * 2))
        );
    }

    #[test]
    fn test_reset_invalidates_handles() {
        let mut arena = Arena::create(64).unwrap();
        let old = arena.alloc::<u32>(4).unwrap();
        assert!(arena.used() > 0);

        arena.reset();
        assert_eq!(arena.used(), 0);
        assert!(matches!(arena.slice(&old), Err(ArenaError::StaleHandle { .. })));

        let fresh = arena.alloc::<u32>(4).unwrap();
        assert_eq!(fresh.offset(), old.offset());
        assert!(arena.slice(&fresh).is_ok());
    }

    #[test]
    fn test_destroy_releases_everything() {
        let mut arena = Arena::create(64).unwrap();
        let handle = arena.alloc::<u8>(8).unwrap();

        arena.destroy();
        assert_eq!(arena.capacity(), 0);
        assert_eq!(arena.used(), 0);
        assert!(arena.slice(&handle).is_err());
        assert!(matches!(
            arena.alloc::<u8>(1),
            Err(ArenaError::OutOfMemory { .. })
        ));
    }

    #[test]
    fn test_size_helpers() {
        assert_eq!(kilobytes(1), 1024);
        assert_eq!(megabytes(2), 2 * 1024 * 1024);
        assert_eq!(gigabytes(1), 1024 * 1024 * 1024);
    }

    #[test]
    fn test_oversized_request_is_an_error() {
        let huge = megabytes(18_014_398_509_481_984);
        assert_eq!(huge, usize::MAX);
        assert_eq!(gigabytes(usize::MAX), usize::MAX);

        assert_eq!(
            Arena::create(huge).unwrap_err(),
            ArenaError::BackingAllocation(usize::MAX)
        );
    }
}
