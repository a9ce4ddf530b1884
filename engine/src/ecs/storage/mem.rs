//! Low-level memory management for type-erased storage.
//!
//! [`IndexedMemory`] owns one contiguous allocation of uniform-sized elements and provides index
//! based pointer arithmetic into it. It knows nothing about the type stored, which elements are
//! initialized, or how to drop them; [`RawStore`](super::raw::RawStore) layers that on top.
//!
//! Growth follows a [`GrowthStrategy`] and saturates at the largest capacity whose byte size still
//! fits in an `isize`. Growth beyond that, or an allocator refusal, is reported as
//! [`Error::CapacityExhausted`] instead of aborting the process.
//!
//! # Safety Contract
//!
//! Callers must:
//! - only read indices that they initialized,
//! - drop initialized elements before the memory is released,
//! - cast element pointers to the type the layout was taken from.
//!
//! ```ignore
//! let mut mem = IndexedMemory::new(Layout::new::<u32>(), GrowthStrategy::default());
//! mem.ensure(10)?;
//! unsafe { mem.ptr_at(3).cast::<u32>().write(7) };
//! ```

use std::{
    alloc::{self, Layout},
    ptr::{self, NonNull},
};

use crate::ecs::error::{Error, Result};

/// Policies for choosing a new capacity when memory must grow.
///
/// Every strategy returns at least the required capacity and never more than the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthStrategy {
    /// Grow in multiples of the current capacity. With a factor of 2 this gives the usual
    /// 0, 1, 2, 4, 8 progression and amortized O(1) appends.
    Multiply(usize),
    /// Grow the current capacity by a fixed number of elements.
    Buffer(usize),
    /// Grow to exactly the required capacity.
    Exact,
}

impl Default for GrowthStrategy {
    fn default() -> Self {
        Self::Multiply(2)
    }
}

impl GrowthStrategy {
    /// Calculate the capacity to grow to from `current` so that at least `required` elements fit,
    /// clamped to `max`. Returns `None` when `required` itself exceeds `max`.
    pub fn next_capacity(&self, current: usize, required: usize, max: usize) -> Option<usize> {
        if required > max {
            return None;
        }
        let grown = match self {
            Self::Multiply(factor) => current.saturating_mul(*factor),
            Self::Buffer(buffer) => current.saturating_add(*buffer),
            Self::Exact => required,
        };
        Some(grown.max(required).min(max))
    }
}

/// A contiguous block of allocated memory holding `capacity` elements of one layout.
///
/// Zero-sized elements never allocate; their capacity is `usize::MAX` from the start.
pub struct IndexedMemory {
    /// Start of the allocation, or an aligned dangling pointer when nothing is allocated.
    ptr: NonNull<u8>,
    /// Number of elements the allocation can hold.
    capacity: usize,
    /// The memory layout of an element.
    element_layout: Layout,
    /// Growth strategy for this memory.
    growth: GrowthStrategy,
}

impl IndexedMemory {
    /// Construct a new memory block without allocating.
    pub fn new(element_layout: Layout, growth: GrowthStrategy) -> Self {
        let capacity = if element_layout.size() == 0 {
            usize::MAX
        } else {
            0
        };
        Self {
            ptr: dangling(element_layout),
            capacity,
            element_layout,
            growth,
        }
    }

    /// Construct a new memory block holding at least `capacity` elements.
    pub fn with_capacity(
        element_layout: Layout,
        capacity: usize,
        growth: GrowthStrategy,
    ) -> Result<Self> {
        let mut block = Self::new(element_layout, growth);
        block.ensure_exact(capacity)?;
        Ok(block)
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// The largest capacity this memory can ever reach.
    #[inline]
    pub const fn max_capacity(&self) -> usize {
        max_capacity(self.element_layout)
    }

    /// Get a pointer to the element at `index`. `index == capacity` yields the one-past-the-end
    /// pointer, which may be used as the bound of a range but never dereferenced.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `index > capacity()`.
    #[inline]
    pub fn ptr_at(&self, index: usize) -> NonNull<u8> {
        debug_assert!(
            index <= self.capacity,
            "index {} out of bounds (capacity: {})",
            index,
            self.capacity
        );
        // SAFETY: `index <= capacity` and the byte size of `capacity` elements fits in `isize`.
        unsafe { self.ptr.add(index * self.element_layout.size()) }
    }

    /// Make sure at least `required` elements fit, growing by the growth strategy if they don't.
    pub fn ensure(&mut self, required: usize) -> Result<()> {
        self.ensure_with(required, self.growth)
    }

    /// Make sure at least `required` elements fit, growing to exactly `required` if they don't.
    pub fn ensure_exact(&mut self, required: usize) -> Result<()> {
        self.ensure_with(required, GrowthStrategy::Exact)
    }

    fn ensure_with(&mut self, required: usize, strategy: GrowthStrategy) -> Result<()> {
        if required <= self.capacity {
            return Ok(());
        }
        let max = self.max_capacity();
        let capacity = strategy
            .next_capacity(self.capacity, required, max)
            .ok_or(Error::CapacityExhausted { capacity: max })?;
        self.resize_to(capacity)
    }

    /// Release capacity beyond `capacity` elements. A no-op for zero-sized elements or when the
    /// block is already at most that large.
    pub fn shrink_to(&mut self, capacity: usize) -> Result<()> {
        if self.element_layout.size() == 0 || capacity >= self.capacity {
            return Ok(());
        }
        if capacity == 0 {
            // SAFETY: `self.capacity > 0`, so the block was allocated with this layout.
            unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout_for(self.capacity)?) };
            self.ptr = dangling(self.element_layout);
            self.capacity = 0;
            return Ok(());
        }
        self.resize_to(capacity)
    }

    /// Allocate, grow or shrink the block to hold exactly `capacity` elements. On failure the old
    /// block is left untouched.
    fn resize_to(&mut self, capacity: usize) -> Result<()> {
        let new_layout = self.layout_for(capacity)?;
        let new_ptr = if self.capacity == 0 {
            // SAFETY: `new_layout` has a non-zero size since the element is not zero-sized and
            // `capacity` is greater than zero.
            unsafe { alloc::alloc(new_layout) }
        } else {
            let old_layout = self.layout_for(self.capacity)?;
            // SAFETY: the block was allocated with `old_layout` and the new size is non-zero and
            // does not overflow `isize` when rounded to the alignment.
            unsafe { alloc::realloc(self.ptr.as_ptr(), old_layout, new_layout.size()) }
        };

        let Some(new_ptr) = NonNull::new(new_ptr) else {
            return Err(Error::CapacityExhausted {
                capacity: self.capacity,
            });
        };
        self.ptr = new_ptr;
        self.capacity = capacity;
        Ok(())
    }

    fn layout_for(&self, capacity: usize) -> Result<Layout> {
        capacity
            .checked_mul(self.element_layout.size())
            .and_then(|size| Layout::from_size_align(size, self.element_layout.align()).ok())
            .ok_or(Error::CapacityExhausted {
                capacity: self.capacity,
            })
    }
}

impl Drop for IndexedMemory {
    fn drop(&mut self) {
        if self.element_layout.size() == 0 || self.capacity == 0 {
            return;
        }
        if let Ok(layout) = self.layout_for(self.capacity) {
            // SAFETY: the block was allocated with exactly this layout.
            unsafe { alloc::dealloc(self.ptr.as_ptr(), layout) };
        }
    }
}

// SAFETY: IndexedMemory owns its allocation. The caller is responsible for ensuring any type
// stored within is Send.
unsafe impl Send for IndexedMemory {}

// SAFETY: IndexedMemory provides no interior mutability. The caller is responsible for ensuring
// any type stored within is Sync.
unsafe impl Sync for IndexedMemory {}

/// The largest element count whose byte size fits in an `isize`.
#[inline]
pub const fn max_capacity(layout: Layout) -> usize {
    match layout.size() {
        0 => usize::MAX,
        size => isize::MAX as usize / size,
    }
}

/// A non-null pointer aligned for `layout`, valid for zero-sized access only.
#[inline]
fn dangling(layout: Layout) -> NonNull<u8> {
    // SAFETY: alignments are never zero.
    unsafe { NonNull::new_unchecked(ptr::without_provenance_mut(layout.align())) }
}
