use std::{
    iter::FusedIterator,
    mem::ManuallyDrop,
    ptr::{self, NonNull},
};

use crate::ecs::{
    component::{self, Component},
    error::{Error, Result},
    storage::{
        cell::{self, Cell, CellMut},
        mem::{GrowthStrategy, IndexedMemory},
    },
};

/// A type-erased, contiguous store of records of one component type.
///
/// This is similar to `Vec<T>` without `T`: the store knows the record layout and drop glue from
/// its [`component::Info`] and moves records around as raw bytes. Slots `0..len` are always
/// initialized and records keep their relative order through every removal.
///
/// Records are handed in as `NonNull<u8>` pointing at `record_size` bytes, which the store moves
/// in. The typed `push_value`/`insert_value` wrappers do that safely for a known `C`.
///
/// ```ignore
/// let mut store = RawStore::new(registry.info_of::<Position>().unwrap(), GrowthStrategy::default());
/// let slot = store.push_value(Position { x: 1.0, y: 2.0 })?;
/// assert_eq!(store.get::<Position>(slot).map(|p| p.x), Some(1.0));
/// store.erase_at(slot);
/// ```
///
/// # Safety
/// The store maintains:
/// - `len <= capacity`
/// - every slot in `0..len` holds an initialized record of the store's type
pub struct RawStore {
    data: IndexedMemory,

    /// Number of initialized records.
    len: usize,

    info: component::Info,
}

impl RawStore {
    /// Create an empty store for records described by `info`.
    #[inline]
    pub fn new(info: component::Info, growth: GrowthStrategy) -> Self {
        Self {
            data: IndexedMemory::new(info.layout(), growth),
            len: 0,
            info,
        }
    }

    /// Create an empty store with room for `capacity` records.
    pub fn with_capacity(
        info: component::Info,
        capacity: usize,
        growth: GrowthStrategy,
    ) -> Result<Self> {
        Ok(Self {
            data: IndexedMemory::with_capacity(info.layout(), capacity, growth)?,
            len: 0,
            info,
        })
    }

    /// Move a record into a new slot at the end of the store and return the slot.
    ///
    /// # Safety
    /// `record` must point at a valid record of the store's type. On `Ok` the store owns the
    /// record and the caller must not use or drop it again. On `Err` nothing was moved.
    pub unsafe fn push(&mut self, record: NonNull<u8>) -> Result<usize> {
        let slot = self.len;
        self.data.ensure(slot + 1)?;
        // SAFETY: `slot < capacity` after `ensure` and the record is valid per the contract.
        unsafe {
            ptr::copy_nonoverlapping(
                record.as_ptr(),
                self.data.ptr_at(slot).as_ptr(),
                self.record_size(),
            )
        };
        self.len += 1;
        Ok(slot)
    }

    /// Move a record into `index`, shifting `[index, len)` up one slot. `index == len` behaves as
    /// [`push`](Self::push).
    ///
    /// # Safety
    /// Same contract as [`push`](Self::push).
    pub unsafe fn insert_at(&mut self, index: usize, record: NonNull<u8>) -> Result<()> {
        if index > self.len {
            return Err(Error::SlotOutOfBounds {
                index,
                len: self.len,
            });
        }
        self.data.ensure(self.len + 1)?;
        let size = self.record_size();
        // SAFETY: `len + 1 <= capacity`, so both the shifted range and the target slot are in
        // bounds. `ptr::copy` handles the overlap.
        unsafe {
            let at = self.data.ptr_at(index).as_ptr();
            ptr::copy(at, at.add(size), (self.len - index) * size);
            ptr::copy_nonoverlapping(record.as_ptr(), at, size);
        }
        self.len += 1;
        Ok(())
    }

    /// Push a typed value. A failed push drops the value.
    ///
    /// # Panics
    /// If `C` is not the store's component type.
    pub fn push_value<C: Component>(&mut self, value: C) -> Result<usize> {
        self.assert_type::<C>();
        let mut value = ManuallyDrop::new(value);
        // SAFETY: the type was checked above, and on success the store owns the moved bytes.
        let pushed = unsafe { self.push(NonNull::from(&mut *value).cast()) };
        if pushed.is_err() {
            // SAFETY: nothing was moved, so the value is still ours to drop exactly once.
            unsafe { ManuallyDrop::drop(&mut value) };
        }
        pushed
    }

    /// Insert a typed value at `index`. A failed insert drops the value.
    ///
    /// # Panics
    /// If `C` is not the store's component type.
    pub fn insert_value<C: Component>(&mut self, index: usize, value: C) -> Result<()> {
        self.assert_type::<C>();
        let mut value = ManuallyDrop::new(value);
        // SAFETY: see `push_value`.
        let inserted = unsafe { self.insert_at(index, NonNull::from(&mut *value).cast()) };
        if inserted.is_err() {
            // SAFETY: nothing was moved.
            unsafe { ManuallyDrop::drop(&mut value) };
        }
        inserted
    }

    /// Drop the record at `index` and shift `[index + 1, len)` down one slot. Erasing the last
    /// slot moves nothing.
    pub fn erase_at(&mut self, index: usize) {
        debug_assert!(
            index < self.len,
            "slot {index} out of bounds (len: {})",
            self.len
        );
        if index >= self.len {
            return;
        }
        let len = self.len;
        let size = self.record_size();
        // Anything past `index` leaks rather than double drops if the destructor panics.
        self.len = index;
        // SAFETY: `index < len`, so the slot holds an initialized record and the tail range is
        // in bounds.
        unsafe {
            let at = self.data.ptr_at(index);
            (self.info.drop_fn())(at);
            ptr::copy(at.as_ptr().add(size), at.as_ptr(), (len - index - 1) * size);
        }
        self.len = len - 1;
    }

    /// Drop the last record. A no-op on an empty store.
    pub fn pop(&mut self) {
        if self.len == 0 {
            return;
        }
        self.len -= 1;
        // SAFETY: the slot at the old `len - 1` holds an initialized record.
        unsafe { (self.info.drop_fn())(self.data.ptr_at(self.len)) };
    }

    /// Remove every slot listed in `sorted_slots` in a single pass.
    ///
    /// Each removed record is dropped and each run of surviving records between two removed slots
    /// is moved down once, by the number of slots removed before it. The relative order of the
    /// survivors is kept.
    ///
    /// # Panics
    /// If `sorted_slots` is not strictly ascending or names a slot `>= len`.
    pub fn compact(&mut self, sorted_slots: &[usize]) {
        let Some(&first) = sorted_slots.first() else {
            return;
        };
        assert!(
            sorted_slots.windows(2).all(|w| w[0] < w[1])
                && sorted_slots.last().is_some_and(|&last| last < self.len),
            "compaction slots must be strictly ascending and below {}",
            self.len
        );

        let len = self.len;
        let size = self.record_size();
        let drop_fn = self.info.drop_fn();
        // Records past the first removed slot leak rather than double drop on a panic.
        self.len = first;

        let mut write = first;
        for (rank, &removed) in sorted_slots.iter().enumerate() {
            let run_start = removed + 1;
            let run_end = sorted_slots.get(rank + 1).copied().unwrap_or(len);
            let run = run_end - run_start;
            // SAFETY: `removed < len` holds an initialized record that no earlier move touched,
            // since `write <= removed - rank`. The run `[run_start, run_end)` is initialized and
            // `write + run <= run_end`.
            unsafe {
                drop_fn(self.data.ptr_at(removed));
                ptr::copy(
                    self.data.ptr_at(run_start).as_ptr(),
                    self.data.ptr_at(write).as_ptr(),
                    run * size,
                );
            }
            write += run;
        }
        self.len = write;
    }

    /// Get a cell for the record at `index`.
    ///
    /// # Panics
    /// In debug builds, if `index >= len`.
    #[inline]
    pub fn at(&self, index: usize) -> Cell<'_> {
        debug_assert!(index < self.len, "slot {index} out of bounds (len: {})", self.len);
        Cell::new(self.data.ptr_at(index), &self.info)
    }

    /// Get a mutable cell for the record at `index`.
    ///
    /// # Panics
    /// In debug builds, if `index >= len`.
    #[inline]
    pub fn at_mut(&mut self, index: usize) -> CellMut<'_> {
        debug_assert!(index < self.len, "slot {index} out of bounds (len: {})", self.len);
        CellMut::new(self.data.ptr_at(index), &self.info)
    }

    /// Get the record at `index` as a `C`, or `None` when out of bounds.
    ///
    /// # Panics
    /// If `C` is not the store's component type.
    #[inline]
    pub fn get<C: Component>(&self, index: usize) -> Option<&C> {
        self.assert_type::<C>();
        (index < self.len).then(|| self.at(index).as_ref::<C>())
    }

    /// Get the record at `index` as a mutable `C`, or `None` when out of bounds.
    ///
    /// # Panics
    /// If `C` is not the store's component type.
    #[inline]
    pub fn get_mut<C: Component>(&mut self, index: usize) -> Option<&mut C> {
        self.assert_type::<C>();
        if index < self.len {
            Some(self.at_mut(index).into_mut::<C>())
        } else {
            None
        }
    }

    /// Pointer to slot `index` for callers that manage aliasing themselves.
    #[inline]
    pub(crate) fn slot_ptr(&self, index: usize) -> NonNull<u8> {
        debug_assert!(index < self.len, "slot {index} out of bounds (len: {})", self.len);
        self.data.ptr_at(index)
    }

    /// Iterate over the cells of every record in slot order, from either end.
    #[inline]
    pub fn slots(&self) -> Slots<'_> {
        Slots {
            store: self,
            front: 0,
            back: self.len,
        }
    }

    /// Reserve room for at least `additional` more records.
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(Error::CapacityExhausted {
                capacity: self.data.max_capacity(),
            })?;
        self.data.ensure_exact(required)
    }

    /// Release capacity beyond `len`.
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        self.data.shrink_to(self.len)
    }

    /// Drop every record, keeping the allocation.
    pub fn clear(&mut self) {
        let len = self.len;
        self.len = 0;
        for index in 0..len {
            // SAFETY: every slot below the old `len` holds an initialized record.
            unsafe { (self.info.drop_fn())(self.data.ptr_at(index)) };
        }
    }

    #[inline]
    pub fn info(&self) -> &component::Info {
        &self.info
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Size in bytes of one record.
    #[inline]
    pub fn record_size(&self) -> usize {
        self.info.layout().size()
    }

    #[inline]
    fn assert_type<C: Component>(&self) {
        assert!(
            cell::is_type::<C>(&self.info),
            "type mismatch: `{}` used with a store of `{}`",
            std::any::type_name::<C>(),
            self.info.name()
        );
    }
}

impl Drop for RawStore {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Iterator over the cells of a [`RawStore`], see [`RawStore::slots`].
#[derive(Clone)]
pub struct Slots<'a> {
    store: &'a RawStore,
    front: usize,
    back: usize,
}

impl<'a> Iterator for Slots<'a> {
    type Item = Cell<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let cell = self.store.at(self.front);
        self.front += 1;
        Some(cell)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for Slots<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(self.store.at(self.back))
    }
}

impl ExactSizeIterator for Slots<'_> {}

impl FusedIterator for Slots<'_> {}
