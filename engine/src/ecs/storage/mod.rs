//! Packed, type-erased component storage.
//!
//! Every component type gets one [`Store`]: a [`RawStore`] holding the records back to back, and
//! an [`EntityIndex`] mapping each owning entity to its slot. The two always have the same length
//! and the same order, so slot `i` of the index names the owner of record `i`.
//!
//! ```text
//!                 ┌────────────────────────────────────────────┐
//!  Storage ──id──▶│ Store<Position>                            │
//!                 │   index: [#1, #3, #4]   #3 → 1             │
//!                 │   data:  [P(#1), P(#3), P(#4)]             │
//!                 └────────────────────────────────────────────┘
//!                 ┌────────────────────────────────────────────┐
//!          ──id──▶│ Store<Velocity>                            │
//!                 │   index: [#3, #4]       #4 → 1             │
//!                 │   data:  [V(#3), V(#4)]                    │
//!                 └────────────────────────────────────────────┘
//! ```
//!
//! # Layers
//!
//! - [`mem::IndexedMemory`]: one raw allocation and pointer arithmetic, with a [`GrowthStrategy`].
//! - [`RawStore`]: initialized records, drop glue, order preserving removal and batched
//!   compaction.
//! - [`EntityIndex`]: entity ↔ slot bijection with a last-found cache.
//! - [`PendingRemovals`]: slots to remove at the next frame barrier.
//!
//! Records only move when a store compacts, and that only happens at the frame barrier. Between
//! barriers a slot found through the index stays valid.

mod cell;
mod index;
pub mod mem;
mod raw;
mod removal;

pub use cell::{Cell, CellMut};
pub use index::EntityIndex;
pub use mem::GrowthStrategy;
pub use raw::{RawStore, Slots};
pub use removal::PendingRemovals;

use crate::ecs::{
    component::{self, Component},
    entity::Entity,
    error::Result,
};

/// The records of one component type together with their owners.
pub struct Store {
    index: EntityIndex,
    data: RawStore,
}

impl Store {
    /// Create an empty store for `info`, allocating room for `capacity` records up front.
    pub fn new(info: component::Info, growth: GrowthStrategy, capacity: usize) -> Result<Self> {
        Ok(Self {
            index: EntityIndex::new(),
            data: RawStore::with_capacity(info, capacity, growth)?,
        })
    }

    /// Append `value` as the record of `entity` and return it. The entity must not already own a
    /// record here. On error neither the records nor the index change.
    pub fn push<C: Component>(&mut self, entity: Entity, value: C) -> Result<&mut C> {
        debug_assert!(
            !self.index.contains(entity),
            "entity {entity} already owns a `{}` record",
            self.data.info().name()
        );
        let slot = self.data.push_value(value)?;
        self.index.emplace(entity);
        Ok(self.data.at_mut(slot).into_mut::<C>())
    }

    /// Get the record of `entity`.
    #[inline]
    pub fn get<C: Component>(&self, entity: Entity) -> Option<&C> {
        self.data.get(self.index.slot_of(entity)?)
    }

    /// Get the record of `entity` mutably.
    #[inline]
    pub fn get_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
        let slot = self.index.slot_of(entity)?;
        self.data.get_mut(slot)
    }

    /// Remove the record of `entity` right away, shifting later records down. Returns whether
    /// the entity had one.
    pub fn remove(&mut self, entity: Entity) -> bool {
        let Some(slot) = self.index.remove_entity(entity) else {
            return false;
        };
        self.data.erase_at(slot);
        true
    }

    /// Remove every slot in `sorted_slots` from the records and the index in one pass each.
    pub fn compact(&mut self, sorted_slots: &[usize]) {
        self.data.compact(sorted_slots);
        self.index.compact(sorted_slots);
        debug_assert_eq!(self.data.len(), self.index.len());
    }

    #[inline]
    pub fn index(&self) -> &EntityIndex {
        &self.index
    }

    #[inline]
    pub fn data(&self) -> &RawStore {
        &self.data
    }

    #[inline]
    pub fn info(&self) -> &component::Info {
        self.data.info()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.data.reserve(additional)
    }

    pub fn shrink_to_fit(&mut self) -> Result<()> {
        self.data.shrink_to_fit()
    }
}

/// Every component store of a world, indexed by component id.
#[derive(Default)]
pub struct Storage {
    stores: Vec<Option<Store>>,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the store of component `id`, if one was created.
    #[inline]
    pub fn get(&self, id: component::Id) -> Option<&Store> {
        self.stores.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, id: component::Id) -> Option<&mut Store> {
        self.stores.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Get the store of `info`, creating it with `growth` and `capacity` on first use.
    pub fn get_or_create(
        &mut self,
        info: component::Info,
        growth: GrowthStrategy,
        capacity: usize,
    ) -> Result<&mut Store> {
        let index = info.id().index();
        if index >= self.stores.len() {
            self.stores.resize_with(index + 1, || None);
        }
        let slot = &mut self.stores[index];
        let store = match slot {
            Some(store) => store,
            None => {
                log::debug!(
                    "creating store for `{}` ({:?}) with capacity {capacity}",
                    info.name(),
                    info.id()
                );
                slot.insert(Store::new(info, growth, capacity)?)
            }
        };
        Ok(store)
    }

    /// Iterate over every created store.
    pub fn iter(&self) -> impl Iterator<Item = &Store> {
        self.stores.iter().flatten()
    }

    /// Iterate mutably over every created store.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Store> {
        self.stores.iter_mut().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Component, component::Registry, entity::Allocator};

    #[derive(Component, Debug, PartialEq)]
    struct Position(u32);

    #[derive(Component, Debug, PartialEq)]
    struct Velocity(u32);

    #[test]
    fn stores_are_created_once_per_type() {
        // Given
        let registry = Registry::new();
        let mut storage = Storage::new();
        let pos = registry.info(registry.register::<Position>()).unwrap();
        let vel = registry.info(registry.register::<Velocity>()).unwrap();
        let entity = Allocator::new().alloc();

        // When
        storage
            .get_or_create(pos, GrowthStrategy::default(), 0)
            .unwrap()
            .push(entity, Position(1))
            .unwrap();
        storage
            .get_or_create(pos, GrowthStrategy::default(), 0)
            .unwrap()
            .push(Allocator::new().alloc_many(2)[1], Position(2))
            .unwrap();

        // Then
        assert_eq!(storage.get(pos.id()).map(Store::len), Some(2));
        assert!(storage.get(vel.id()).is_none());
        assert_eq!(storage.iter().count(), 1);
    }

    #[test]
    fn store_keeps_records_and_owners_in_step() {
        // Given
        let registry = Registry::new();
        let info = registry.info(registry.register::<Position>()).unwrap();
        let mut store = Store::new(info, GrowthStrategy::default(), 4).unwrap();
        let e = Allocator::new().alloc_many(5);
        for (i, &entity) in e.iter().enumerate() {
            store.push(entity, Position(i as u32)).unwrap();
        }

        // When
        store.compact(&[1, 3]);
        assert!(store.remove(e[0]));

        // Then
        assert_eq!(store.index().entities(), &[e[2], e[4]]);
        assert_eq!(store.get::<Position>(e[4]), Some(&Position(4)));
        assert_eq!(store.get::<Position>(e[1]), None);
        assert!(!store.remove(e[1]));

        // When
        if let Some(position) = store.get_mut::<Position>(e[2]) {
            position.0 = 20;
        }

        // Then
        assert_eq!(store.data().get::<Position>(0), Some(&Position(20)));
    }
}
