//! Joins over packed component stores.
//!
//! A join walks the store of one *primary* component in slot order and yields each owner that
//! also owns every *filter* component, together with references into all of the stores:
//!
//! ```rust,ignore
//! for (entity, (position, velocity)) in world.query::<(&mut Position, &Velocity)>() {
//!     position.x += velocity.dx;
//! }
//! ```
//!
//! The join is lazy and collects nothing. Its length is fixed when it is created, and it borrows
//! the world mutably for its whole lifetime, so stores cannot change under it. Removal and
//! destruction during a join go through [`Deferred`](crate::ecs::world::Deferred), which only
//! records requests for the next frame barrier.
//!
//! # Validation
//!
//! Naming the same component type twice, e.g. `(&Foo, &mut Foo)`, panics when the join is
//! created. A component type that was never registered makes the join empty.

use std::{collections::HashSet, iter::FusedIterator, marker::PhantomData};

use crate::ecs::{
    component,
    entity::Entity,
    storage::{Storage, Store},
};

mod param;

pub use param::{Access, Data, Parameter};

/// The iterator returned by [`World::query`](crate::ecs::world::World::query).
pub struct Join<'w, D: Data> {
    /// Primary store first, then one store per filter. Empty when the join matches nothing.
    stores: Vec<&'w Store>,

    /// Next primary slot to visit.
    cursor: usize,

    /// Primary length captured at creation.
    end: usize,

    /// Slot of the current entity in each store.
    slots: Vec<usize>,

    _marker: PhantomData<D>,
}

impl<'w, D: Data> Join<'w, D> {
    /// Resolve the stores of `D` in `storage`.
    ///
    /// # Panics
    /// If `D` names one component type more than once.
    pub(crate) fn new(storage: &'w Storage, registry: &component::Registry) -> Self {
        let mut accesses = Vec::new();
        D::accesses(registry, &mut accesses);
        validate(&accesses);

        let stores: Option<Vec<&'w Store>> = accesses
            .iter()
            .map(|access| access.id.and_then(|id| storage.get(id)))
            .collect();
        let stores = stores.unwrap_or_default();
        let end = stores.first().map_or(0, |primary| primary.len());

        Self {
            slots: Vec::with_capacity(stores.len()),
            stores,
            cursor: 0,
            end,
            _marker: PhantomData,
        }
    }

    /// Upper bound of the entities left to visit. Filters may reject some of them.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.end - self.cursor
    }
}

impl<'w, D: Data> Iterator for Join<'w, D> {
    type Item = (Entity, D::Item<'w>);

    fn next(&mut self) -> Option<Self::Item> {
        let (primary, filters) = self.stores.split_first()?;
        'primary: while self.cursor < self.end {
            let slot = self.cursor;
            self.cursor += 1;
            let entity = primary.index().owner(slot)?;

            self.slots.clear();
            self.slots.push(slot);
            for filter in filters {
                match filter.index().slot_of(entity) {
                    Some(filter_slot) => self.slots.push(filter_slot),
                    None => continue 'primary,
                }
            }

            // SAFETY: every store was resolved from the id of its own parameter and every slot
            // comes from that store's index. `validate` rejected repeated component types, so
            // each record is reached through one parameter only, and each primary slot is
            // visited once, so no record is handed out twice. The join holds the world's
            // exclusive borrow for `'w`.
            let item = unsafe { D::fetch(&self.stores, &self.slots) };
            return Some((entity, item));
        }
        None
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining()))
    }
}

impl<D: Data> FusedIterator for Join<'_, D> {}

/// Panic if a component type appears more than once.
fn validate(accesses: &[Access]) {
    let mut seen = HashSet::with_capacity(accesses.len());
    for access in accesses {
        if !seen.insert(access.type_id) {
            panic!(
                "component `{}` is requested more than once in one join",
                access.name
            );
        }
    }
}
