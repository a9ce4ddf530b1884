use std::collections::{BTreeSet, HashMap};

use crate::ecs::component;

/// Slots waiting to be removed at the next frame barrier, grouped by component type.
///
/// Requests for the same slot collapse, and slots come back out in ascending order, ready for a
/// single compaction pass per store.
#[derive(Debug, Default)]
pub struct PendingRemovals {
    slots: HashMap<component::Id, BTreeSet<usize>>,
}

impl PendingRemovals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request removal of `slot` from the store of `id`. Returns `false` if it was already
    /// requested this frame.
    pub fn request(&mut self, id: component::Id, slot: usize) -> bool {
        self.slots.entry(id).or_default().insert(slot)
    }

    /// Whether `slot` of `id` is already requested.
    #[inline]
    pub fn contains(&self, id: component::Id, slot: usize) -> bool {
        self.slots.get(&id).is_some_and(|slots| slots.contains(&slot))
    }

    /// Whether nothing is pending.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.values().all(BTreeSet::is_empty)
    }

    /// Total number of pending slots across all stores.
    pub fn len(&self) -> usize {
        self.slots.values().map(BTreeSet::len).sum()
    }

    /// Take every pending request as `(id, ascending slots)`, leaving nothing pending. Stores are
    /// visited in ascending id order.
    pub fn drain(&mut self) -> Vec<(component::Id, Vec<usize>)> {
        let mut drained: Vec<_> = self
            .slots
            .drain()
            .filter(|(_, slots)| !slots.is_empty())
            .map(|(id, slots)| (id, slots.into_iter().collect()))
            .collect();
        drained.sort_unstable_by_key(|(id, _)| *id);
        drained
    }
}
