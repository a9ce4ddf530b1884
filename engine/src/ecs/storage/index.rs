use std::{cell::Cell, collections::HashMap};

use crate::ecs::entity::Entity;

/// Maps entities to the dense slots of one component store, and slots back to entities.
///
/// The index keeps two structures in lock step:
/// - `slot_owner[i]` is the entity whose record sits in slot `i`,
/// - `entity_to_slot[e]` is the slot of entity `e`,
///
/// so that `entity_to_slot[slot_owner[i]] == i` for every slot and the map holds exactly the
/// owners. Removals preserve slot order, like the store they describe.
///
/// ```ignore
/// let mut index = EntityIndex::new();
/// index.emplace(e1);
/// index.emplace(e2);
/// assert_eq!(index.find(e2), 1);
/// assert_eq!(index.find(e3), index.len()); // not present
/// ```
#[derive(Debug, Default, Clone)]
pub struct EntityIndex {
    slot_owner: Vec<Entity>,
    entity_to_slot: HashMap<Entity, usize>,

    /// The last successful lookup. Cleared by every structural change.
    cache: Cell<Option<(Entity, usize)>>,
}

impl EntityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entity` at the next slot. Returns `false`, changing nothing, if the entity is
    /// already indexed.
    pub fn emplace(&mut self, entity: Entity) -> bool {
        if self.entity_to_slot.contains_key(&entity) {
            return false;
        }
        let slot = self.slot_owner.len();
        self.entity_to_slot.insert(entity, slot);
        self.slot_owner.push(entity);
        self.cache.set(None);
        debug_assert_eq!(self.slot_owner.len(), self.entity_to_slot.len());
        true
    }

    /// Find the slot of `entity`, or `len()` if it is not indexed.
    #[inline]
    pub fn find(&self, entity: Entity) -> usize {
        self.slot_of(entity).unwrap_or(self.slot_owner.len())
    }

    /// Find the slot of `entity`.
    #[inline]
    pub fn slot_of(&self, entity: Entity) -> Option<usize> {
        if let Some((cached, slot)) = self.cache.get()
            && cached == entity
        {
            return Some(slot);
        }
        let slot = *self.entity_to_slot.get(&entity)?;
        self.cache.set(Some((entity, slot)));
        Some(slot)
    }

    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.slot_of(entity).is_some()
    }

    /// The entity owning `slot`.
    #[inline]
    pub fn owner(&self, slot: usize) -> Option<Entity> {
        self.slot_owner.get(slot).copied()
    }

    /// Owners in slot order.
    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.slot_owner
    }

    /// Remove the entry at `index`, shifting later slots down by one and reindexing them.
    pub fn remove_at(&mut self, index: usize) -> Option<Entity> {
        if index >= self.slot_owner.len() {
            return None;
        }
        let entity = self.slot_owner.remove(index);
        self.entity_to_slot.remove(&entity);
        self.reindex_from(index);
        self.cache.set(None);
        self.verify();
        Some(entity)
    }

    /// Remove `entity`, returning the slot it occupied.
    pub fn remove_entity(&mut self, entity: Entity) -> Option<usize> {
        let slot = self.slot_of(entity)?;
        self.remove_at(slot);
        Some(slot)
    }

    /// Remove the entry in the last slot.
    pub fn pop(&mut self) -> Option<Entity> {
        let entity = self.slot_owner.pop()?;
        self.entity_to_slot.remove(&entity);
        self.cache.set(None);
        debug_assert_eq!(self.slot_owner.len(), self.entity_to_slot.len());
        Some(entity)
    }

    /// Remove every slot in `sorted_slots` in one pass. Each surviving entity moves down by the
    /// rank of its old slot among the removed ones, mirroring [`RawStore::compact`].
    ///
    /// [`RawStore::compact`]: super::RawStore::compact
    ///
    /// # Panics
    /// If `sorted_slots` is not strictly ascending or names a slot `>= len`.
    pub fn compact(&mut self, sorted_slots: &[usize]) {
        let Some(&first) = sorted_slots.first() else {
            return;
        };
        let len = self.slot_owner.len();
        assert!(
            sorted_slots.windows(2).all(|w| w[0] < w[1])
                && sorted_slots.last().is_some_and(|&last| last < len),
            "compaction slots must be strictly ascending and below {len}"
        );

        let mut write = first;
        for read in first..len {
            let entity = self.slot_owner[read];
            if sorted_slots.binary_search(&read).is_ok() {
                self.entity_to_slot.remove(&entity);
                continue;
            }
            let slot = read - sorted_slots.partition_point(|&removed| removed < read);
            debug_assert_eq!(slot, write);
            self.slot_owner[slot] = entity;
            self.entity_to_slot.insert(entity, slot);
            write += 1;
        }
        self.slot_owner.truncate(write);
        self.cache.set(None);
        self.verify();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slot_owner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slot_owner.is_empty()
    }

    fn reindex_from(&mut self, start: usize) {
        for (slot, entity) in self.slot_owner.iter().enumerate().skip(start) {
            self.entity_to_slot.insert(*entity, slot);
        }
    }

    /// Check the slot/entity bijection. Debug builds only, and only after mutations that already
    /// touch every slot.
    #[inline]
    fn verify(&self) {
        #[cfg(debug_assertions)]
        {
            debug_assert_eq!(
                self.slot_owner.len(),
                self.entity_to_slot.len(),
                "index owners and map disagree in size"
            );
            for (slot, entity) in self.slot_owner.iter().enumerate() {
                debug_assert_eq!(
                    self.entity_to_slot.get(entity),
                    Some(&slot),
                    "entity {entity} is not mapped to its slot {slot}"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::entity::Allocator;

    fn indexed(count: usize) -> (EntityIndex, Vec<Entity>) {
        let entities = Allocator::new().alloc_many(count);
        let mut index = EntityIndex::new();
        for &entity in &entities {
            assert!(index.emplace(entity));
        }
        (index, entities)
    }

    fn assert_bijection(index: &EntityIndex) {
        for (slot, &entity) in index.entities().iter().enumerate() {
            assert_eq!(index.find(entity), slot);
            assert_eq!(index.owner(slot), Some(entity));
        }
    }

    #[test]
    fn emplace_assigns_dense_slots() {
        // Given
        let (mut index, entities) = indexed(3);

        // Then
        assert_eq!(index.len(), 3);
        assert_eq!(index.find(entities[2]), 2);
        assert_eq!(index.entities(), entities.as_slice());

        // When - duplicate emplace is rejected
        let added = index.emplace(entities[0]);

        // Then
        assert!(!added);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn missing_entities_find_the_sentinel() {
        let (index, _) = indexed(2);
        let stranger = Entity::from_raw(99).unwrap();

        assert_eq!(index.find(stranger), index.len());
        assert_eq!(index.slot_of(stranger), None);
        assert!(!index.contains(stranger));
    }

    #[test]
    fn remove_shifts_and_reindexes() {
        // Given
        let (mut index, e) = indexed(5);

        // When
        assert_eq!(index.remove_at(1), Some(e[1]));
        assert_eq!(index.remove_entity(e[3]), Some(2));

        // Then
        assert_eq!(index.entities(), &[e[0], e[2], e[4]]);
        assert_eq!(index.find(e[4]), 2);
        assert_eq!(index.find(e[1]), index.len());
        assert_bijection(&index);
    }

    #[test]
    fn cache_is_invalidated_by_removal() {
        // Given
        let (mut index, e) = indexed(3);
        assert_eq!(index.find(e[2]), 2);

        // When
        index.remove_at(0);

        // Then
        assert_eq!(index.find(e[2]), 1);
    }

    #[test]
    fn pop_removes_the_tail() {
        let (mut index, e) = indexed(2);

        assert_eq!(index.pop(), Some(e[1]));
        assert_eq!(index.pop(), Some(e[0]));
        assert_eq!(index.pop(), None);
        assert!(index.is_empty());
    }

    #[test]
    fn compact_reindexes_by_rank() {
        // Given
        let (mut index, e) = indexed(8);

        // When
        index.compact(&[0, 2, 3, 6]);

        // Then
        assert_eq!(index.entities(), &[e[1], e[4], e[5], e[7]]);
        assert_eq!(index.find(e[7]), 3);
        assert_eq!(index.find(e[4]), 1);
        assert!(!index.contains(e[6]));
        assert_bijection(&index);
    }

    #[test]
    fn compact_matches_sequential_removal() {
        let removed = [1, 4, 5, 9];
        let (mut batched, _) = indexed(10);
        let (mut sequential, _) = indexed(10);

        batched.compact(&removed);
        for (i, &p) in removed.iter().enumerate() {
            sequential.remove_at(p - i);
        }

        assert_eq!(batched.entities(), sequential.entities());
        assert_bijection(&batched);
    }

    #[test]
    fn emplace_stays_cheap_for_large_stores() {
        // Given
        let entities = Allocator::new().alloc_many(50_000);
        let mut index = EntityIndex::new();

        // When
        for &entity in &entities {
            index.emplace(entity);
        }

        // Then
        assert_eq!(index.len(), entities.len());
        assert_eq!(index.find(entities[49_999]), 49_999);
        assert_eq!(index.pop(), Some(entities[49_999]));
    }

    #[test]
    fn compact_with_nothing_to_remove_is_a_no_op() {
        let (mut index, e) = indexed(3);

        index.compact(&[]);

        assert_eq!(index.entities(), e.as_slice());
    }
}
