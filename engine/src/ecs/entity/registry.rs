use std::collections::HashMap;

use fixedbitset::FixedBitSet;
use log::{trace, warn};

use crate::ecs::{
    component,
    entity::{Allocator, Entity},
    error::{Error, Result},
};

/// Per-entity bookkeeping.
#[derive(Debug, Default, Clone)]
struct Entry {
    /// Destruction was requested this frame and will happen at the next barrier.
    pending_destroy: bool,

    /// Component ids owned by the entity, indexed by `component::Id::index`.
    components: FixedBitSet,
}

/// The set of live entities of a world.
///
/// Entities stay live until the frame barrier that follows their destruction request, so
/// `pending` is always a subset of `live`.
#[derive(Debug, Default)]
pub struct Registry {
    allocator: Allocator,

    /// Live entities in creation order, which is also ascending id order.
    live: Vec<Entity>,

    /// Bookkeeping for every live entity.
    entries: HashMap<Entity, Entry>,

    /// Entities marked for destruction, in request order.
    pending: Vec<Entity>,
}

impl Registry {
    /// Construct an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new live entity that owns no components.
    pub fn create(&mut self) -> Entity {
        let entity = self.allocator.alloc();
        self.live.push(entity);
        self.entries.insert(entity, Entry::default());
        entity
    }

    /// Determine if the entity is live. Entities pending destruction are still live.
    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entries.contains_key(&entity)
    }

    /// Determine if the entity is marked for destruction at the next barrier.
    #[inline]
    pub fn is_pending_destroy(&self, entity: Entity) -> bool {
        self.entries
            .get(&entity)
            .is_some_and(|entry| entry.pending_destroy)
    }

    /// Mark a live entity for destruction.
    ///
    /// Returns `Ok(true)` if the entity was newly marked and `Ok(false)` if it was already pending.
    pub fn mark_destroyed(&mut self, entity: Entity) -> Result<bool> {
        let Some(entry) = self.entries.get_mut(&entity) else {
            warn!("Attempted to destroy an entity that is not alive: {entity}");
            return Err(Error::EntityNotAlive(entity));
        };
        if entry.pending_destroy {
            return Ok(false);
        }
        entry.pending_destroy = true;
        self.pending.push(entity);
        trace!("entity {entity} marked for destruction");
        Ok(true)
    }

    /// Entities marked for destruction since the last purge.
    #[inline]
    pub fn pending_destroy(&self) -> &[Entity] {
        &self.pending
    }

    /// Remove every pending entity from the live set and discard its bookkeeping. Returns the
    /// number of entities destroyed.
    pub fn purge_pending(&mut self) -> usize {
        if self.pending.is_empty() {
            return 0;
        }
        let purged = self.pending.len();
        for entity in self.pending.drain(..) {
            self.entries.remove(&entity);
        }
        let entries = &self.entries;
        self.live.retain(|entity| entries.contains_key(entity));
        purged
    }

    /// Record that the entity owns a component of type `id`.
    pub fn grant(&mut self, entity: Entity, id: component::Id) {
        if let Some(entry) = self.entries.get_mut(&entity) {
            entry.components.grow(id.index() + 1);
            entry.components.insert(id.index());
        }
    }

    /// Record that the entity no longer owns a component of type `id`.
    pub fn revoke(&mut self, entity: Entity, id: component::Id) {
        if let Some(entry) = self.entries.get_mut(&entity)
            && id.index() < entry.components.len()
        {
            entry.components.set(id.index(), false);
        }
    }

    /// Determine if the entity owns a component of type `id`.
    #[inline]
    pub fn owns(&self, entity: Entity, id: component::Id) -> bool {
        self.entries
            .get(&entity)
            .is_some_and(|entry| entry.components.contains(id.index()))
    }

    /// Component ids owned by the entity, in ascending id order.
    pub fn components(&self, entity: Entity) -> impl Iterator<Item = component::Id> + '_ {
        self.entries
            .get(&entity)
            .into_iter()
            .flat_map(|entry| entry.components.ones())
            .map(|index| component::Id::new(index as u32))
    }

    /// Live entities in creation order.
    #[inline]
    pub fn live(&self) -> &[Entity] {
        &self.live
    }

    /// Number of live entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_entities_are_live_in_order() {
        // Given
        let mut registry = Registry::new();

        // When
        let a = registry.create();
        let b = registry.create();

        // Then
        assert!(registry.is_alive(a));
        assert!(registry.is_alive(b));
        assert_eq!(registry.live(), &[a, b]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn destroy_is_deferred_until_purge() {
        // Given
        let mut registry = Registry::new();
        let a = registry.create();
        let b = registry.create();
        let c = registry.create();

        // When
        assert_eq!(registry.mark_destroyed(b), Ok(true));

        // Then - still live until purged
        assert!(registry.is_alive(b));
        assert!(registry.is_pending_destroy(b));
        assert_eq!(registry.pending_destroy(), &[b]);

        // When
        let purged = registry.purge_pending();

        // Then
        assert_eq!(purged, 1);
        assert!(!registry.is_alive(b));
        assert!(!registry.is_pending_destroy(b));
        assert_eq!(registry.live(), &[a, c]);
        assert!(registry.pending_destroy().is_empty());
    }

    #[test]
    fn destroying_twice_in_a_frame_is_a_no_op() {
        let mut registry = Registry::new();
        let a = registry.create();

        assert_eq!(registry.mark_destroyed(a), Ok(true));
        assert_eq!(registry.mark_destroyed(a), Ok(false));
        assert_eq!(registry.pending_destroy(), &[a]);
    }

    #[test]
    fn destroying_a_dead_entity_is_an_error() {
        // Given
        let mut registry = Registry::new();
        let a = registry.create();
        registry.mark_destroyed(a).unwrap();
        registry.purge_pending();

        // When
        let result = registry.mark_destroyed(a);

        // Then
        assert_eq!(result, Err(Error::EntityNotAlive(a)));
        assert_eq!(registry.purge_pending(), 0);
    }

    #[test]
    fn ownership_is_tracked_per_component() {
        // Given
        let mut registry = Registry::new();
        let a = registry.create();
        let pos = component::Id::new(0);
        let vel = component::Id::new(5);

        // When
        registry.grant(a, pos);
        registry.grant(a, vel);

        // Then
        assert!(registry.owns(a, pos));
        assert!(registry.owns(a, vel));
        assert!(!registry.owns(a, component::Id::new(3)));
        assert_eq!(registry.components(a).collect::<Vec<_>>(), vec![pos, vel]);

        // When
        registry.revoke(a, pos);

        // Then
        assert!(!registry.owns(a, pos));
        assert_eq!(registry.components(a).collect::<Vec<_>>(), vec![vel]);
    }

    #[test]
    fn purge_discards_ownership() {
        let mut registry = Registry::new();
        let a = registry.create();
        let id = component::Id::new(1);
        registry.grant(a, id);

        registry.mark_destroyed(a).unwrap();
        registry.purge_pending();

        assert!(!registry.owns(a, id));
        assert_eq!(registry.components(a).count(), 0);
    }
}
