//! The World owns every entity and component store and is the API systems talk to.
//!
//! # Architecture
//!
//! The World coordinates several parts:
//! - **Entity Registry**: live entities, pending destruction and per-entity ownership.
//! - **Component Registry**: the dense id and layout of every component type.
//! - **Storage**: one packed store plus entity index per component type.
//! - **Pending Removals**: slots to drop at the next frame barrier.
//! - **Command Buffer**: component values queued from join callbacks, attached at the barrier.
//!
//! # Frames
//!
//! Adding a component appends to its store right away. Removing a component or destroying an
//! entity only records a request; the entity keeps its components and stays live until
//! [`World::run_frame_barrier`] compacts every touched store in one pass and purges destroyed
//! entities. Between barriers every slot stays where it is, which is what lets a join hand out
//! references while its callback keeps issuing removals through [`Deferred`]. A callback that
//! needs to attach a component queues it through [`Deferred::add_component`]; the barrier
//! attaches queued values after compaction.
//!
//! # Example
//!
//! ```rust
//! use packed_ecs::ecs::{Component, World};
//!
//! #[derive(Debug, PartialEq)]
//! struct Position { x: i32 }
//! impl Component for Position {}
//!
//! #[derive(Debug, PartialEq)]
//! struct Velocity { dx: i32 }
//! impl Component for Velocity {}
//!
//! let mut world = World::new();
//! let entity = world.create_entity();
//! world.add_components(entity, (Position { x: 0 }, Velocity { dx: 2 })).unwrap();
//!
//! world.each::<(&mut Position, &Velocity), _>(|entity, (position, velocity), deferred| {
//!     position.x += velocity.dx;
//!     deferred.remove_component::<Velocity>(entity).unwrap();
//! });
//! assert!(world.has_component::<Velocity>(entity));
//!
//! world.run_frame_barrier();
//! assert!(!world.has_component::<Velocity>(entity));
//! assert_eq!(world.get_component::<Position>(entity), Some(&Position { x: 2 }));
//! ```

mod command;
mod config;
mod deferred;
mod handle;

use std::collections::HashSet;

use log::{debug, trace, warn};

pub use config::Config;
pub use deferred::Deferred;
pub use handle::EntityMut;

use command::CommandBuffer;

use crate::ecs::{
    component::{self, Component, Info, Set, Target},
    entity::{self, Entity},
    error::{Error, Result},
    query::{Data, Join},
    storage::{PendingRemovals, Storage},
};

/// What a frame barrier did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BarrierStats {
    /// Stores that were compacted.
    pub stores_compacted: usize,
    /// Component records dropped across all stores.
    pub components_removed: usize,
    /// Entities purged from the live set.
    pub entities_destroyed: usize,
    /// Queued components attached after compaction.
    pub components_added: usize,
    /// Queued components that could not be attached: the store could not grow, or the entity
    /// already owned the type. Each failure is logged.
    pub adds_failed: usize,
}

impl BarrierStats {
    /// Whether the barrier had nothing to do.
    #[inline]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The container of all entities and their components.
#[derive(Default)]
pub struct World {
    config: Config,
    components: component::Registry,
    entities: entity::Registry,
    storage: Storage,
    removals: PendingRemovals,
    commands: CommandBuffer,
}

impl World {
    /// Create an empty world with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty world whose stores use `config`.
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Create a new live entity owning no components.
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.entities.create();
        trace!("entity {entity} created");
        entity
    }

    /// Request destruction of `entity` and all of its components at the next barrier. The entity
    /// stays live until then; destroying it again in the same frame is a no-op.
    ///
    /// # Errors
    /// [`Error::EntityNotAlive`] if the entity is not live.
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<()> {
        self.deferred().destroy_entity(entity)
    }

    /// Attach `value` to `entity` and return the stored component.
    ///
    /// # Errors
    /// - [`Error::EntityNotAlive`] if the entity is not live.
    /// - [`Error::DuplicateComponent`] if the entity already owns a `C`, including one requested
    ///   for removal this frame, or has a `C` queued through [`Deferred::add_component`]. The
    ///   store is left untouched.
    /// - [`Error::CapacityExhausted`] if the store cannot grow.
    pub fn add_component<C: Component>(&mut self, entity: Entity, value: C) -> Result<&mut C> {
        self.ensure_alive(entity)?;
        let id = self.components.register::<C>();
        if self.entities.owns(entity, id) || self.commands.contains(entity, id) {
            return Err(duplicate(entity, std::any::type_name::<C>()));
        }
        attach(
            &mut self.storage,
            &mut self.entities,
            &self.config,
            entity,
            id,
            value,
        )
    }

    /// Attach every component of `set` to `entity`. The whole set is validated before anything
    /// is attached: a set naming a type twice, or a type the entity already owns, attaches
    /// nothing.
    ///
    /// # Errors
    /// As [`World::add_component`]. If a store fails to grow midway, the components attached
    /// before it stay attached.
    pub fn add_components<S: Set>(&mut self, entity: Entity, set: S) -> Result<()> {
        self.ensure_alive(entity)?;
        let mut seen = HashSet::new();
        for info in S::infos(&self.components) {
            if !seen.insert(info.id())
                || self.entities.owns(entity, info.id())
                || self.commands.contains(entity, info.id())
            {
                return Err(duplicate(entity, info.name()));
            }
        }
        let mut target = Attach {
            storage: &mut self.storage,
            entities: &mut self.entities,
            config: &self.config,
            entity,
        };
        set.apply(&self.components, &mut target)
    }

    /// Request removal of the `C` component of `entity` at the next barrier.
    ///
    /// # Errors
    /// - [`Error::EntityNotAlive`] if the entity is not live.
    /// - [`Error::MissingComponent`] if the entity does not own a `C`.
    pub fn remove_component<C: Component>(&mut self, entity: Entity) -> Result<()> {
        self.deferred().remove_component::<C>(entity)
    }

    /// Request removal of every component in `S`, or of none if one is missing.
    pub fn remove_components<S: Set>(&mut self, entity: Entity) -> Result<()> {
        self.deferred().remove_components::<S>(entity)
    }

    /// Get the `C` component of `entity`.
    pub fn get_component<C: Component>(&self, entity: Entity) -> Option<&C> {
        let id = self.components.get::<C>()?;
        self.storage.get(id)?.get::<C>(entity)
    }

    /// Get the `C` component of `entity` mutably.
    pub fn get_component_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
        let id = self.components.get::<C>()?;
        self.storage.get_mut(id)?.get_mut::<C>(entity)
    }

    /// Whether `entity` owns a `C`. A component requested for removal is still owned until the
    /// next barrier.
    pub fn has_component<C: Component>(&self, entity: Entity) -> bool {
        self.components
            .get::<C>()
            .is_some_and(|id| self.entities.owns(entity, id))
    }

    /// Whether `entity` owns every component in `S`.
    pub fn has_components<S: Set>(&self, entity: Entity) -> bool {
        S::infos(&self.components)
            .iter()
            .all(|info| self.entities.owns(entity, info.id()))
    }

    /// Join over the stores named by `D`. See [`Join`].
    ///
    /// # Panics
    /// If `D` names a component type more than once.
    pub fn query<D: Data>(&mut self) -> Join<'_, D> {
        Join::new(&self.storage, &self.components)
    }

    /// Call `f` for every entity matched by the join `D`, with a [`Deferred`] handle for
    /// addition, removal and destruction requests.
    ///
    /// # Panics
    /// If `D` names a component type more than once.
    pub fn each<'w, D, F>(&'w mut self, mut f: F)
    where
        D: Data,
        F: FnMut(Entity, D::Item<'w>, &mut Deferred<'w>),
    {
        let join = Join::<D>::new(&self.storage, &self.components);
        let mut deferred = Deferred::new(
            &self.storage,
            &self.components,
            &mut self.entities,
            &mut self.removals,
            &mut self.commands,
        );
        for (entity, item) in join {
            f(entity, item, &mut deferred);
        }
    }

    /// Call `f` for every live entity in creation order, including entities pending destruction.
    pub fn each_entity<F: FnMut(Entity)>(&self, f: F) {
        self.entities.live().iter().copied().for_each(f);
    }

    /// Apply every request made since the last barrier.
    ///
    /// Each store with pending removals is compacted in one pass and its surviving entities are
    /// reindexed by rank. Destroyed entities then leave the live set. Queued additions are
    /// attached last, in request order; additions for entities destroyed at this barrier are
    /// dropped. Running the barrier with nothing pending does nothing.
    pub fn run_frame_barrier(&mut self) -> BarrierStats {
        let mut stats = BarrierStats::default();

        // Components attached after the destruction request still go with the entity.
        let pending = self.entities.pending_destroy().to_vec();
        for &entity in &pending {
            for id in self.entities.components(entity) {
                if let Some(slot) = self
                    .storage
                    .get(id)
                    .and_then(|store| store.index().slot_of(entity))
                {
                    self.removals.request(id, slot);
                }
            }
        }

        for (id, slots) in self.removals.drain() {
            let Some(store) = self.storage.get_mut(id) else {
                continue;
            };
            for &slot in &slots {
                if let Some(owner) = store.index().owner(slot) {
                    self.entities.revoke(owner, id);
                }
            }
            store.compact(&slots);
            stats.stores_compacted += 1;
            stats.components_removed += slots.len();
        }

        stats.entities_destroyed = self.entities.purge_pending();

        for command in self.commands.drain() {
            let (entity, id, name) = (command.entity(), command.id(), command.name());
            if !self.entities.is_alive(entity) {
                trace!("dropping queued `{name}` for destroyed entity {entity}");
                continue;
            }
            if self.entities.owns(entity, id) {
                warn!("dropping queued `{name}`: entity {entity} already owns one");
                stats.adds_failed += 1;
                continue;
            }
            match command.apply(&mut self.storage, &mut self.entities, &self.config) {
                Ok(()) => stats.components_added += 1,
                Err(err) => {
                    warn!("could not attach queued `{name}` to entity {entity}: {err}");
                    stats.adds_failed += 1;
                }
            }
        }

        if !stats.is_empty() {
            debug!(
                "frame barrier: {} stores compacted, {} components removed, {} entities destroyed, \
                 {} components added, {} additions failed",
                stats.stores_compacted,
                stats.components_removed,
                stats.entities_destroyed,
                stats.components_added,
                stats.adds_failed
            );
        }
        stats
    }

    /// A handle to `entity`, if it is live.
    pub fn entity(&mut self, entity: Entity) -> Option<EntityMut<'_>> {
        self.entities
            .is_alive(entity)
            .then(|| EntityMut::new(self, entity))
    }

    /// Whether `entity` is live. Entities pending destruction are live until the next barrier.
    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    #[inline]
    pub fn is_pending_destroy(&self, entity: Entity) -> bool {
        self.entities.is_pending_destroy(entity)
    }

    /// Number of live entities.
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Live entities in creation order.
    #[inline]
    pub fn entities(&self) -> &[Entity] {
        self.entities.live()
    }

    /// Number of `C` records currently stored, including ones pending removal.
    pub fn component_count<C: Component>(&self) -> usize {
        self.components
            .get::<C>()
            .and_then(|id| self.storage.get(id))
            .map_or(0, |store| store.len())
    }

    /// Reserve room for `additional` more `C` records.
    pub fn reserve<C: Component>(&mut self, additional: usize) -> Result<()> {
        let id = self.components.register::<C>();
        self.storage
            .get_or_create(
                Info::new::<C>(id),
                self.config.growth,
                self.config.initial_capacity,
            )?
            .reserve(additional)
    }

    /// Release unused capacity in every store. A store that cannot be shrunk keeps its buffer.
    pub fn shrink_to_fit(&mut self) {
        for store in self.storage.iter_mut() {
            if let Err(err) = store.shrink_to_fit() {
                warn!("could not shrink the store of `{}`: {err}", store.info().name());
            }
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn components(&self) -> &component::Registry {
        &self.components
    }

    #[inline]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    fn deferred(&mut self) -> Deferred<'_> {
        Deferred::new(
            &self.storage,
            &self.components,
            &mut self.entities,
            &mut self.removals,
            &mut self.commands,
        )
    }

    fn ensure_alive(&self, entity: Entity) -> Result<()> {
        if self.entities.is_alive(entity) {
            return Ok(());
        }
        warn!("Attempted to add a component to an entity that is not alive: {entity}");
        Err(Error::EntityNotAlive(entity))
    }
}

/// Push `value` into the store of `id` and record the ownership.
fn attach<'a, C: Component>(
    storage: &'a mut Storage,
    entities: &mut entity::Registry,
    config: &Config,
    entity: Entity,
    id: component::Id,
    value: C,
) -> Result<&'a mut C> {
    let store = storage.get_or_create(Info::new::<C>(id), config.growth, config.initial_capacity)?;
    let component = store.push(entity, value)?;
    entities.grant(entity, id);
    trace!("{} attached to entity {entity}", std::any::type_name::<C>());
    Ok(component)
}

fn duplicate(entity: Entity, component: &'static str) -> Error {
    warn!("Attempted to add a second `{component}` component to entity {entity}");
    Error::DuplicateComponent { entity, component }
}

/// Attaches the values of a component set to one entity.
struct Attach<'a> {
    storage: &'a mut Storage,
    entities: &'a mut entity::Registry,
    config: &'a Config,
    entity: Entity,
}

impl Target for Attach<'_> {
    fn apply<C: Component>(&mut self, id: component::Id, value: C) -> Result<()> {
        attach(
            self.storage,
            self.entities,
            self.config,
            self.entity,
            id,
            value,
        )
        .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Component, storage::GrowthStrategy};

    #[derive(Component, Debug, Clone, PartialEq)]
    struct Position {
        x: i32,
        y: i32,
    }

    #[derive(Component, Debug, Clone, PartialEq)]
    struct Velocity {
        dx: i32,
    }

    #[derive(Component, Debug, PartialEq)]
    struct Tag;

    #[test]
    fn add_and_get_components() {
        // Given
        let mut world = World::new();
        let entity = world.create_entity();

        // When
        world.add_component(entity, Position { x: 1, y: 2 }).unwrap().x = 5;

        // Then
        assert_eq!(
            world.get_component::<Position>(entity),
            Some(&Position { x: 5, y: 2 })
        );
        assert!(world.has_component::<Position>(entity));
        assert!(!world.has_component::<Velocity>(entity));
        assert_eq!(world.get_component::<Velocity>(entity), None);
    }

    #[test]
    fn duplicate_add_is_rejected_and_leaves_the_store_alone() {
        // Given
        let mut world = World::new();
        let entity = world.create_entity();
        world.add_component(entity, Tag).unwrap();

        // When
        let result = world.add_component(entity, Tag);

        // Then
        assert!(matches!(result, Err(Error::DuplicateComponent { .. })));
        assert_eq!(world.component_count::<Tag>(), 1);
    }

    #[test]
    fn adding_to_a_dead_entity_fails() {
        let mut world = World::new();
        let entity = world.create_entity();
        world.destroy_entity(entity).unwrap();
        world.run_frame_barrier();

        let result = world.add_component(entity, Tag);

        assert_eq!(result, Err(Error::EntityNotAlive(entity)));
        assert_eq!(world.component_count::<Tag>(), 0);
    }

    #[test]
    fn removal_waits_for_the_barrier() {
        // Given
        let mut world = World::new();
        let entity = world.create_entity();
        world.add_component(entity, Velocity { dx: 1 }).unwrap();

        // When
        world.remove_component::<Velocity>(entity).unwrap();

        // Then
        assert!(world.has_component::<Velocity>(entity));
        assert_eq!(world.component_count::<Velocity>(), 1);

        // When
        let stats = world.run_frame_barrier();

        // Then
        assert_eq!(
            stats,
            BarrierStats {
                stores_compacted: 1,
                components_removed: 1,
                entities_destroyed: 0,
                ..BarrierStats::default()
            }
        );
        assert!(!world.has_component::<Velocity>(entity));
        assert_eq!(world.component_count::<Velocity>(), 0);
        assert!(world.is_alive(entity));
    }

    #[test]
    fn removing_a_missing_component_fails() {
        let mut world = World::new();
        let entity = world.create_entity();

        assert_eq!(
            world.remove_component::<Velocity>(entity),
            Err(Error::MissingComponent {
                entity,
                component: std::any::type_name::<Velocity>(),
            })
        );
    }

    #[test]
    fn destroy_is_idempotent_within_a_frame() {
        // Given
        let mut world = World::new();
        let entity = world.create_entity();
        world.add_component(entity, Tag).unwrap();

        // When
        world.destroy_entity(entity).unwrap();
        world.destroy_entity(entity).unwrap();

        // Then
        assert!(world.is_alive(entity));
        assert!(world.is_pending_destroy(entity));

        // When
        let stats = world.run_frame_barrier();

        // Then
        assert_eq!(stats.entities_destroyed, 1);
        assert_eq!(stats.components_removed, 1);
        assert!(!world.is_alive(entity));
        assert_eq!(world.destroy_entity(entity), Err(Error::EntityNotAlive(entity)));
    }

    #[test]
    fn components_added_after_destroy_go_with_the_entity() {
        let mut world = World::new();
        let entity = world.create_entity();
        world.destroy_entity(entity).unwrap();
        world.add_component(entity, Tag).unwrap();

        world.run_frame_barrier();

        assert_eq!(world.component_count::<Tag>(), 0);
    }

    #[test]
    fn component_sets_are_validated_up_front() {
        // Given
        let mut world = World::new();
        let entity = world.create_entity();
        world.add_component(entity, Tag).unwrap();

        // When
        let result = world.add_components(entity, (Position { x: 0, y: 0 }, Tag));

        // Then - nothing attached
        assert!(matches!(result, Err(Error::DuplicateComponent { .. })));
        assert!(!world.has_component::<Position>(entity));

        // When
        world
            .add_components(entity, (Position { x: 0, y: 0 }, Velocity { dx: 1 }))
            .unwrap();

        // Then
        assert!(world.has_components::<(Position, Velocity, Tag)>(entity));
    }

    #[test]
    fn component_sets_reject_repeated_types() {
        let mut world = World::new();
        let entity = world.create_entity();

        let result = world.add_components(entity, (Tag, Tag));

        assert!(matches!(result, Err(Error::DuplicateComponent { .. })));
        assert_eq!(world.component_count::<Tag>(), 0);
    }

    #[test]
    fn remove_components_is_all_or_nothing() {
        // Given
        let mut world = World::new();
        let entity = world.create_entity();
        world
            .add_components(entity, (Position { x: 0, y: 0 }, Tag))
            .unwrap();

        // When
        let result = world.remove_components::<(Position, Velocity)>(entity);
        world.run_frame_barrier();

        // Then
        assert!(matches!(result, Err(Error::MissingComponent { .. })));
        assert!(world.has_component::<Position>(entity));

        // When
        world.remove_components::<(Position, Tag)>(entity).unwrap();
        world.run_frame_barrier();

        // Then
        assert!(!world.has_components::<(Position,)>(entity));
        assert!(!world.has_component::<Tag>(entity));
    }

    #[test]
    fn each_defers_removals_until_the_barrier() {
        // Given
        let mut world = World::new();
        let entities: Vec<_> = (0..4).map(|_| world.create_entity()).collect();
        for (i, &entity) in entities.iter().enumerate() {
            world
                .add_components(entity, (Position { x: i as i32, y: 0 }, Velocity { dx: 1 }))
                .unwrap();
        }

        // When
        let mut visited = 0;
        world.each::<(&mut Position, &Velocity), _>(|entity, (position, velocity), deferred| {
            position.x += velocity.dx;
            visited += 1;
            if position.x % 2 == 0 {
                deferred.destroy_entity(entity).unwrap();
            }
        });

        // Then - nothing moved yet
        assert_eq!(visited, 4);
        assert_eq!(world.entity_count(), 4);

        // When
        world.run_frame_barrier();

        // Then
        assert_eq!(world.entities(), &[entities[0], entities[2]]);
        assert_eq!(
            world.get_component::<Position>(entities[2]),
            Some(&Position { x: 3, y: 0 })
        );
    }

    #[test]
    fn additions_queued_in_a_join_attach_at_the_barrier() {
        // Given
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        world.add_component(a, Position { x: 1, y: 0 }).unwrap();
        world.add_component(b, Position { x: 2, y: 0 }).unwrap();

        // When
        world.each::<&Position, _>(|entity, position, deferred| {
            deferred
                .add_component(entity, Velocity { dx: position.x })
                .unwrap();
            assert!(!deferred.has_component::<Velocity>(entity));
        });

        // Then - nothing attached yet, and direct adds of the same type are refused
        assert!(!world.has_component::<Velocity>(a));
        assert!(matches!(
            world.add_component(a, Velocity { dx: 9 }),
            Err(Error::DuplicateComponent { .. })
        ));

        // When
        let stats = world.run_frame_barrier();

        // Then
        assert_eq!(stats.components_added, 2);
        assert_eq!(stats.adds_failed, 0);
        assert_eq!(world.get_component::<Velocity>(a), Some(&Velocity { dx: 1 }));
        assert_eq!(world.get_component::<Velocity>(b), Some(&Velocity { dx: 2 }));
        assert!(world.run_frame_barrier().is_empty());
    }

    #[test]
    fn queued_additions_reject_duplicates() {
        // Given
        let mut world = World::new();
        let entity = world.create_entity();
        world.add_component(entity, Tag).unwrap();
        let mut results = Vec::new();

        // When
        world.each::<&Tag, _>(|entity, _, deferred| {
            results.push(deferred.add_component(entity, Tag).is_ok());
            results.push(deferred.add_component(entity, Velocity { dx: 0 }).is_ok());
            results.push(deferred.add_component(entity, Velocity { dx: 1 }).is_ok());
        });
        world.run_frame_barrier();

        // Then
        assert_eq!(results, vec![false, true, false]);
        assert_eq!(world.get_component::<Velocity>(entity), Some(&Velocity { dx: 0 }));
        assert_eq!(world.component_count::<Tag>(), 1);
    }

    #[test]
    fn queued_additions_for_destroyed_entities_are_dropped() {
        // Given
        let mut world = World::new();
        let entity = world.create_entity();
        world.add_component(entity, Tag).unwrap();

        // When
        world.each::<&Tag, _>(|entity, _, deferred| {
            deferred.add_component(entity, Velocity { dx: 3 }).unwrap();
            deferred.destroy_entity(entity).unwrap();
        });
        let stats = world.run_frame_barrier();

        // Then
        assert!(!world.is_alive(entity));
        assert_eq!(stats.components_added, 0);
        assert_eq!(stats.adds_failed, 0);
        assert_eq!(world.component_count::<Velocity>(), 0);
        assert_eq!(world.component_count::<Tag>(), 0);
    }

    #[test]
    fn each_entity_visits_live_entities_in_order() {
        let mut world = World::new();
        let a = world.create_entity();
        let b = world.create_entity();
        world.destroy_entity(b).unwrap();

        let mut seen = Vec::new();
        world.each_entity(|entity| seen.push(entity));

        assert_eq!(seen, vec![a, b]);
    }

    #[test]
    fn barrier_with_nothing_pending_does_nothing() {
        let mut world = World::new();
        let entity = world.create_entity();
        world.add_component(entity, Tag).unwrap();

        assert!(world.run_frame_barrier().is_empty());
        assert!(world.run_frame_barrier().is_empty());
        assert!(world.has_component::<Tag>(entity));
    }

    #[test]
    fn entity_handles_forward_to_the_world() {
        // Given
        let mut world = World::new();
        let id = world.create_entity();

        // When
        let mut entity = world.entity(id).unwrap();
        entity.add(Position { x: 1, y: 1 }).unwrap();
        entity.get_mut::<Position>().unwrap().y = 9;
        entity.destroy().unwrap();

        // Then
        assert_eq!(
            world.get_component::<Position>(id),
            Some(&Position { x: 1, y: 9 })
        );
        assert!(world.is_pending_destroy(id));
        world.run_frame_barrier();
        assert!(world.entity(id).is_none());
    }

    #[test]
    fn config_applies_to_new_stores() {
        // Given
        let mut world = World::with_config(
            Config::default()
                .with_growth(GrowthStrategy::Exact)
                .with_initial_capacity(8),
        );
        let entity = world.create_entity();

        // When
        world.add_component(entity, Velocity { dx: 0 }).unwrap();

        // Then
        let id = world.components().get::<Velocity>().unwrap();
        assert_eq!(world.storage().get(id).unwrap().data().capacity(), 8);

        // When
        world.reserve::<Velocity>(20).unwrap();
        world.shrink_to_fit();

        // Then
        assert_eq!(world.storage().get(id).unwrap().data().capacity(), 1);
    }
}
