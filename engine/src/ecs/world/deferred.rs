use log::{trace, warn};

use crate::ecs::{
    component::{self, Component, Set},
    entity::{self, Entity},
    error::{Error, Result},
    storage::{PendingRemovals, Storage},
};

use super::{command::CommandBuffer, duplicate};

/// Records structural changes for the next frame barrier.
///
/// A `Deferred` is handed to [`World::each`](super::World::each) callbacks while the join holds
/// the component stores. It can read which components an entity owns, and it can request
/// component additions, component removals and entity destruction. Nothing it does moves a
/// record: the requests are applied by
/// [`World::run_frame_barrier`](super::World::run_frame_barrier).
pub struct Deferred<'w> {
    storage: &'w Storage,
    components: &'w component::Registry,
    entities: &'w mut entity::Registry,
    removals: &'w mut PendingRemovals,
    commands: &'w mut CommandBuffer,
}

impl<'w> Deferred<'w> {
    pub(crate) fn new(
        storage: &'w Storage,
        components: &'w component::Registry,
        entities: &'w mut entity::Registry,
        removals: &'w mut PendingRemovals,
        commands: &'w mut CommandBuffer,
    ) -> Self {
        Self {
            storage,
            components,
            entities,
            removals,
            commands,
        }
    }

    /// Request that `value` be attached to `entity` at the next barrier, after compaction. The
    /// entity does not own the component until then. If the entity is destroyed at that barrier,
    /// the value is dropped instead.
    ///
    /// # Errors
    /// - [`Error::EntityNotAlive`] if the entity is not live.
    /// - [`Error::DuplicateComponent`] if the entity owns a `C`, including one requested for
    ///   removal this frame, or a `C` is already queued for it.
    pub fn add_component<C: Component>(&mut self, entity: Entity, value: C) -> Result<()> {
        self.ensure_alive(entity, "add a component to")?;
        let id = self.components.register::<C>();
        let name = std::any::type_name::<C>();
        if self.entities.owns(entity, id) {
            return Err(duplicate(entity, name));
        }
        if self.commands.push_add(entity, id, value).is_err() {
            return Err(duplicate(entity, name));
        }
        trace!("addition of `{name}` to entity {entity} requested");
        Ok(())
    }

    /// Request removal of the `C` component of `entity` at the next barrier. The component stays
    /// readable until then. Requesting the same removal twice in a frame is a no-op.
    ///
    /// # Errors
    /// - [`Error::EntityNotAlive`] if the entity is not live.
    /// - [`Error::MissingComponent`] if the entity does not own a `C`.
    pub fn remove_component<C: Component>(&mut self, entity: Entity) -> Result<()> {
        self.ensure_alive(entity, "remove a component from")?;
        let (id, slot) =
            self.owned_slot(entity, self.components.get::<C>(), std::any::type_name::<C>())?;
        self.request(entity, id, slot);
        Ok(())
    }

    /// Request removal of every component in `S`. Nothing is requested unless the entity owns all
    /// of them.
    pub fn remove_components<S: Set>(&mut self, entity: Entity) -> Result<()> {
        self.ensure_alive(entity, "remove components from")?;
        let mut requests = Vec::new();
        for info in S::infos(self.components) {
            requests.push(self.owned_slot(entity, Some(info.id()), info.name())?);
        }
        for (id, slot) in requests {
            self.request(entity, id, slot);
        }
        Ok(())
    }

    /// Request destruction of `entity` at the next barrier, together with every component it
    /// owns. Destroying an entity that is already pending is a no-op.
    ///
    /// # Errors
    /// [`Error::EntityNotAlive`] if the entity is not live.
    pub fn destroy_entity(&mut self, entity: Entity) -> Result<()> {
        if !self.entities.mark_destroyed(entity)? {
            return Ok(());
        }
        for id in self.entities.components(entity) {
            if let Some(slot) = self
                .storage
                .get(id)
                .and_then(|store| store.index().slot_of(entity))
            {
                self.removals.request(id, slot);
            }
        }
        Ok(())
    }

    /// Whether `entity` owns a `C`, including one already requested for removal. A queued addition
    /// is not owned yet.
    pub fn has_component<C: Component>(&self, entity: Entity) -> bool {
        self.components
            .get::<C>()
            .is_some_and(|id| self.entities.owns(entity, id))
    }

    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    #[inline]
    pub fn is_pending_destroy(&self, entity: Entity) -> bool {
        self.entities.is_pending_destroy(entity)
    }

    fn ensure_alive(&self, entity: Entity, action: &str) -> Result<()> {
        if self.entities.is_alive(entity) {
            return Ok(());
        }
        warn!("Attempted to {action} an entity that is not alive: {entity}");
        Err(Error::EntityNotAlive(entity))
    }

    /// The store slot of the `id` record of `entity`.
    fn owned_slot(
        &self,
        entity: Entity,
        id: Option<component::Id>,
        name: &'static str,
    ) -> Result<(component::Id, usize)> {
        id.filter(|&id| self.entities.owns(entity, id))
            .and_then(|id| {
                self.storage
                    .get(id)
                    .and_then(|store| store.index().slot_of(entity))
                    .map(|slot| (id, slot))
            })
            .ok_or_else(|| {
                warn!("Attempted to remove a `{name}` component that entity {entity} does not own");
                Error::MissingComponent {
                    entity,
                    component: name,
                }
            })
    }

    fn request(&mut self, entity: Entity, id: component::Id, slot: usize) {
        if self.removals.request(id, slot) {
            trace!("removal of {id:?} from entity {entity} (slot {slot}) requested");
        }
    }
}

