//! Deferred component additions.
//!
//! A join callback cannot attach a component in place: pushing into a store may reallocate it
//! while the join holds references into it. [`Deferred::add_component`](super::Deferred) queues
//! the value here instead, and the frame barrier attaches it after compaction.

use std::collections::HashSet;

use crate::ecs::{
    component::{self, Component},
    entity::{self, Entity},
    error::Result,
    storage::Storage,
};

use super::{Config, attach};

type Apply = Box<dyn FnOnce(&mut Storage, &mut entity::Registry, &Config) -> Result<()> + Send>;

/// One queued addition, holding the boxed value until the barrier.
pub(crate) struct Command {
    entity: Entity,
    id: component::Id,
    name: &'static str,
    apply: Apply,
}

impl Command {
    #[inline]
    pub(crate) fn entity(&self) -> Entity {
        self.entity
    }

    #[inline]
    pub(crate) fn id(&self) -> component::Id {
        self.id
    }

    #[inline]
    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    /// Attach the value. The entity must be live and must not own the component.
    pub(crate) fn apply(
        self,
        storage: &mut Storage,
        entities: &mut entity::Registry,
        config: &Config,
    ) -> Result<()> {
        (self.apply)(storage, entities, config)
    }
}

/// Additions requested since the last barrier, in request order.
#[derive(Default)]
pub(crate) struct CommandBuffer {
    commands: Vec<Command>,
    queued: HashSet<(Entity, component::Id)>,
}

impl CommandBuffer {
    /// Queue `value` for `entity`. Hands the value back if the same component is already queued
    /// for that entity.
    pub(crate) fn push_add<C: Component>(
        &mut self,
        entity: Entity,
        id: component::Id,
        value: C,
    ) -> std::result::Result<(), C> {
        if !self.queued.insert((entity, id)) {
            return Err(value);
        }
        self.commands.push(Command {
            entity,
            id,
            name: std::any::type_name::<C>(),
            apply: Box::new(move |storage, entities, config| {
                attach(storage, entities, config, entity, id, value).map(|_| ())
            }),
        });
        Ok(())
    }

    #[inline]
    pub(crate) fn contains(&self, entity: Entity, id: component::Id) -> bool {
        self.queued.contains(&(entity, id))
    }

    /// Take every queued command in request order.
    pub(crate) fn drain(&mut self) -> Vec<Command> {
        self.queued.clear();
        std::mem::take(&mut self.commands)
    }
}
