use crate::ecs::{
    component::{Component, Set},
    entity::Entity,
    error::Result,
    world::World,
};

/// A handle to one live entity with mutable access to the world.
///
/// The lifetime `'w` ties the handle to the borrow of the [`World`] it came from. Every method
/// forwards to the world method of the same name for this entity.
///
/// ```rust
/// # use packed_ecs::ecs::{Component, World};
/// # #[derive(Debug, PartialEq)] struct Health(u32);
/// # impl Component for Health {}
/// let mut world = World::new();
/// let id = world.create_entity();
///
/// let mut entity = world.entity(id).unwrap();
/// entity.add(Health(10)).unwrap();
/// assert_eq!(entity.get::<Health>(), Some(&Health(10)));
/// ```
pub struct EntityMut<'w> {
    world: &'w mut World,
    entity: Entity,
}

impl<'w> EntityMut<'w> {
    #[inline]
    pub(crate) fn new(world: &'w mut World, entity: Entity) -> Self {
        Self { world, entity }
    }

    /// The entity this handle points to.
    #[inline]
    pub fn id(&self) -> Entity {
        self.entity
    }

    pub fn add<C: Component>(&mut self, value: C) -> Result<&mut C> {
        self.world.add_component(self.entity, value)
    }

    pub fn add_all<S: Set>(&mut self, set: S) -> Result<()> {
        self.world.add_components(self.entity, set)
    }

    pub fn get<C: Component>(&self) -> Option<&C> {
        self.world.get_component(self.entity)
    }

    pub fn get_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.world.get_component_mut(self.entity)
    }

    pub fn has<C: Component>(&self) -> bool {
        self.world.has_component::<C>(self.entity)
    }

    pub fn has_all<S: Set>(&self) -> bool {
        self.world.has_components::<S>(self.entity)
    }

    pub fn remove<C: Component>(&mut self) -> Result<()> {
        self.world.remove_component::<C>(self.entity)
    }

    pub fn remove_all<S: Set>(&mut self) -> Result<()> {
        self.world.remove_components::<S>(self.entity)
    }

    /// Request destruction at the next barrier, consuming the handle.
    pub fn destroy(self) -> Result<()> {
        self.world.destroy_entity(self.entity)
    }

    #[inline]
    pub fn is_pending_destroy(&self) -> bool {
        self.world.is_pending_destroy(self.entity)
    }
}
