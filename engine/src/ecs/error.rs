use crate::ecs::entity::Entity;

/// Convenience result type for fallible ECS operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors reported by the component store and the world API.
///
/// Apart from [`Error::CapacityExhausted`] every variant is a caller contract violation. They are
/// reported before any state is touched, so the world is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The entity was never created or has already been purged at a barrier.
    #[error("entity {0} is not alive")]
    EntityNotAlive(Entity),

    /// The entity already owns a component of this type.
    #[error("entity {entity} already owns a `{component}` component")]
    DuplicateComponent {
        entity: Entity,
        component: &'static str,
    },

    /// The entity does not own a component of this type.
    #[error("entity {entity} does not own a `{component}` component")]
    MissingComponent {
        entity: Entity,
        component: &'static str,
    },

    /// The store is already at its maximum representable capacity, or the allocator refused the
    /// grown buffer.
    #[error("component store cannot grow beyond {capacity} records")]
    CapacityExhausted { capacity: usize },

    /// A slot index outside `0..=len` was passed to an insert.
    #[error("slot {index} is out of bounds for a store of {len} records")]
    SlotOutOfBounds { index: usize, len: usize },
}
