//! Entity identity and lifetime tracking.
//!
//! An [`Entity`] is an opaque, non-zero 64 bit identifier. Identifiers come from an
//! [`Allocator`] owned by each world, which counts up from 1 and never hands the same value out
//! twice, so a stale handle can never alias a newer entity.
//!
//! The [`Registry`] tracks which entities are live, which are waiting to be destroyed at the next
//! frame barrier, and which component types each entity owns.
//!
//! ```rust,ignore
//! let mut allocator = Allocator::new();
//! let a = allocator.alloc(); // Entity(1)
//! let b = allocator.alloc(); // Entity(2)
//! assert!(a < b);
//! ```

mod registry;

use std::{fmt, num::NonZeroU64};

pub use registry::Registry;

/// An entity in the ECS. The value zero is reserved as the invalid identifier and can never be
/// constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity(NonZeroU64);

impl Entity {
    /// Construct an entity from a raw identifier, `None` for the reserved value zero.
    #[inline]
    pub const fn from_raw(id: u64) -> Option<Self> {
        match NonZeroU64::new(id) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    /// Get the raw identifier of this entity.
    #[inline]
    pub const fn id(&self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out entity identifiers in strictly increasing order, starting at 1.
///
/// Identifiers are never recycled. Sixty-four bits are not exhausted by any realistic program, so
/// running out is treated as a bug rather than an error.
#[derive(Debug, Clone)]
pub struct Allocator {
    /// The next identifier to hand out.
    next: NonZeroU64,
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Allocator {
    /// Construct an allocator whose first entity is `#1`.
    #[inline]
    pub const fn new() -> Self {
        Self {
            next: NonZeroU64::MIN,
        }
    }

    /// Allocate a fresh entity.
    ///
    /// # Panics
    /// If the identifier space is exhausted.
    pub fn alloc(&mut self) -> Entity {
        let entity = Entity(self.next);
        self.next = self
            .next
            .checked_add(1)
            .expect("entity id space exhausted");
        entity
    }

    /// Allocate `count` fresh entities, in increasing order.
    pub fn alloc_many(&mut self, count: usize) -> Vec<Entity> {
        (0..count).map(|_| self.alloc()).collect()
    }

    /// The identifier the next allocation will return.
    #[inline]
    pub fn peek(&self) -> Entity {
        Entity(self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_an_entity() {
        assert_eq!(Entity::from_raw(0), None);
        assert_eq!(Entity::from_raw(3).map(|e| e.id()), Some(3));
    }

    #[test]
    fn allocator_starts_at_one_and_counts_up() {
        // Given
        let mut allocator = Allocator::new();

        // When
        let first = allocator.alloc();
        let second = allocator.alloc();

        // Then
        assert_eq!(first.id(), 1);
        assert_eq!(second.id(), 2);
        assert_eq!(allocator.peek().id(), 3);
    }

    #[test]
    fn allocator_uniqueness() {
        // Given
        let mut allocator = Allocator::default();

        // When
        let mut entities = allocator.alloc_many(200);

        // Then - strictly increasing, so no dupes
        assert!(entities.windows(2).all(|w| w[0] < w[1]));
        let pre_len = entities.len();
        entities.dedup();
        assert_eq!(pre_len, entities.len());
    }

    #[test]
    fn separate_allocators_are_independent() {
        let mut a = Allocator::new();
        let mut b = Allocator::new();
        a.alloc_many(5);

        assert_eq!(b.alloc().id(), 1);
    }

    #[test]
    fn display_is_readable() {
        let entity = Entity::from_raw(42).unwrap();
        assert_eq!(entity.to_string(), "#42");
    }
}
