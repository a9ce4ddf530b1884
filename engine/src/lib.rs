//! Packed, type-erased component storage for an entity component system.
//!
//! Every component type lives in its own contiguous store, entities map to dense slots through a
//! per-type index, and structural removals are batched until an explicit frame barrier so that
//! iteration never observes a store mid-compaction.
//!
//! ```rust
//! use packed_ecs::ecs::{Component, World};
//!
//! #[derive(Debug, PartialEq)]
//! struct Position { x: f32, y: f32 }
//! impl Component for Position {}
//!
//! let mut world = World::new();
//! let entity = world.create_entity();
//! world.add_component(entity, Position { x: 1.0, y: 2.0 }).unwrap();
//!
//! for (_, position) in world.query::<&mut Position>() {
//!     position.x += 1.0;
//! }
//!
//! world.destroy_entity(entity).unwrap();
//! world.run_frame_barrier();
//! assert!(!world.is_alive(entity));
//! ```

// Allows `packed_ecs_macros` derives to resolve `::packed_ecs` from inside this crate.
extern crate self as packed_ecs;

pub mod ecs;
