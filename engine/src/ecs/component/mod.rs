//! Component types and their process-wide identity.
//!
//! A component is any `'static` value attached to an entity. Each component type is registered
//! once in a [`Registry`], which hands out a dense [`Id`] derived from the type's
//! [`std::any::TypeId`]. That id is the key used to select the type's packed store, so two ids
//! compare equal exactly when they denote the same Rust type.
//!
//! [`Info`] carries what the type-erased storage needs to hold a type it knows nothing about at
//! compile time: the record layout and the drop glue.
//!
//! ```ignore
//! use packed_ecs::ecs::component::{Component, Registry};
//!
//! #[derive(Component)]
//! struct Position { x: f32, y: f32 }
//!
//! let registry = Registry::new();
//! let id = registry.register::<Position>();
//! assert_eq!(registry.get::<Position>(), Some(id));
//! ```

use std::{
    alloc::Layout,
    any::{self, TypeId},
    ptr::{self, NonNull},
};

mod registry;
mod set;

pub use registry::Registry;
pub use set::{Set, Target};

/// A component identifier: the dense numeric key of one component type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// Construct a new component Id from a raw u32 value.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the index of this component if it were to live in indexable storage (e.g. Vec)
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for Id {
    #[inline]
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

/// A trait representing a component in the ECS.
///
/// At present this only sets the required trait bounds for a type to be used as a component.
/// Prefer `#[derive(Component)]` over a manual impl.
pub trait Component: 'static + Sized + Send + Sync {}

/// Information about a registered component type.
#[derive(Debug, Clone, Copy)]
pub struct Info {
    /// The dense component ID.
    id: Id,

    /// The Rust TypeId of the component.
    type_id: TypeId,

    /// Type name, for diagnostics only.
    name: &'static str,

    /// The memory layout of one record.
    layout: Layout,

    /// The drop function for the component, might be a no-op.
    drop_fn: unsafe fn(NonNull<u8>),
}

impl Info {
    /// Construct component Info for type `C`. This will use type `C` to determine the record
    /// layout and, if the component needs drop, a drop function.
    pub fn new<C: Component>(id: Id) -> Self {
        let drop_fn = if std::mem::needs_drop::<C>() {
            Self::drop_impl::<C>
        } else {
            Self::drop_noop
        };
        Self {
            id,
            type_id: TypeId::of::<C>(),
            name: any::type_name::<C>(),
            layout: Layout::new::<C>(),
            drop_fn,
        }
    }

    /// Get the component ID for this type.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the TypeId for this type.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Get the Rust type name of the component.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Get the memory layout of one record.
    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Determine if this component is a zero-sized type.
    #[inline]
    pub fn is_zero_sized(&self) -> bool {
        self.layout.size() == 0
    }

    #[inline]
    pub fn drop_fn(&self) -> unsafe fn(NonNull<u8>) {
        self.drop_fn
    }

    /// Drop implementation for types that need drop.
    unsafe fn drop_impl<C>(ptr: NonNull<u8>) {
        // SAFETY: Caller ensures ptr points to a valid initialized C
        unsafe {
            ptr::drop_in_place(ptr.as_ptr() as *mut C);
        }
    }

    /// No-op drop for types that don't need drop.
    unsafe fn drop_noop(_ptr: NonNull<u8>) {}
}
