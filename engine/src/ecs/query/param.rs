//! Join parameters.
//!
//! - **[`Parameter`]**: one component access, `&C` or `&mut C`.
//! - **[`Data`]**: a whole join, either one parameter or a tuple of them. The first element of a
//!   tuple is the primary component the join walks; the others are required filters.

use std::any::{self, TypeId};

use crate::{
    all_tuples,
    ecs::{
        component::{self, Component},
        storage::{CellMut, RawStore, Store},
    },
};

/// How one parameter of a join touches its component store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    /// Rust type of the component.
    pub type_id: TypeId,
    /// Type name, for diagnostics.
    pub name: &'static str,
    /// The component id, `None` if the type was never registered.
    pub id: Option<component::Id>,
}

/// A single component access inside a join.
pub trait Parameter: Sized {
    /// The component type accessed.
    type Component: Component;

    /// What the join yields for this parameter.
    type Value<'w>;

    /// Describe this access, looking its component id up without registering it.
    fn access(registry: &component::Registry) -> Access {
        Access {
            type_id: TypeId::of::<Self::Component>(),
            name: any::type_name::<Self::Component>(),
            id: registry.get::<Self::Component>(),
        }
    }

    /// Fetch the value at `slot` of `store`.
    ///
    /// # Safety
    /// - `store` holds records of `Self::Component` and `slot < store.len()`.
    /// - For a mutable access, nothing else may reference the record for `'w`.
    unsafe fn fetch<'w>(store: &'w RawStore, slot: usize) -> Self::Value<'w>;
}

impl<C: Component> Parameter for &C {
    type Component = C;
    type Value<'w> = &'w C;

    #[inline]
    unsafe fn fetch<'w>(store: &'w RawStore, slot: usize) -> Self::Value<'w> {
        store.at(slot).as_ref::<C>()
    }
}

impl<C: Component> Parameter for &mut C {
    type Component = C;
    type Value<'w> = &'w mut C;

    #[inline]
    unsafe fn fetch<'w>(store: &'w RawStore, slot: usize) -> Self::Value<'w> {
        // The record lives in the store's heap buffer, not in the `RawStore` value itself, and
        // the caller guarantees it is not referenced elsewhere.
        CellMut::new(store.slot_ptr(slot), store.info()).into_mut::<C>()
    }
}

/// A complete join: a single [`Parameter`] or a tuple of them.
pub trait Data {
    /// What the join yields per matching entity.
    type Item<'w>;

    /// Append one [`Access`] per parameter, in declaration order.
    fn accesses(registry: &component::Registry, out: &mut Vec<Access>);

    /// Fetch the item for one entity from its slot in each store.
    ///
    /// # Safety
    /// - `stores[i]` is the store of the i-th parameter and `slots[i]` a slot in it.
    /// - No two parameters name the same component type.
    /// - Mutable records are not referenced elsewhere for `'w`.
    unsafe fn fetch<'w>(stores: &[&'w Store], slots: &[usize]) -> Self::Item<'w>;
}

impl<P: Parameter> Data for P {
    type Item<'w> = P::Value<'w>;

    fn accesses(registry: &component::Registry, out: &mut Vec<Access>) {
        out.push(P::access(registry));
    }

    #[inline]
    unsafe fn fetch<'w>(stores: &[&'w Store], slots: &[usize]) -> Self::Item<'w> {
        // SAFETY: forwarded from the caller.
        unsafe { <P as Parameter>::fetch(stores[0].data(), slots[0]) }
    }
}

macro_rules! tuple_data {
    ($($name: ident),*) => {
        impl<$($name: Parameter),*> Data for ($($name,)*) {
            type Item<'w> = ($(<$name as Parameter>::Value<'w>,)*);

            fn accesses(registry: &component::Registry, out: &mut Vec<Access>) {
                $(out.push(<$name as Parameter>::access(registry));)*
            }

            #[inline]
            #[allow(unused_assignments)]
            unsafe fn fetch<'w>(stores: &[&'w Store], slots: &[usize]) -> Self::Item<'w> {
                let mut i = 0;
                ($({
                    // SAFETY: forwarded from the caller, one store and slot per parameter.
                    let value = unsafe { <$name as Parameter>::fetch(stores[i].data(), slots[i]) };
                    i += 1;
                    value
                },)*)
            }
        }
    }
}

all_tuples!(tuple_data);
