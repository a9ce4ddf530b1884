use std::{
    alloc::Layout,
    any::TypeId,
    marker::PhantomData,
    ptr::NonNull,
};

use crate::ecs::component::{self, Component};

/// A shared view of one record slot in a [`RawStore`](super::RawStore).
///
/// `Cell` is `Copy` because it stands in for a shared reference. The record type is only known
/// when the cell is read, so every read names the component type; debug builds check that the
/// name matches the store.
///
/// ```ignore
/// let position: &Position = store.at(slot).as_ref::<Position>();
/// ```
#[derive(Debug, Copy, Clone)]
pub struct Cell<'a> {
    ptr: NonNull<u8>,

    #[cfg(debug_assertions)]
    info: &'a component::Info,

    _marker: PhantomData<&'a ()>,
}

impl<'a> Cell<'a> {
    /// Construct a cell over a slot pointer of a store holding `info` records.
    #[inline]
    pub(crate) fn new(ptr: NonNull<u8>, #[allow(unused_variables)] info: &'a component::Info) -> Self {
        Self {
            ptr,
            #[cfg(debug_assertions)]
            info,
            _marker: PhantomData,
        }
    }

    /// Pointer to the first byte of the record.
    #[inline]
    pub fn as_ptr(&self) -> NonNull<u8> {
        self.ptr
    }

    /// Read the record as a `C`.
    ///
    /// # Panics
    /// In debug builds, if `C` is not the store's component type.
    #[inline]
    pub fn as_ref<C: Component>(&self) -> &'a C {
        #[cfg(debug_assertions)]
        ensure_type::<C>(self.info);

        // SAFETY: the cell points at an initialized, aligned record of the store's type.
        unsafe { self.ptr.cast::<C>().as_ref() }
    }
}

/// An exclusive view of one record slot. Not `Copy`: it stands in for `&mut`, and turning it into
/// a reference consumes it.
#[derive(Debug)]
pub struct CellMut<'a> {
    ptr: NonNull<u8>,

    #[cfg(debug_assertions)]
    info: &'a component::Info,

    _marker: PhantomData<&'a mut ()>,
}

impl<'a> CellMut<'a> {
    #[inline]
    pub(crate) fn new(ptr: NonNull<u8>, #[allow(unused_variables)] info: &'a component::Info) -> Self {
        Self {
            ptr,
            #[cfg(debug_assertions)]
            info,
            _marker: PhantomData,
        }
    }

    /// Pointer to the first byte of the record.
    #[inline]
    pub fn as_ptr(&self) -> NonNull<u8> {
        self.ptr
    }

    /// Turn the cell into a mutable reference to the record as a `C`.
    ///
    /// # Panics
    /// In debug builds, if `C` is not the store's component type.
    #[inline]
    pub fn into_mut<C: Component>(self) -> &'a mut C {
        #[cfg(debug_assertions)]
        ensure_type::<C>(self.info);

        // SAFETY: the cell points at an initialized, aligned record of the store's type and was
        // created from an exclusive borrow, which this call consumes.
        unsafe { self.ptr.cast::<C>().as_mut() }
    }
}

/// Check that `C` is the type a store with `info` was built for.
#[inline]
pub fn ensure_type<C: Component>(info: &component::Info) {
    debug_assert!(
        TypeId::of::<C>() == info.type_id(),
        "type mismatch: `{}` used with a store of `{}`",
        std::any::type_name::<C>(),
        info.name()
    );
    debug_assert!(
        Layout::new::<C>() == info.layout(),
        "component layout does not match store layout"
    );
}

/// Whether `C` is the type a store with `info` was built for.
#[inline]
pub fn is_type<C: Component>(info: &component::Info) -> bool {
    TypeId::of::<C>() == info.type_id()
}
