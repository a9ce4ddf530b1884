use std::{
    any::TypeId,
    sync::atomic::{AtomicU32, Ordering},
    sync::{PoisonError, RwLock},
};

use dashmap::DashMap;

use crate::ecs::component::{Component, Id, Info};

/// Maps Rust types to dense component ids and keeps the [`Info`] needed to store each type
/// type-erased.
///
/// Lookups from `TypeId` go through a `DashMap`, so the read path takes no global lock. Only
/// registering a new type takes a write lock on the info table, which happens once per type.
///
/// The registry can be shared by reference between worlds that need to agree on ids; nothing else
/// in the crate requires it to be `Sync`.
pub struct Registry {
    /// TypeId to component id.
    type_map: DashMap<TypeId, Id>,

    /// Info per component id, indexed by `Id::index`.
    infos: RwLock<Vec<Option<Info>>>,

    /// Next id to hand out.
    next_id: AtomicU32,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create an empty component registry.
    #[inline]
    pub fn new() -> Self {
        Self {
            type_map: DashMap::new(),
            infos: RwLock::new(Vec::new()),
            next_id: AtomicU32::new(0),
        }
    }

    /// Register `C` and return its id. Registering an already known type returns the id it was
    /// given the first time.
    pub fn register<C: Component>(&self) -> Id {
        let type_id = TypeId::of::<C>();

        if let Some(id) = self.type_map.get(&type_id) {
            return *id;
        }

        // The entry holds the shard lock, so two racing registrations of `C` agree on one id.
        *self
            .type_map
            .entry(type_id)
            .or_insert_with(|| {
                let id = Id::new(self.next_id.fetch_add(1, Ordering::Relaxed));
                let mut infos = self.infos.write().unwrap_or_else(PoisonError::into_inner);
                if id.index() >= infos.len() {
                    infos.resize(id.index() + 1, None);
                }
                infos[id.index()] = Some(Info::new::<C>(id));
                log::trace!("registered component {} as {:?}", std::any::type_name::<C>(), id);
                id
            })
            .value()
    }

    /// Get the id of `C`, if it has been registered.
    #[inline]
    pub fn get<C: Component>(&self) -> Option<Id> {
        self.type_map
            .get(&TypeId::of::<C>())
            .map(|entry| *entry.value())
    }

    /// Get the info of a registered component id.
    #[inline]
    pub fn info(&self, id: Id) -> Option<Info> {
        let infos = self.infos.read().unwrap_or_else(PoisonError::into_inner);
        infos.get(id.index()).copied().flatten()
    }

    /// Get the info of `C`, if it has been registered.
    #[inline]
    pub fn info_of<C: Component>(&self) -> Option<Info> {
        self.info(self.get::<C>()?)
    }

    /// Number of registered component types.
    #[inline]
    pub fn len(&self) -> usize {
        self.type_map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.type_map.is_empty()
    }
}
