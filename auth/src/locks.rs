//! Per-resource locks for check-then-mutate sequences.
//!
//! A caller names every resource it is about to check and mutate, and gets all of them or
//! waits. Ids are taken in sorted order and granted together under one mutex, so two
//! callers locking the same pair in opposite orders can not deadlock.

use std::collections::HashSet;

use ideaboard_db::object_id::ResourceId;
use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
pub struct ResourceLocks {
    held: Mutex<HashSet<ResourceId>>,
    released: Condvar,
}

/// Holds the locks on a set of resources until dropped.
#[must_use = "the resources are unlocked as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ResourceGuard<'a> {
    locks: &'a ResourceLocks,
    ids: Vec<ResourceId>,
}

impl ResourceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self, id: ResourceId) -> ResourceGuard<'_> {
        self.lock_all(vec![id])
    }

    /// Lock two resources. Locking the same id twice takes a single lock.
    pub fn lock_pair(&self, a: ResourceId, b: ResourceId) -> ResourceGuard<'_> {
        self.lock_all(vec![a, b])
    }

    fn lock_all(&self, mut ids: Vec<ResourceId>) -> ResourceGuard<'_> {
        ids.sort();
        ids.dedup();

        let mut held = self.held.lock();
        while ids.iter().any(|id| held.contains(id)) {
            self.released.wait(&mut held);
        }
        held.extend(ids.iter().copied());

        ResourceGuard { locks: self, ids }
    }

    /// True if any caller currently holds the lock on `id`.
    pub fn is_locked(&self, id: ResourceId) -> bool {
        self.held.lock().contains(&id)
    }
}

impl<'a> ResourceGuard<'a> {
    pub fn ids(&self) -> &[ResourceId] {
        &self.ids
    }
}

impl<'a> Drop for ResourceGuard<'a> {
    fn drop(&mut self) {
        let mut held = self.locks.held.lock();
        for id in &self.ids {
            held.remove(id);
        }
        drop(held);
        self.locks.released.notify_all();
    }
}
