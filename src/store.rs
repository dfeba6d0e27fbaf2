//! Generic in-memory entity store
//!
//! A concurrent keyed container with two write primitives: a pairwise
//! mutation that updates exactly two entities atomically, and a transaction
//! that groups several such mutations into one unit. Point operations
//! (`get`, `list`, `count`, `insert`) go straight to the concurrent map and
//! never wait on writers; cross-entity writes serialize on a single
//! reentrant lock, so no lock-ordering discipline is needed anywhere.

use std::fmt;
use std::hash::Hash;

use dashmap::DashMap;
use parking_lot::ReentrantMutex;

/// A record that can live in a [`MemStore`], addressed by a unique key.
pub trait Entity {
    type Id: Eq + Hash + Clone + fmt::Debug + fmt::Display;

    fn id(&self) -> Self::Id;
}

/// Failures surfaced by the store itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError<K> {
    #[error("no entity with id {0}")]
    NotFound(K),

    #[error("pair lock requires two distinct ids, got {0} twice")]
    AliasedPair(K),
}

/// Concurrent map from id to entity.
///
/// Reads hand out detached copies (safe to mutate, never written back), so
/// `E: Clone` plays the role the store's copy contract requires. The write
/// side works copy-on-write as well: a pair mutation edits working copies
/// and publishes them back whole, one entity at a time, meaning a concurrent
/// `get` can observe the pair half-applied but always sees each single
/// entity in a consistent state.
pub struct MemStore<E: Entity> {
    map: DashMap<E::Id, E>,
    write_lock: ReentrantMutex<()>,
}

impl<E: Entity> Default for MemStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> MemStore<E> {
    pub fn new() -> Self {
        Self {
            map: DashMap::new(),
            write_lock: ReentrantMutex::new(()),
        }
    }

    pub fn count(&self) -> usize {
        self.map.len()
    }

    /// Insert the entity under its id, keeping the existing entry if the id
    /// is already present. Insert-if-absent, not upsert: the call never
    /// overwrites and never reports that the id was taken.
    pub fn insert(&self, entity: E) {
        self.map.entry(entity.id()).or_insert(entity);
    }

    /// Run `block` inside the global write critical section.
    ///
    /// Reentrant: a caller already inside the critical section (a transfer
    /// issued from within a transaction, say) re-enters without deadlocking.
    /// The block's result is returned as-is, failures included.
    pub fn in_transaction<T>(&self, block: impl FnOnce() -> T) -> T {
        let _write = self.write_lock.lock();
        block()
    }
}

impl<E: Entity + Clone> MemStore<E> {
    /// Fetch a detached copy of the entity, if present.
    pub fn get(&self, id: &E::Id) -> Option<E> {
        self.map.get(id).map(|entry| entry.value().clone())
    }

    /// Detached copies of every stored entity, in no particular order.
    pub fn list(&self) -> Vec<E> {
        self.map.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Mutate two entities as one atomic unit with respect to all other
    /// writers that go through the critical section.
    ///
    /// The mutator receives exclusive handles to working copies of both
    /// entities, valid only for its duration. If it succeeds, both copies
    /// are published back to the map; if it fails, neither is, and the
    /// store is untouched.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] (naming the first missing id) if either
    /// lookup fails, [`StoreError::AliasedPair`] if both ids are equal, and
    /// whatever the mutator itself returns.
    pub fn with_locked_pair<T, Err, F>(&self, a: E::Id, b: E::Id, mutate: F) -> Result<T, Err>
    where
        F: FnOnce(&mut E, &mut E) -> Result<T, Err>,
        Err: From<StoreError<E::Id>>,
    {
        if a == b {
            return Err(StoreError::AliasedPair(a).into());
        }

        let _write = self.write_lock.lock();

        let mut first = self
            .get(&a)
            .ok_or_else(|| StoreError::NotFound(a.clone()))?;
        let mut second = self
            .get(&b)
            .ok_or_else(|| StoreError::NotFound(b.clone()))?;

        let out = mutate(&mut first, &mut second)?;

        self.map.insert(a, first);
        self.map.insert(b, second);
        Ok(out)
    }
}
