//! Atoms mirrored to a storage key.

use super::{Atom, Subscription, WriteThrough};
use crate::storage::StorageAdapter;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Atom hydrated from, and written through to, one storage key.
///
/// # Invariants
/// - Initial value is the stored value when it parses, else the default.
/// - Every write commits in memory even when the storage write fails.
pub struct PersistedAtom<T> {
    key: &'static str,
    cell: WriteThrough<T, T>,
}

impl<T> Clone for PersistedAtom<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            cell: self.cell.clone(),
        }
    }
}

impl<T> PersistedAtom<T>
where
    T: Clone + Send + Serialize + DeserializeOwned + 'static,
{
    pub fn new(key: &'static str, default: T, storage: &StorageAdapter) -> Self {
        let initial = storage.load(key, default);
        let writer = storage.clone();
        let cell = WriteThrough::new(Atom::new(key, initial), move |next: T| {
            writer.save(key, &next);
            next
        });
        Self { key, cell }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn get(&self) -> T {
        self.cell.get()
    }

    pub fn set(&self, value: T) {
        self.cell.set(value);
    }

    pub fn update(&self, updater: impl FnOnce(&T) -> T) {
        self.cell.update(updater);
    }

    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        self.cell.subscribe(listener)
    }

    pub fn atom(&self) -> &Atom<T> {
        self.cell.base()
    }
}
