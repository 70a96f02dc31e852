//! Base observable cell.

use super::derived::Derived;
use super::listeners::ListenerSet;
use super::Subscription;
use std::fmt::{Debug, Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

static NEXT_ATOM_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique atom identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AtomId(u64);

impl Display for AtomId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "atom#{}", self.0)
    }
}

struct AtomCell<T> {
    id: AtomId,
    name: String,
    value: Mutex<T>,
    listeners: Arc<ListenerSet<T>>,
}

/// Named mutable cell that notifies subscribers on every write.
///
/// Cloning an `Atom` clones the handle, not the value: all clones observe and
/// mutate the same cell.
pub struct Atom<T> {
    cell: Arc<AtomCell<T>>,
}

impl<T> Clone for Atom<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<T: Clone + Send + 'static> Atom<T> {
    pub fn new(name: impl Into<String>, initial: T) -> Self {
        Self {
            cell: Arc::new(AtomCell {
                id: AtomId(NEXT_ATOM_ID.fetch_add(1, Ordering::Relaxed)),
                name: name.into(),
                value: Mutex::new(initial),
                listeners: ListenerSet::new(),
            }),
        }
    }

    pub fn id(&self) -> AtomId {
        self.cell.id
    }

    pub fn name(&self) -> &str {
        &self.cell.name
    }

    /// Returns a clone of the current value.
    pub fn get(&self) -> T {
        self.lock().clone()
    }

    /// Borrows the current value without cloning it.
    pub fn with<R>(&self, read: impl FnOnce(&T) -> R) -> R {
        read(&self.lock())
    }

    /// Replaces the value and notifies subscribers.
    pub fn set(&self, value: T) {
        self.update(move |_| value);
    }

    /// Computes the next value from the current one and commits it.
    ///
    /// `updater` runs while the value lock is held: it must not read or write
    /// this same atom.
    pub fn update(&self, updater: impl FnOnce(&T) -> T) {
        let next = {
            let mut guard = self.lock();
            let next = updater(&guard);
            *guard = next.clone();
            next
        };
        self.cell.listeners.notify(&next);
    }

    /// Like [`Atom::update`], but `updater` may decline by returning `None`.
    ///
    /// The decision and the commit happen under one lock acquisition, so a
    /// check-then-write cannot interleave with another writer. Returns whether
    /// a value was committed; subscribers run only in that case.
    pub fn try_update(&self, updater: impl FnOnce(&T) -> Option<T>) -> bool {
        let next = {
            let mut guard = self.lock();
            match updater(&guard) {
                Some(next) => {
                    *guard = next.clone();
                    next
                }
                None => return false,
            }
        };
        self.cell.listeners.notify(&next);
        true
    }

    /// Registers `listener` to run after every committed write.
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        self.cell.listeners.add(Arc::new(listener))
    }

    pub fn subscriber_count(&self) -> usize {
        self.cell.listeners.len()
    }

    /// Read-only projection of this atom.
    pub fn map<U: 'static>(
        &self,
        project: impl Fn(&T) -> U + Send + Sync + 'static,
    ) -> Derived<T, U> {
        Derived::new(self, project)
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.cell.value.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Debug> Debug for Atom<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("Atom");
        debug
            .field("id", &self.cell.id)
            .field("name", &self.cell.name);
        match self.cell.value.try_lock() {
            Ok(value) => debug.field("value", &*value),
            Err(_) => debug.field("value", &"<locked>"),
        };
        debug.finish()
    }
}
