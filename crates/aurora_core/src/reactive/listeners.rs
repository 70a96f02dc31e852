//! Ordered listener registry shared by atoms and the event bus.

use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub(crate) type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Listeners in registration order.
pub(crate) struct ListenerSet<E: ?Sized> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, Listener<E>)>>,
}

impl<E: ?Sized + 'static> ListenerSet<E> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicU64::new(1),
            entries: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn add(self: &Arc<Self>, listener: Listener<E>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().push((id, listener));

        let set = Arc::downgrade(self);
        Subscription::new(move || {
            if let Some(set) = set.upgrade() {
                set.remove(id);
            }
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    /// Invokes every listener registered at call time.
    ///
    /// The registry lock is released before listeners run, so a listener may
    /// subscribe, unsubscribe or write to the owning atom.
    pub(crate) fn notify(&self, value: &E) {
        let snapshot: Vec<Listener<E>> = self
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(value);
        }
    }

    fn remove(&self, id: u64) {
        self.lock().retain(|(entry_id, _)| *entry_id != id);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(u64, Listener<E>)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle returned by every `subscribe` call.
///
/// Dropping the handle keeps the listener registered; call
/// [`Subscription::unsubscribe`] to detach it.
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub(crate) fn new(detach: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Detaches the listener. Safe to call after the source is gone.
    pub fn unsubscribe(mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}
