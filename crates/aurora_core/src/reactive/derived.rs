//! Atom composition: read projections and write interceptors.

use super::{Atom, Subscription};
use std::sync::Arc;

/// Read-only projection over a base atom.
pub struct Derived<B, T> {
    base: Atom<B>,
    project: Arc<dyn Fn(&B) -> T + Send + Sync>,
}

impl<B, T> Clone for Derived<B, T> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            project: Arc::clone(&self.project),
        }
    }
}

impl<B: Clone + Send + 'static, T: 'static> Derived<B, T> {
    pub fn new(base: &Atom<B>, project: impl Fn(&B) -> T + Send + Sync + 'static) -> Self {
        Self {
            base: base.clone(),
            project: Arc::new(project),
        }
    }

    pub fn get(&self) -> T {
        self.base.with(|value| (self.project)(value))
    }

    /// Subscribes to the base atom, delivering projected values.
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let project = Arc::clone(&self.project);
        self.base.subscribe(move |value| listener(&project(value)))
    }
}

/// Base atom whose writes go through an interceptor.
///
/// Writers supply a `W`; the interceptor turns it into the next base value and
/// may perform side effects (persistence, normalization) before the base atom
/// commits and notifies.
pub struct WriteThrough<B, W> {
    base: Atom<B>,
    intercept: Arc<dyn Fn(W) -> B + Send + Sync>,
}

impl<B, W> Clone for WriteThrough<B, W> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            intercept: Arc::clone(&self.intercept),
        }
    }
}

impl<B: Clone + Send + 'static, W> WriteThrough<B, W> {
    pub fn new(base: Atom<B>, intercept: impl Fn(W) -> B + Send + Sync + 'static) -> Self {
        Self {
            base,
            intercept: Arc::new(intercept),
        }
    }

    pub fn get(&self) -> B {
        self.base.get()
    }

    pub fn with<R>(&self, read: impl FnOnce(&B) -> R) -> R {
        self.base.with(read)
    }

    /// Writes a literal next state.
    pub fn set(&self, input: W) {
        let intercept = &self.intercept;
        self.base.update(move |_| intercept(input));
    }

    /// Writes a next state computed from the committed one.
    pub fn update(&self, updater: impl FnOnce(&B) -> W) {
        let intercept = &self.intercept;
        self.base.update(move |current| intercept(updater(current)));
    }

    pub fn subscribe(&self, listener: impl Fn(&B) + Send + Sync + 'static) -> Subscription {
        self.base.subscribe(listener)
    }

    pub fn base(&self) -> &Atom<B> {
        &self.base
    }
}
