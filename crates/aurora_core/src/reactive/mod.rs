//! Observable state cells.
//!
//! # Responsibility
//! - Provide the atom primitive every domain store is built from.
//! - Compose atoms into read projections (`Derived`) and write interceptors
//!   (`WriteThrough`, `PersistedAtom`).
//!
//! # Invariants
//! - A read returns the most recently committed value.
//! - A write notifies every current subscriber, in registration order, before
//!   returning; subscribers observe the committed value.
//! - Updater functions run under the atom's value lock, so writes to one atom
//!   never interleave.

mod atom;
mod derived;
mod listeners;
mod persisted;

pub use atom::{Atom, AtomId};
pub use derived::{Derived, WriteThrough};
pub use listeners::Subscription;
pub use persisted::PersistedAtom;

pub(crate) use listeners::ListenerSet;
