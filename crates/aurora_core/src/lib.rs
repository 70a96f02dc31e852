//! Client core for the Aurora storefront.
//! This crate is the single source of truth for UI state invariants: stores,
//! persistence, translation and avatar emotion.

pub mod api;
pub mod config;
pub mod db;
pub mod emotion;
pub mod events;
pub mod i18n;
pub mod logging;
pub mod reactive;
pub mod storage;
pub mod stores;
pub mod validation;

pub use api::{
    ApiClient, ApiError, HttpTransport, Page, PageRequest, Profile, SharedApiClient, Transport,
};
pub use config::{ConfigError, CoreConfig};
pub use emotion::{EmotionClassifier, EmotionDirective, EmotionEntry};
pub use events::{EventBus, Topic, UiEvent};
pub use i18n::{Translator, DEFAULT_LOCALE};
pub use logging::{
    active_settings, default_log_level, init_logging, init_logging_from_config, LogSettings,
    LoggingError,
};
pub use reactive::{Atom, Derived, PersistedAtom, Subscription, WriteThrough};
pub use storage::{
    MemoryStorage, SqliteStorage, StorageAdapter, StorageBackend, StorageError,
    UnavailableStorage,
};
pub use stores::accessibility::AccessibilityMode;
pub use stores::cart::{Cart, CartItem};
pub use stores::session::{AuthGuard, GateDecision, SessionReadiness, SessionState};
pub use stores::{BootstrapError, StoreRegistry};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
