//! Domain stores and the registry that owns them.
//!
//! # Responsibility
//! - Declare every store once: storage key (or none), default, write contract.
//! - Build all stores together in a `StoreRegistry` handed to consumers by
//!   reference.
//!
//! # Invariants
//! - Every persisted store owns exactly one key; keys never collide.
//! - Session-scoped keys live in the session store; accessibility flags live
//!   in the long-lived store.
//! - RAM-only stores (messages, voice engine, session, search, UI flags)
//!   start from their default on every process start.

pub mod accessibility;
pub mod cart;
pub mod chat;
pub mod session;
pub mod ui;

use crate::api::{ApiClient, HttpTransport, SharedApiClient, Transport};
use crate::config::CoreConfig;
use crate::emotion::{EmotionClassifier, EmotionDirective, EmotionTableError};
use crate::events::EventBus;
use crate::i18n::{I18nError, Translator};
use crate::logging::{log_storefront_start, StartupSummary};
use crate::storage::{MemoryStorage, SqliteStorage, StorageAdapter};
use accessibility::{AccessibilityMode, AccessibilityStore};
use cart::CartStore;
use chat::ChatStore;
use log::{error, info};
use session::{SessionReadiness, SessionStore};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use ui::UiStore;

pub const CART_KEY: &str = "aurora_cart";
pub const CHAT_ID_KEY: &str = "aurora_chat_id";
pub const CHAT_OPEN_KEY: &str = "aurora_chat_open";
pub const CHAT_EMOTION_KEY: &str = "aurora_emotion";
pub const CHAT_EXPRESSION_KEY: &str = "aurora_expression";
pub const CHAT_MOTION_KEY: &str = "aurora_motion";
pub const CHAT_HAS_INTERACTED_KEY: &str = "aurora_has_interacted";

/// Keys written to the session-scoped store.
pub const SESSION_KEYS: &[&str] = &[
    CART_KEY,
    CHAT_ID_KEY,
    CHAT_OPEN_KEY,
    CHAT_EMOTION_KEY,
    CHAT_EXPRESSION_KEY,
    CHAT_MOTION_KEY,
    CHAT_HAS_INTERACTED_KEY,
];

/// Every key any store writes, across both storage scopes.
pub fn persisted_keys() -> Vec<&'static str> {
    SESSION_KEYS
        .iter()
        .copied()
        .chain(AccessibilityMode::ALL.iter().map(|mode| mode.storage_key()))
        .collect()
}

/// Errors building the registry from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapError {
    Translations(I18nError),
    EmotionTable(EmotionTableError),
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Translations(err) => write!(f, "failed to load translations: {err}"),
            Self::EmotionTable(err) => write!(f, "failed to load emotion table: {err}"),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Translations(err) => Some(err),
            Self::EmotionTable(err) => Some(err),
        }
    }
}

impl From<I18nError> for BootstrapError {
    fn from(value: I18nError) -> Self {
        Self::Translations(value)
    }
}

impl From<EmotionTableError> for BootstrapError {
    fn from(value: EmotionTableError) -> Self {
        Self::EmotionTable(value)
    }
}

/// The one set of store handles for a process.
///
/// Construct once at startup and pass by reference; handles inside are cheap
/// clones of shared cells.
#[derive(Clone)]
pub struct StoreRegistry {
    cart: CartStore,
    session: SessionStore,
    chat: ChatStore,
    ui: UiStore,
    accessibility: AccessibilityStore,
    bus: EventBus,
    translator: Arc<Translator>,
    classifier: Arc<EmotionClassifier>,
    api: Option<Arc<SharedApiClient>>,
}

impl StoreRegistry {
    /// Builds every store, hydrating persisted ones from the given storage.
    pub fn new(
        session_storage: &StorageAdapter,
        persistent_storage: &StorageAdapter,
        translator: Arc<Translator>,
        classifier: Arc<EmotionClassifier>,
    ) -> Self {
        debug_assert!(
            keys_are_unique(&persisted_keys()),
            "persisted store keys must be unique"
        );

        let bus = EventBus::new();
        let ui = UiStore::new(translator.default_locale());
        let accessibility = AccessibilityStore::new(
            persistent_storage,
            &bus,
            Arc::clone(&translator),
            ui.locale_atom().clone(),
        );

        info!(
            "event=registry_init module=stores status=ok session_scope={} persistent_scope={}",
            session_storage.scope(),
            persistent_storage.scope()
        );

        Self {
            cart: CartStore::new(session_storage, &bus),
            session: SessionStore::new(&bus),
            chat: ChatStore::new(session_storage),
            ui,
            accessibility,
            bus,
            translator,
            classifier,
            api: None,
        }
    }

    /// Attaches the backend used by [`StoreRegistry::check_session`].
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.api = Some(Arc::new(ApiClient::new(transport)));
        self
    }

    /// Builds the registry from configuration with bundled dictionaries and
    /// emotion table.
    ///
    /// The session scope is a fresh in-memory store bounded by
    /// `session_quota_bytes`, so session-persisted keys (cart, chat) start
    /// empty on every call. Hosts that keep a session store across restarts
    /// use [`StoreRegistry::bootstrap_with_session_storage`].
    ///
    /// An unopenable persistent database degrades to an in-memory one; storage
    /// problems never fail startup.
    pub fn bootstrap(config: &CoreConfig) -> Result<Self, BootstrapError> {
        let session_storage = StorageAdapter::new(Arc::new(MemoryStorage::with_quota(
            config.session_quota_bytes,
        )));
        Self::bootstrap_with_session_storage(config, &session_storage)
    }

    /// Like [`StoreRegistry::bootstrap`], hydrating session-scoped stores
    /// from a host-provided backend.
    pub fn bootstrap_with_session_storage(
        config: &CoreConfig,
        session_storage: &StorageAdapter,
    ) -> Result<Self, BootstrapError> {
        let translator = Translator::builtin_with_default(&config.default_locale)?;
        let classifier = EmotionClassifier::builtin()?;
        let (persistent_storage, persistent_store) = open_persistent_storage(config);

        let mut registry = Self::new(
            session_storage,
            &persistent_storage,
            Arc::new(translator),
            Arc::new(classifier),
        );
        if let Some(transport) = connect_api(config) {
            registry = registry.with_transport(transport);
        }

        log_storefront_start(&StartupSummary {
            locale: config.default_locale.clone(),
            persistent_store,
            api_configured: registry.api.is_some(),
            session_quota_bytes: config.session_quota_bytes,
        });
        Ok(registry)
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn chat(&self) -> &ChatStore {
        &self.chat
    }

    pub fn ui(&self) -> &UiStore {
        &self.ui
    }

    pub fn accessibility(&self) -> &AccessibilityStore {
        &self.accessibility
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn classifier(&self) -> &EmotionClassifier {
        &self.classifier
    }

    /// Resolves `key` in the active UI locale.
    pub fn translate(&self, key: &str) -> String {
        self.translator.resolve(key, &self.ui.locale())
    }

    pub fn api(&self) -> Option<&SharedApiClient> {
        self.api.as_deref()
    }

    /// Resolves session readiness for this process start.
    ///
    /// With an API client the profile endpoint decides; without one the
    /// session settles as unauthenticated. Blocks on the network, so callers
    /// on a UI thread must dispatch it elsewhere.
    pub fn check_session(&self) -> SessionReadiness {
        match self.api() {
            Some(client) => self.session.check_with(client),
            None => {
                if self.session.begin_check() == SessionReadiness::Unknown {
                    info!("event=session_check module=stores status=offline reason=no_api_client");
                    self.session.complete_check(None);
                }
                self.session.readiness()
            }
        }
    }

    /// Chat pipeline entry point for one assistant turn.
    pub fn receive_assistant_reply(&self, text: impl Into<String>) -> EmotionDirective {
        self.chat.receive_assistant_reply(text, &self.classifier)
    }
}

fn open_persistent_storage(config: &CoreConfig) -> (StorageAdapter, &'static str) {
    let (opened, kind) = match &config.persistent_db_path {
        Some(path) => (SqliteStorage::open(path), "sqlite_file"),
        None => (SqliteStorage::in_memory(), "sqlite_memory"),
    };
    match opened {
        Ok(storage) => (StorageAdapter::new(Arc::new(storage)), kind),
        Err(err) => {
            error!(
                "event=registry_init module=stores status=degraded error_code=persistent_storage_unavailable error={}",
                err
            );
            (
                StorageAdapter::new(Arc::new(MemoryStorage::new())),
                "memory_fallback",
            )
        }
    }
}

fn connect_api(config: &CoreConfig) -> Option<Arc<dyn Transport>> {
    let base_url = config.api_base_url.as_deref()?;
    match HttpTransport::new(base_url) {
        Ok(transport) => {
            let transport: Arc<dyn Transport> = Arc::new(transport);
            Some(transport)
        }
        Err(err) => {
            error!(
                "event=registry_init module=stores status=degraded error_code=api_unavailable reason={}",
                err.code()
            );
            None
        }
    }
}

fn keys_are_unique(keys: &[&str]) -> bool {
    let mut sorted = keys.to_vec();
    sorted.sort_unstable();
    sorted.windows(2).all(|pair| pair[0] != pair[1])
}
