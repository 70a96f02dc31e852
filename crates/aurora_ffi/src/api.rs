//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Own the process-wide `StoreRegistry` behind `init_storefront`.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Store-backed calls before `init_storefront` fail with a message instead
//!   of creating a registry implicitly.

use aurora_core::{
    core_version as core_version_inner, init_logging as init_logging_inner,
    init_logging_from_config, ping as ping_inner, AccessibilityMode, CartItem, CoreConfig, EmotionClassifier, EmotionDirective, Profile,
    StoreRegistry,
};
use log::{info, warn};
use std::sync::OnceLock;

static REGISTRY: OnceLock<StoreRegistry> = OnceLock::new();
static FALLBACK_CLASSIFIER: OnceLock<Option<EmotionClassifier>> = OnceLock::new();

const NOT_INITIALIZED: &str = "storefront not initialized; call init_storefront first";

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Builds the store registry from a JSON `CoreConfig` document.
///
/// # FFI contract
/// - Config is parsed and validated on every call.
/// - When the config names `log_dir`, file logging starts before the stores
///   are built; a logging conflict fails the call.
/// - The first successful call wins; later valid calls are no-ops.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_storefront(config_json: String) -> String {
    let config = match CoreConfig::from_json_str(&config_json) {
        Ok(config) => config,
        Err(err) => return format!("init_storefront failed: {err}"),
    };
    if let Err(err) = init_logging_from_config(&config) {
        return format!("init_storefront failed: {err}");
    }
    if REGISTRY.get().is_some() {
        info!("event=storefront_init module=ffi status=ignored reason=already_initialized");
        return String::new();
    }
    match StoreRegistry::bootstrap(&config) {
        Ok(registry) => {
            // A concurrent winner is equivalent; drop ours.
            let _ = REGISTRY.set(registry);
            info!("event=storefront_init module=ffi status=ok");
            String::new()
        }
        Err(err) => {
            warn!("event=storefront_init module=ffi status=error error={err}");
            format!("init_storefront failed: {err}")
        }
    }
}

/// Avatar directive envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmotionResponse {
    pub emotion: String,
    pub expression: String,
    pub motion: String,
}

impl From<EmotionDirective> for EmotionResponse {
    fn from(directive: EmotionDirective) -> Self {
        Self {
            emotion: directive.emotion,
            expression: directive.expression,
            motion: directive.motion,
        }
    }
}

/// Cart state envelope returned by every cart call.
#[derive(Debug, Clone, PartialEq)]
pub struct CartResponse {
    pub ok: bool,
    pub item_count: u32,
    pub subtotal: f64,
    /// Cart serialized as `{"items":[...]}`; empty on failure.
    pub cart_json: String,
    pub message: String,
}

impl CartResponse {
    fn from_registry(registry: &StoreRegistry, message: impl Into<String>) -> Self {
        let cart = registry.cart().get();
        match serde_json::to_string(&cart) {
            Ok(cart_json) => Self {
                ok: true,
                item_count: cart.item_count(),
                subtotal: cart.subtotal(),
                cart_json,
                message: message.into(),
            },
            Err(err) => Self::failure(format!("cart encode failed: {err}")),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            item_count: 0,
            subtotal: 0.0,
            cart_json: String::new(),
            message: message.into(),
        }
    }
}

/// Generic toggle envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleResponse {
    pub ok: bool,
    pub enabled: bool,
    pub message: String,
}

/// Resolves `key` for `locale`, or for the active UI locale when `None`.
///
/// Returns the key verbatim on a miss or before initialization.
#[flutter_rust_bridge::frb(sync)]
pub fn translate(key: String, locale: Option<String>) -> String {
    let Some(registry) = REGISTRY.get() else {
        return key;
    };
    match locale {
        Some(locale) => registry.translator().resolve(&key, &locale),
        None => registry.translate(&key),
    }
}

/// Changes the active UI locale; returns the normalized locale.
#[flutter_rust_bridge::frb(sync)]
pub fn set_locale(locale: String) -> String {
    match REGISTRY.get() {
        Some(registry) => {
            registry.ui().set_locale(&locale);
            registry.ui().locale()
        }
        None => String::new(),
    }
}

/// Classifies text without touching chat state.
///
/// Works before initialization using the bundled emotion table.
#[flutter_rust_bridge::frb(sync)]
pub fn classify_emotion(text: String) -> EmotionResponse {
    if let Some(registry) = REGISTRY.get() {
        return registry.classifier().classify(&text).into();
    }
    let fallback = FALLBACK_CLASSIFIER.get_or_init(|| EmotionClassifier::builtin().ok());
    match fallback {
        Some(classifier) => classifier.classify(&text).into(),
        None => EmotionDirective::neutral().into(),
    }
}

/// Records an assistant reply and returns the avatar directive it produced.
#[flutter_rust_bridge::frb(sync)]
pub fn chat_receive_reply(text: String) -> EmotionResponse {
    match REGISTRY.get() {
        Some(registry) => registry.receive_assistant_reply(text).into(),
        None => EmotionDirective::neutral().into(),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn chat_set_open(open: bool) -> ToggleResponse {
    with_registry(|registry| {
        if open {
            registry.chat().open();
        } else {
            registry.chat().close();
        }
        ToggleResponse {
            ok: true,
            enabled: registry.chat().is_open(),
            message: String::new(),
        }
    })
    .unwrap_or_else(toggle_failure)
}

#[flutter_rust_bridge::frb(sync)]
pub fn cart_snapshot() -> CartResponse {
    with_registry(|registry| CartResponse::from_registry(registry, ""))
        .unwrap_or_else(CartResponse::failure)
}

#[flutter_rust_bridge::frb(sync)]
pub fn cart_add_item(
    product_id: String,
    title: String,
    price: f64,
    quantity: u32,
) -> CartResponse {
    if product_id.trim().is_empty() {
        return CartResponse::failure("cart_add_item failed: product_id must not be empty");
    }
    if !price.is_finite() || price < 0.0 {
        return CartResponse::failure("cart_add_item failed: price must be a non-negative number");
    }
    with_registry(|registry| {
        registry.cart().add_item(CartItem::new(
            product_id.trim(),
            title.trim(),
            price,
            quantity,
        ));
        CartResponse::from_registry(registry, "Item added.")
    })
    .unwrap_or_else(CartResponse::failure)
}

#[flutter_rust_bridge::frb(sync)]
pub fn cart_set_quantity(product_id: String, quantity: u32) -> CartResponse {
    with_registry(|registry| {
        registry.cart().set_quantity(product_id.trim(), quantity);
        CartResponse::from_registry(registry, "Quantity updated.")
    })
    .unwrap_or_else(CartResponse::failure)
}

#[flutter_rust_bridge::frb(sync)]
pub fn cart_remove_item(product_id: String) -> CartResponse {
    with_registry(|registry| {
        registry.cart().remove_item(product_id.trim());
        CartResponse::from_registry(registry, "Item removed.")
    })
    .unwrap_or_else(CartResponse::failure)
}

#[flutter_rust_bridge::frb(sync)]
pub fn cart_clear() -> CartResponse {
    with_registry(|registry| {
        registry.cart().clear();
        CartResponse::from_registry(registry, "Cart cleared.")
    })
    .unwrap_or_else(CartResponse::failure)
}

/// Flips an accessibility mode by name (`aaa|epilepsy|dyslexia|adhd|low-vision`).
#[flutter_rust_bridge::frb(sync)]
pub fn a11y_toggle(mode: String) -> ToggleResponse {
    let Some(parsed) = AccessibilityMode::parse(&mode) else {
        return toggle_failure(format!("a11y_toggle failed: unknown mode `{mode}`"));
    };
    with_registry(|registry| {
        let enabled = registry.accessibility().toggle(parsed);
        ToggleResponse {
            ok: true,
            enabled,
            message: registry.translate(parsed.label_key()),
        }
    })
    .unwrap_or_else(toggle_failure)
}

/// Completes the startup session check.
///
/// `profile_json` is the backend profile document, or `None` when the check
/// found no session. Returns the resulting readiness label.
#[flutter_rust_bridge::frb(sync)]
pub fn session_complete_check(profile_json: Option<String>) -> String {
    let parsed = profile_json
        .as_deref()
        .map(|json| serde_json::from_str::<Profile>(json));
    let outcome = match parsed {
        None => None,
        Some(Ok(profile)) => Some(profile),
        Some(Err(err)) => {
            warn!("event=session_check module=ffi status=invalid_profile error={err}");
            None
        }
    };
    with_registry(|registry| {
        registry.session().complete_check(outcome);
        registry.session().readiness().as_str().to_string()
    })
    .unwrap_or_else(|message| message)
}

/// Runs the startup session check against the configured backend.
///
/// Without `api_base_url` the session settles as unauthenticated. Returns the
/// readiness label, or an error message before `init_storefront`.
///
/// # FFI contract
/// - Async on the Dart side: the profile request blocks a worker thread.
pub fn session_check() -> String {
    with_registry(|registry| registry.check_session().as_str().to_string())
        .unwrap_or_else(|message| message)
}

fn with_registry<R>(f: impl FnOnce(&StoreRegistry) -> R) -> Result<R, String> {
    REGISTRY
        .get()
        .map(f)
        .ok_or_else(|| NOT_INITIALIZED.to_string())
}

fn toggle_failure(message: String) -> ToggleResponse {
    ToggleResponse {
        ok: false,
        enabled: false,
        message,
    }
}
