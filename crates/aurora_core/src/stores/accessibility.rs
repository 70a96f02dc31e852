//! Accessibility mode flags in the long-lived store.
//!
//! # Invariants
//! - Each mode owns exactly one `mode-<name>` key.
//! - Every change publishes one announcement in the active locale.

use crate::events::EventBus;
use crate::i18n::Translator;
use crate::reactive::{Atom, PersistedAtom, Subscription};
use crate::storage::StorageAdapter;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccessibilityMode {
    /// WCAG AAA contrast palette.
    Aaa,
    /// No flashing or auto-playing motion.
    Epilepsy,
    /// Dyslexia-friendly typeface and spacing.
    Dyslexia,
    /// Reduced distractions.
    Adhd,
    /// Larger text and cursor.
    LowVision,
}

impl AccessibilityMode {
    pub const ALL: [AccessibilityMode; 5] = [
        Self::Aaa,
        Self::Epilepsy,
        Self::Dyslexia,
        Self::Adhd,
        Self::LowVision,
    ];

    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Aaa => "mode-aaa",
            Self::Epilepsy => "mode-epilepsy",
            Self::Dyslexia => "mode-dyslexia",
            Self::Adhd => "mode-adhd",
            Self::LowVision => "mode-low-vision",
        }
    }

    pub fn label_key(self) -> &'static str {
        match self {
            Self::Aaa => "a11y.modes.aaa",
            Self::Epilepsy => "a11y.modes.epilepsy",
            Self::Dyslexia => "a11y.modes.dyslexia",
            Self::Adhd => "a11y.modes.adhd",
            Self::LowVision => "a11y.modes.low_vision",
        }
    }

    /// Parses the storage key suffix (`aaa`, `low-vision`, ...).
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.storage_key().trim_start_matches("mode-") == value.trim())
    }
}

#[derive(Clone)]
pub struct AccessibilityStore {
    flags: Vec<(AccessibilityMode, PersistedAtom<bool>)>,
    bus: EventBus,
    translator: Arc<Translator>,
    locale: Atom<String>,
}

impl AccessibilityStore {
    pub fn new(
        storage: &StorageAdapter,
        bus: &EventBus,
        translator: Arc<Translator>,
        locale: Atom<String>,
    ) -> Self {
        let flags = AccessibilityMode::ALL
            .into_iter()
            .map(|mode| (mode, PersistedAtom::new(mode.storage_key(), false, storage)))
            .collect();
        Self {
            flags,
            bus: bus.clone(),
            translator,
            locale,
        }
    }

    pub fn is_enabled(&self, mode: AccessibilityMode) -> bool {
        self.flag(mode).is_some_and(PersistedAtom::get)
    }

    pub fn set_enabled(&self, mode: AccessibilityMode, enabled: bool) {
        let Some(flag) = self.flag(mode) else {
            return;
        };
        flag.set(enabled);
        self.announce(mode, enabled);
    }

    pub fn enable(&self, mode: AccessibilityMode) {
        self.set_enabled(mode, true);
    }

    pub fn disable(&self, mode: AccessibilityMode) {
        self.set_enabled(mode, false);
    }

    /// Flips `mode` and returns its new state.
    pub fn toggle(&self, mode: AccessibilityMode) -> bool {
        let enabled = !self.is_enabled(mode);
        self.set_enabled(mode, enabled);
        enabled
    }

    pub fn active_modes(&self) -> Vec<AccessibilityMode> {
        self.flags
            .iter()
            .filter(|(_, flag)| flag.get())
            .map(|(mode, _)| *mode)
            .collect()
    }

    /// Disables every mode with a single announcement.
    pub fn reset_all(&self) {
        for (_, flag) in &self.flags {
            flag.set(false);
        }
        let locale = self.locale.get();
        self.bus
            .announce(self.translator.resolve("a11y.reset", &locale));
    }

    pub fn subscribe(
        &self,
        mode: AccessibilityMode,
        listener: impl Fn(&bool) + Send + Sync + 'static,
    ) -> Option<Subscription> {
        self.flag(mode).map(|flag| flag.subscribe(listener))
    }

    fn flag(&self, mode: AccessibilityMode) -> Option<&PersistedAtom<bool>> {
        self.flags
            .iter()
            .find(|(candidate, _)| *candidate == mode)
            .map(|(_, flag)| flag)
    }

    fn announce(&self, mode: AccessibilityMode, enabled: bool) {
        let locale = self.locale.get();
        let label = self.translator.resolve(mode.label_key(), &locale);
        let state_key = if enabled {
            "a11y.enabled"
        } else {
            "a11y.disabled"
        };
        let state = self.translator.resolve(state_key, &locale);
        self.bus.announce(format!("{label} {state}"));
    }
}
