//! Locale dictionaries and dot-path translation lookup.
//!
//! # Responsibility
//! - Load one immutable nested dictionary per supported locale.
//! - Resolve `a.b.c` keys against the caller's locale.
//!
//! # Invariants
//! - Unsupported locales fall back to the default locale's dictionary; there
//!   is no fallback below the default locale.
//! - A miss returns the key verbatim. Resolution never panics and never
//!   returns an empty string.

use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Locale used when the requested one has no dictionary.
pub const DEFAULT_LOCALE: &str = "es";

const BUILTIN_DOCUMENTS: &[(&str, &str)] = &[
    ("es", include_str!("locales/es.json")),
    ("en", include_str!("locales/en.json")),
];

static EMPTY_DICTIONARY: Value = Value::Null;

pub type I18nResult<T> = Result<T, I18nError>;

/// Dictionary loading errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum I18nError {
    InvalidLocaleCode(String),
    InvalidDocument { locale: String, message: String },
    RootNotObject { locale: String },
    DuplicateLocale(String),
    MissingDefaultLocale(String),
}

impl Display for I18nError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLocaleCode(value) => write!(f, "invalid locale code `{value}`"),
            Self::InvalidDocument { locale, message } => {
                write!(f, "locale `{locale}` is not valid JSON: {message}")
            }
            Self::RootNotObject { locale } => {
                write!(f, "locale `{locale}` root must be a JSON object")
            }
            Self::DuplicateLocale(value) => write!(f, "locale `{value}` loaded twice"),
            Self::MissingDefaultLocale(value) => {
                write!(f, "default locale `{value}` has no dictionary")
            }
        }
    }
}

impl Error for I18nError {}

/// Immutable set of locale dictionaries.
#[derive(Debug, Clone)]
pub struct Translator {
    dictionaries: BTreeMap<String, Value>,
    default_locale: String,
}

impl Translator {
    /// Loads the bundled `es` and `en` dictionaries with `es` as default.
    pub fn builtin() -> I18nResult<Self> {
        Self::builtin_with_default(DEFAULT_LOCALE)
    }

    /// Loads the bundled dictionaries with a caller-chosen default locale.
    pub fn builtin_with_default(default_locale: &str) -> I18nResult<Self> {
        Self::from_documents(BUILTIN_DOCUMENTS.iter().copied(), default_locale)
    }

    /// Loads `(locale, json)` documents.
    ///
    /// # Errors
    /// - A locale code that is empty or not ASCII alphabetic.
    /// - A document that is not valid JSON or whose root is not an object.
    /// - The same locale twice, or no dictionary for `default_locale`.
    pub fn from_documents<'a>(
        documents: impl IntoIterator<Item = (&'a str, &'a str)>,
        default_locale: &str,
    ) -> I18nResult<Self> {
        let mut dictionaries = BTreeMap::new();
        for (locale, document) in documents {
            let locale = validate_locale_code(locale)?;
            let value: Value =
                serde_json::from_str(document).map_err(|err| I18nError::InvalidDocument {
                    locale: locale.clone(),
                    message: err.to_string(),
                })?;
            if !value.is_object() {
                return Err(I18nError::RootNotObject { locale });
            }
            if dictionaries.contains_key(&locale) {
                return Err(I18nError::DuplicateLocale(locale));
            }
            dictionaries.insert(locale, value);
        }

        let default_locale = validate_locale_code(default_locale)?;
        if !dictionaries.contains_key(&default_locale) {
            return Err(I18nError::MissingDefaultLocale(default_locale));
        }

        Ok(Self {
            dictionaries,
            default_locale,
        })
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Returns sorted locale codes with a dictionary.
    pub fn supported_locales(&self) -> Vec<&str> {
        self.dictionaries.keys().map(String::as_str).collect()
    }

    pub fn has_locale(&self, locale: &str) -> bool {
        self.dictionaries.contains_key(&normalize_locale(locale))
    }

    /// Resolves `key`, returning the key itself on a miss.
    pub fn resolve(&self, key: &str, locale: &str) -> String {
        match self.lookup(key, locale) {
            Some(text) => text.to_string(),
            None => {
                debug!("event=translation_miss module=i18n status=miss locale={locale} key={key}");
                key.to_string()
            }
        }
    }

    /// Returns the string leaf at `key`, or `None` on any miss.
    pub fn lookup(&self, key: &str, locale: &str) -> Option<&str> {
        let mut node = self.dictionary_for(locale);
        for segment in key.split('.') {
            node = node.as_object()?.get(segment)?;
        }
        node.as_str().filter(|text| !text.is_empty())
    }

    fn dictionary_for(&self, locale: &str) -> &Value {
        let normalized = normalize_locale(locale);
        self.dictionaries
            .get(&normalized)
            .or_else(|| self.dictionaries.get(&self.default_locale))
            .unwrap_or(&EMPTY_DICTIONARY)
    }
}

/// Reduces a language tag to its primary subtag (`en-US` -> `en`).
pub fn normalize_locale(tag: &str) -> String {
    tag.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn validate_locale_code(locale: &str) -> I18nResult<String> {
    let normalized = normalize_locale(locale);
    if normalized.is_empty() || !normalized.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(I18nError::InvalidLocaleCode(locale.to_string()));
    }
    Ok(normalized)
}
