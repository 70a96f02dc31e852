//! Keyword-based emotion classification for the assistant avatar.
//!
//! # Responsibility
//! - Map one chat turn to an avatar emotion, facial expression and motion.
//!
//! # Invariants
//! - Table order is authored order; the first entry with a matching keyword
//!   wins. Entries are never sorted or deduplicated.
//! - Classification is a pure function of the input text.
//! - No match yields the neutral directive.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const BUILTIN_TABLE: &str = include_str!("emotions.json");

pub const NEUTRAL_EMOTION: &str = "neutral";
pub const NEUTRAL_EXPRESSION: &str = "neutral";
pub const NEUTRAL_MOTION: &str = "idle";

/// One authored row of the emotion table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionEntry {
    pub keywords: Vec<String>,
    pub emotion: String,
    pub expression: String,
    pub motion: String,
}

/// Avatar animation directive produced by classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionDirective {
    pub emotion: String,
    pub expression: String,
    pub motion: String,
}

impl EmotionDirective {
    pub fn neutral() -> Self {
        Self {
            emotion: NEUTRAL_EMOTION.to_string(),
            expression: NEUTRAL_EXPRESSION.to_string(),
            motion: NEUTRAL_MOTION.to_string(),
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.emotion == NEUTRAL_EMOTION
    }
}

impl From<&EmotionEntry> for EmotionDirective {
    fn from(entry: &EmotionEntry) -> Self {
        Self {
            emotion: entry.emotion.clone(),
            expression: entry.expression.clone(),
            motion: entry.motion.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmotionTableError {
    InvalidJson(String),
    EmptyKeyword { entry_index: usize },
    EmptyField { entry_index: usize, field: &'static str },
}

impl Display for EmotionTableError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson(message) => write!(f, "emotion table is not valid JSON: {message}"),
            Self::EmptyKeyword { entry_index } => {
                write!(f, "emotion entry #{entry_index} has an empty keyword")
            }
            Self::EmptyField { entry_index, field } => {
                write!(f, "emotion entry #{entry_index} has an empty `{field}`")
            }
        }
    }
}

impl Error for EmotionTableError {}

/// Ordered keyword table with a neutral fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmotionClassifier {
    entries: Vec<EmotionEntry>,
    neutral: EmotionDirective,
}

impl EmotionClassifier {
    /// Loads the bundled table.
    pub fn builtin() -> Result<Self, EmotionTableError> {
        Self::from_json(BUILTIN_TABLE)
    }

    /// Parses an ordered JSON array of entries.
    pub fn from_json(document: &str) -> Result<Self, EmotionTableError> {
        let entries: Vec<EmotionEntry> = serde_json::from_str(document)
            .map_err(|err| EmotionTableError::InvalidJson(err.to_string()))?;
        Self::from_entries(entries)
    }

    /// Builds a classifier from entries in authored order.
    ///
    /// Keywords are lower-cased here so authored casing cannot hide a match.
    pub fn from_entries(entries: Vec<EmotionEntry>) -> Result<Self, EmotionTableError> {
        let mut normalized = Vec::with_capacity(entries.len());
        for (entry_index, mut entry) in entries.into_iter().enumerate() {
            for (field, value) in [
                ("emotion", &entry.emotion),
                ("expression", &entry.expression),
                ("motion", &entry.motion),
            ] {
                if value.trim().is_empty() {
                    return Err(EmotionTableError::EmptyField { entry_index, field });
                }
            }
            if entry.keywords.iter().any(|keyword| keyword.is_empty()) {
                return Err(EmotionTableError::EmptyKeyword { entry_index });
            }
            entry.keywords = entry
                .keywords
                .iter()
                .map(|keyword| keyword.to_lowercase())
                .collect();
            normalized.push(entry);
        }

        Ok(Self {
            entries: normalized,
            neutral: EmotionDirective::neutral(),
        })
    }

    pub fn entries(&self) -> &[EmotionEntry] {
        &self.entries
    }

    /// Returns the directive of the first entry with a keyword occurring in
    /// `text`, or the neutral directive.
    pub fn classify(&self, text: &str) -> EmotionDirective {
        let haystack = text.to_lowercase();
        self.entries
            .iter()
            .find(|entry| {
                entry
                    .keywords
                    .iter()
                    .any(|keyword| haystack.contains(keyword.as_str()))
            })
            .map(EmotionDirective::from)
            .unwrap_or_else(|| self.neutral.clone())
    }
}
