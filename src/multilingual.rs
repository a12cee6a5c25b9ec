//! The multilingual field model: a sparse map from language code to text.
//!
//! Every translatable column (service name, gallery category name, variant
//! label, ...) persists one of these as a single JSON document, e.g.
//! `{"hu":"Hajvágás","en":"Haircut"}`. Absence of a key means "not yet
//! translated"; an empty string is never stored as a sentinel.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A sparse language-code → text mapping with structural equality.
///
/// Equality is by content, not reference, so change detection in the
/// persistence layer sees in-place mutations of a single language key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MultilingualText(BTreeMap<String, String>);

impl MultilingualText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapping from (language, text) pairs. Blank texts are dropped.
    pub fn from_pairs<I, L, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (L, T)>,
        L: Into<String>,
        T: Into<String>,
    {
        let mut text = Self::new();
        for (lang, value) in pairs {
            text.set(&lang.into(), value.into());
        }
        text
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.0.get(language).map(String::as_str)
    }

    /// Set the text for one language, leaving every other language intact.
    ///
    /// A blank value removes the key instead of storing an empty sentinel.
    pub fn set(&mut self, language: &str, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            self.0.remove(language);
        } else {
            self.0.insert(language.to_string(), value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Serialize to the persisted JSON document form.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(&self.0).context("Failed to serialize multilingual text")
    }

    /// Parse the persisted JSON document form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse multilingual text")
    }
}
