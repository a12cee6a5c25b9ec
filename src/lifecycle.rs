//! Per-(tenant, language) translation lifecycle.
//!
//! One `LanguageBinding` exists per non-default language a tenant has added.
//! The default language has no stored binding; it is implicitly `Published`
//! at 100% progress.

use std::fmt;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// State machine:
/// `Created` → `Translating` → `ReviewPending` → `Published`, with a
/// terminal `Error` reachable from `Translating` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranslationStatus {
    /// Language reserved, no work started yet.
    Created,
    /// Background translation job running.
    Translating,
    /// Job finished (or manual add), awaiting human approval.
    ReviewPending,
    /// Visible to end users.
    Published,
    /// The background job failed fatally.
    Error,
}

impl TranslationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TranslationStatus::Created => "Created",
            TranslationStatus::Translating => "Translating",
            TranslationStatus::ReviewPending => "ReviewPending",
            TranslationStatus::Published => "Published",
            TranslationStatus::Error => "Error",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "Created" => Ok(TranslationStatus::Created),
            "Translating" => Ok(TranslationStatus::Translating),
            "ReviewPending" => Ok(TranslationStatus::ReviewPending),
            "Published" => Ok(TranslationStatus::Published),
            "Error" => Ok(TranslationStatus::Error),
            other => bail!("Unknown translation status: '{}'", other),
        }
    }
}

impl fmt::Display for TranslationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The lifecycle record for one (tenant, language) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageBinding {
    pub tenant_id: i64,
    pub language_code: String,
    pub status: TranslationStatus,
    /// 0–100. Monotonically non-decreasing within one job run.
    pub progress: u8,
    /// RFC 3339 UTC timestamp of the last status/progress write.
    pub last_updated: String,
}
