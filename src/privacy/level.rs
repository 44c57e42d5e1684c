//! Privacy levels

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declared anonymization guarantee selected per call
///
/// The string tags are stable: they are stored as policy tags alongside
/// processed records and must never change or be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrivacyLevel {
    /// Sensitive fields encrypted; reversible by the key holder
    #[serde(rename = "raw")]
    Raw,
    /// Sensitive fields replaced with deterministic keyed tokens
    #[serde(rename = "tokenized")]
    Tokenized,
    /// Sensitive fields replaced with field-scoped, truncated pseudonyms
    #[serde(rename = "pseudo")]
    Pseudonymized,
    /// Sensitive fields replaced with a fixed marker
    #[serde(rename = "redacted")]
    Redacted,
    /// Sensitive fields bucketed into coarser categories
    #[serde(rename = "generalized")]
    Generalized,
    /// Laplace noise added to numeric sensitive fields
    #[serde(rename = "differential")]
    Differential,
    /// Record replaced by per-field summaries
    #[serde(rename = "aggregated")]
    Aggregated,
    /// Sensitive fields replaced by plausible synthetic values
    #[serde(rename = "synthetic")]
    Synthetic,
}

impl PrivacyLevel {
    /// Every level, in tag order
    pub const ALL: [PrivacyLevel; 8] = [
        Self::Raw,
        Self::Tokenized,
        Self::Pseudonymized,
        Self::Redacted,
        Self::Generalized,
        Self::Differential,
        Self::Aggregated,
        Self::Synthetic,
    ];

    /// Stable string tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Tokenized => "tokenized",
            Self::Pseudonymized => "pseudo",
            Self::Redacted => "redacted",
            Self::Generalized => "generalized",
            Self::Differential => "differential",
            Self::Aggregated => "aggregated",
            Self::Synthetic => "synthetic",
        }
    }

    /// Whether the level needs the secret key
    pub fn requires_key(&self) -> bool {
        matches!(self, Self::Raw | Self::Tokenized | Self::Pseudonymized)
    }

    /// Whether repeated calls on identical input may produce different output
    pub fn is_randomized(&self) -> bool {
        matches!(self, Self::Raw | Self::Differential | Self::Synthetic)
    }
}

impl Default for PrivacyLevel {
    fn default() -> Self {
        Self::Tokenized
    }
}

impl fmt::Display for PrivacyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrivacyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == tag)
            .ok_or_else(|| {
                format!(
                    "Invalid privacy level '{}'. Must be one of: {}",
                    s,
                    Self::ALL.map(|l| l.as_str()).join(", ")
                )
            })
    }
}
