//! Cookie consent records.
//!
//! A record captures the user's choice for each consent category together
//! with when it was made and under which consent schema version.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Consent schema version written into new records.
///
/// Bumping this forces every user through the consent flow again.
pub const CONSENT_VERSION: &str = "1.0";

/// One of the cookie usage classes a user can enable independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsentCategory {
    /// Required for the site to work; always granted
    Necessary,
    /// Preferences such as theme or language
    Functional,
    /// Usage measurement
    Analytics,
    /// Advertising and attribution
    Marketing,
}

impl ConsentCategory {
    /// All categories in display order.
    pub const ALL: [ConsentCategory; 4] = [
        ConsentCategory::Necessary,
        ConsentCategory::Functional,
        ConsentCategory::Analytics,
        ConsentCategory::Marketing,
    ];

    /// Field name used in the persisted record.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentCategory::Necessary => "necessary",
            ConsentCategory::Functional => "functional",
            ConsentCategory::Analytics => "analytics",
            ConsentCategory::Marketing => "marketing",
        }
    }
}

impl fmt::Display for ConsentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The category choices a user submits, before stamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsentChoices {
    /// Ignored on save: necessary cookies cannot be declined
    pub necessary: bool,
    /// Preference and feature cookies
    pub functional: bool,
    /// Usage measurement cookies
    pub analytics: bool,
    /// Advertising and tracking cookies
    pub marketing: bool,
}

impl ConsentChoices {
    /// Choices for the optional categories; `necessary` is implied.
    pub fn new(functional: bool, analytics: bool, marketing: bool) -> Self {
        Self {
            necessary: true,
            functional,
            analytics,
            marketing,
        }
    }

    /// Every category enabled.
    pub fn all() -> Self {
        Self::new(true, true, true)
    }

    /// Only necessary cookies.
    pub fn necessary_only() -> Self {
        Self::new(false, false, false)
    }
}

impl Default for ConsentChoices {
    fn default() -> Self {
        Self::necessary_only()
    }
}

/// A stamped, persisted consent decision.
///
/// Serialized as a flat JSON object:
/// `{"necessary":true,"functional":false,"analytics":true,"marketing":false,
///   "timestamp":"2024-01-01T00:00:00Z","version":"1.0"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentRecord {
    /// Always true once saved
    pub necessary: bool,
    /// Preference and feature cookies
    pub functional: bool,
    /// Usage measurement cookies
    pub analytics: bool,
    /// Advertising and tracking cookies
    pub marketing: bool,
    /// When the choice was saved
    pub timestamp: DateTime<Utc>,
    /// Consent version the choice was made under
    pub version: String,
}

impl ConsentRecord {
    /// Stamp a set of choices. `necessary` is forced on.
    pub fn stamp(choices: ConsentChoices, timestamp: DateTime<Utc>, version: impl Into<String>) -> Self {
        Self {
            necessary: true,
            functional: choices.functional,
            analytics: choices.analytics,
            marketing: choices.marketing,
            timestamp,
            version: version.into(),
        }
    }

    /// Whether the record grants a category.
    pub fn allows(&self, category: ConsentCategory) -> bool {
        match category {
            ConsentCategory::Necessary => true,
            ConsentCategory::Functional => self.functional,
            ConsentCategory::Analytics => self.analytics,
            ConsentCategory::Marketing => self.marketing,
        }
    }

    /// The choices this record was stamped from.
    pub fn choices(&self) -> ConsentChoices {
        ConsentChoices::new(self.functional, self.analytics, self.marketing)
    }
}

/// Result of loading consent from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Consent {
    /// A record written under the expected version
    Valid(ConsentRecord),
    /// Nothing usable is stored
    Absent,
    /// A well-formed record written under another version
    StaleVersion(ConsentRecord),
}

impl Consent {
    /// Classify a parsed record against the expected version.
    pub fn classify(record: ConsentRecord, expected_version: &str) -> Self {
        if record.version == expected_version {
            Consent::Valid(record)
        } else {
            Consent::StaleVersion(record)
        }
    }

    /// The record, only if it is valid.
    pub fn valid(self) -> Option<ConsentRecord> {
        match self {
            Consent::Valid(record) => Some(record),
            Consent::Absent | Consent::StaleVersion(_) => None,
        }
    }

    /// Check if the user must be asked again.
    pub fn needs_prompt(&self) -> bool {
        !matches!(self, Consent::Valid(_))
    }
}
