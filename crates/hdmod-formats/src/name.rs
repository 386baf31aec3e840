//! Canonical identifiers for frames and groups

use std::borrow::Borrow;
use std::fmt;

/// Uppercased, trimmed identifier used as the key for every frame and group lookup
///
/// Archive ids, directive frame names and reference table columns spell the
/// same identifier with different casing. Normalizing once at ingestion keeps
/// every downstream comparison a plain string equality.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CanonicalName(String);

impl CanonicalName {
    /// Canonicalize raw text
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }

    /// Borrow the canonical form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether the canonical form contains `marker` (already uppercase)
    pub fn contains(&self, marker: &str) -> bool {
        self.0.contains(marker)
    }

    /// Check whether the canonical form starts with `prefix` (already uppercase)
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// True when the identifier is empty after trimming
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for CanonicalName {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for CanonicalName {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl Borrow<str> for CanonicalName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CanonicalName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
