//! Affinity tag used to scope pairing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel tag used when the client supplies none.
pub const DEFAULT_TAG: &str = "default";

/// Caller-chosen key; only connections with equal tags are paired.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    /// Wraps a tag verbatim. Callers handling user input should prefer
    /// [`Tag::from_query`].
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Resolves the `tag` query parameter, falling back to `fallback` when
    /// it is absent or empty.
    pub fn from_query(raw: Option<&str>, fallback: &str) -> Self {
        match raw {
            Some(tag) if !tag.is_empty() => Self(tag.to_string()),
            _ => Self(fallback.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Tag {
    fn default() -> Self {
        Self(DEFAULT_TAG.to_string())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
