//! URL record entity and the value types derived from it.

use serde::{Deserialize, Serialize};

/// A stored mapping between a short alias and its original URL.
///
/// Records are never removed; deletion flips `is_deleted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub original_url: String,
    pub short_alias: String,
    pub owner_id: String,
    pub correlation_id: Option<String>,
    pub is_deleted: bool,
}

impl UrlRecord {
    /// Creates a live record owned by `owner_id`.
    pub fn new(
        original_url: impl Into<String>,
        short_alias: impl Into<String>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            original_url: original_url.into(),
            short_alias: short_alias.into(),
            owner_id: owner_id.into(),
            correlation_id: None,
            is_deleted: false,
        }
    }

    /// Attaches a caller-supplied correlation id.
    pub fn with_correlation_id(mut self, correlation_id: Option<String>) -> Self {
        self.correlation_id = correlation_id;
        self
    }
}

/// A user's URL as returned by per-owner listing, with the alias already
/// qualified by the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnedUrl {
    pub short_url: String,
    pub original_url: String,
}

/// One `(alias, owner)` pair waiting in the delete buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PendingDeletion {
    pub short_alias: String,
    pub owner_id: String,
}

impl PendingDeletion {
    pub fn new(short_alias: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            short_alias: short_alias.into(),
            owner_id: owner_id.into(),
        }
    }
}

/// Input item of a batch shortening request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchUrl {
    pub correlation_id: Option<String>,
    pub original_url: String,
}

/// Output item of a batch shortening request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchShortUrl {
    pub correlation_id: Option<String>,
    pub short_url: String,
}
