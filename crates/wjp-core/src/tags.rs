//! Point tags attached to a metric record, with cardinality admission.
//!
//! A [`TagSet`] never holds more than [`TagLimits::max_tags`] entries. Tags
//! taken from an open-ended source (run parameters) are further limited to
//! [`TagLimits::max_parameter_tags`] per source. Entries over either cap are
//! dropped silently.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Default global cap on tags per record.
pub const MAX_TAGS: usize = 20;

/// Default cap on tags admitted from a single extra source.
pub const MAX_PARAMETER_TAGS: usize = 10;

/// Tag cardinality configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagLimits {
    /// Maximum number of tags on one record.
    pub max_tags: usize,
    /// Maximum number of tags admitted from one extra source.
    pub max_parameter_tags: usize,
}

impl Default for TagLimits {
    fn default() -> Self {
        TagLimits {
            max_tags: MAX_TAGS,
            max_parameter_tags: MAX_PARAMETER_TAGS,
        }
    }
}

impl TagLimits {
    /// How many entries an extra source may add to a set that already holds
    /// `current` entries.
    pub fn admission(&self, current: usize) -> usize {
        self.max_parameter_tags
            .min(self.max_tags.saturating_sub(current))
    }
}

/// Ordered tag key to tag value mapping with unique keys.
///
/// Order is insertion order. It is kept for stable rendering in tests and
/// logs; the backend does not treat tags as ordered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet {
    entries: IndexMap<String, String>,
    #[serde(skip)]
    limits: TagLimits,
}

impl TagSet {
    /// Creates an empty set with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set with explicit limits.
    pub fn with_limits(limits: TagLimits) -> Self {
        TagSet {
            entries: IndexMap::new(),
            limits,
        }
    }

    /// Inserts or replaces a tag.
    ///
    /// Replacing an existing key always succeeds. A new key is refused (and
    /// `false` returned) once the set is at its global cap.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if !self.entries.contains_key(&key) && self.entries.len() >= self.limits.max_tags {
            return false;
        }
        self.entries.insert(key, value.into());
        true
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Admits entries from an extra source until the source's share is used
    /// up. Returns how many entries were taken.
    ///
    /// The share is `min(max_parameter_tags, max_tags - len())`, computed
    /// once before the first entry is considered.
    pub fn extend_bounded<I, K, V>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let cutoff = self.entries.len() + self.limits.admission(self.entries.len());
        let mut taken = 0;
        for (key, value) in candidates {
            if self.entries.len() >= cutoff {
                break;
            }
            self.entries.insert(key.into(), value.into());
            taken += 1;
        }
        taken
    }

    /// Looks up a tag value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns `true` if the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no tags.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates tags in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
