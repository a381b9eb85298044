//! Suggestion-phrase markers for the line classifier.
//!
//! A [`MarkerSet`] maps a pattern to the reason a matching line is dropped.
//! The default set targets the meta-commentary Chinese-speaking models tend to
//! append to code ("建议…", "注意…", "以上代码…"). Sets can be built in code or
//! loaded from JSON:
//!
//! ```json
//! {
//!   "markers": [
//!     { "pattern": "Note:", "kind": "prefix", "reason": "note" },
//!     { "pattern": "you should", "kind": "contains", "reason": "advice" }
//!   ]
//! }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Substring markers: a trimmed line containing any of these is dropped.
const CONTAINS_MARKERS: &[(&str, &str)] = &[
    ("建议", "suggest"),
    ("推荐", "recommend"),
    ("可以", "can/may"),
    ("应该", "should"),
    ("注意", "note"),
    ("提示", "tip"),
];

/// Referential-discourse openers: a trimmed line starting with any of these is dropped.
const PREFIX_MARKERS: &[(&str, &str)] = &[
    ("这里", "here"),
    ("这段", "this passage"),
    ("上面", "above"),
    ("下面", "below"),
    ("以上", "the above"),
    ("以下", "the following"),
    ("另外", "additionally"),
    ("此外", "furthermore"),
    ("同时", "meanwhile"),
    ("最后", "finally"),
    ("总之", "in summary"),
];

/// How a marker pattern is matched against a trimmed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// Pattern may occur anywhere in the line.
    Contains,
    /// Line must start with the pattern.
    Prefix,
}

/// A single pattern → drop-reason entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    /// Literal text to look for.
    pub pattern: String,
    /// Matching mode.
    pub kind: MarkerKind,
    /// Human-readable reason reported when the marker fires.
    pub reason: String,
}

impl Marker {
    /// Creates a substring marker.
    pub fn contains(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            kind: MarkerKind::Contains,
            reason: reason.into(),
        }
    }

    /// Creates a line-prefix marker.
    pub fn prefix(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            kind: MarkerKind::Prefix,
            reason: reason.into(),
        }
    }

    /// Returns true if this marker fires on the (already trimmed) line.
    pub fn matches(&self, trimmed: &str) -> bool {
        match self.kind {
            MarkerKind::Contains => trimmed.contains(self.pattern.as_str()),
            MarkerKind::Prefix => trimmed.starts_with(self.pattern.as_str()),
        }
    }
}

/// Ordered collection of suggestion markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSet {
    markers: Vec<Marker>,
}

impl Default for MarkerSet {
    fn default() -> Self {
        let contains = CONTAINS_MARKERS
            .iter()
            .map(|(pattern, reason)| Marker::contains(*pattern, *reason));
        let prefixes = PREFIX_MARKERS
            .iter()
            .map(|(pattern, reason)| Marker::prefix(*pattern, *reason));

        Self {
            markers: contains.chain(prefixes).collect(),
        }
    }
}

impl MarkerSet {
    /// Creates an empty set (disables the suggestion heuristic).
    pub fn empty() -> Self {
        Self {
            markers: Vec::new(),
        }
    }

    /// Creates a set from explicit markers.
    ///
    /// Fails if any marker has an empty pattern, since an empty pattern would
    /// match every line.
    pub fn new(markers: Vec<Marker>) -> Result<Self> {
        let set = Self { markers };
        set.check()?;
        Ok(set)
    }

    /// Parses a marker set from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let set: MarkerSet = serde_json::from_str(json)?;
        set.check()?;
        Ok(set)
    }

    /// Loads a marker set from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serializes the set to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Adds a substring marker.
    pub fn with_contains(mut self, pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        self.markers.push(Marker::contains(pattern, reason));
        self
    }

    /// Adds a line-prefix marker.
    pub fn with_prefix(mut self, pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        self.markers.push(Marker::prefix(pattern, reason));
        self
    }

    /// Returns the first marker that fires on the trimmed line.
    pub fn first_match(&self, trimmed: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.matches(trimmed))
    }

    /// Returns an iterator over the markers in order.
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    /// Number of markers.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Returns true if the set has no markers.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    fn check(&self) -> Result<()> {
        for (index, marker) in self.markers.iter().enumerate() {
            if marker.pattern.is_empty() {
                return Err(Error::InvalidMarker(format!(
                    "marker #{} ({}) has an empty pattern",
                    index, marker.reason
                )));
            }
        }
        Ok(())
    }
}
