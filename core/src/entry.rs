//! Tagged attribute types.
//!
//! An `Entry` is a single `key:value` attribute on a contact. Entries carry no
//! identity beyond their contents: two entries with the same key and value are
//! the same entry everywhere in counting and lookup.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A key/value attribute, e.g. `School:Berkeley`.
///
/// The derived `Ord` compares key first, then value. It is the total order
/// used for canonical pairs and for every deterministic tie-break in the crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

impl Entry {
    pub fn new<K: Into<String>, V: Into<String>>(key: K, value: V) -> Self {
        Entry {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parse a `key:value` rendering. Splits at the first colon; text without a
    /// colon becomes a value with an empty key.
    pub fn parse(text: &str) -> Self {
        match text.split_once(':') {
            Some((key, value)) => Entry::new(key, value),
            None => Entry::new("", text),
        }
    }
}

impl<K: Into<String>, V: Into<String>> From<(K, V)> for Entry {
    fn from((key, value): (K, V)) -> Self {
        Entry::new(key, value)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.value)
    }
}

/// A contact: its attributes in the order they were added.
pub type Contact = Vec<Entry>;

/// Unordered pair of entries keying joint-occurrence counts.
///
/// The two entries are stored sorted, so `PairKey::new(a, b)` and
/// `PairKey::new(b, a)` are equal and hash to the same bucket.
/// Not serialized directly; model snapshots store the two members.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    low: Entry,
    high: Entry,
}

impl PairKey {
    pub fn new(a: &Entry, b: &Entry) -> Self {
        if a <= b {
            PairKey {
                low: a.clone(),
                high: b.clone(),
            }
        } else {
            PairKey {
                low: b.clone(),
                high: a.clone(),
            }
        }
    }

    /// Both members, smaller first.
    pub fn members(&self) -> (&Entry, &Entry) {
        (&self.low, &self.high)
    }

    /// Whether `entry` is one side of this pair.
    pub fn contains(&self, entry: &Entry) -> bool {
        &self.low == entry || &self.high == entry
    }
}
