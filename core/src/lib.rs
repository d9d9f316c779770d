//! thymesia-core
//!
//! Suggestion and search engine for a personal contact-tagging book. Every
//! contact is an ordered list of `key:value` entries; this crate learns how
//! entries co-occur and uses that to suggest what to add next, guess keys for
//! typed values, search the book and pick quick-filter buttons.
//!
//! Public API:
//! - `Entry` - Key/value attribute, the unit everything else counts
//! - `CoOccurrenceModel` - Incremental entry totals and joint pair counts
//! - `SuggestionEngine` - Next-attribute ranking and key guessing
//! - `search` / `tokenize` - AND-of-substring token search
//! - `rank_entries` - Quick-filter ordering by how evenly entries split
//! - `ContactBook` - Contacts plus model kept in sync through edits
//! - `SharedBook` - `ContactBook` behind a reader/writer lock
//! - `Config` - Presentation knobs for suggestions and filters
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub mod entry;
pub use entry::{Contact, Entry, PairKey};

pub mod error;
pub use error::{Error, Result};

pub mod cooccurrence;
pub use cooccurrence::{CoOccurrenceModel, ModelStats};

pub mod suggestion;
pub use suggestion::{Suggestion, SuggestionEngine};

pub mod search;
pub use search::{contact_matches, search, tokenize};

pub mod ranker;
pub use ranker::{rank_entries, ranked_filters, FilterChoice};

pub mod book;
pub use book::{ContactBook, ContactId};

pub mod shared;
pub use shared::SharedBook;

/// Presentation settings applied by `ContactBook` on top of the raw engines.
///
/// The engines themselves (`SuggestionEngine`, `rank_entries`) always return
/// complete rankings; these knobs only trim what the book hands back.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of next-attribute suggestions (0 = unlimited)
    pub max_suggestions: usize,

    /// Drop entries the contact already has from its suggestions
    pub hide_existing: bool,

    /// Maximum number of quick-filter entries (0 = unlimited)
    pub max_filters: usize,

    /// Keys never offered as suggestions or quick filters
    pub hidden_keys: HashSet<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_suggestions: 0,
            hide_existing: true,
            // a row of filter chips
            max_filters: 8,
            hidden_keys: HashSet::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    // ========== Hidden Keys API ==========

    /// Hide a key from suggestions and filters.
    pub fn hide_key(&mut self, key: &str) {
        self.hidden_keys.insert(key.to_string());
    }

    /// Allow a hidden key again. Returns whether it was hidden.
    pub fn unhide_key(&mut self, key: &str) -> bool {
        self.hidden_keys.remove(key)
    }

    pub fn is_hidden(&self, key: &str) -> bool {
        self.hidden_keys.contains(key)
    }

    /// Get all hidden keys as a sorted vector.
    pub fn hidden_keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.hidden_keys.iter().cloned().collect();
        keys.sort();
        keys
    }

    /// Truncate `items` to `limit` when the limit is set.
    pub(crate) fn apply_limit<T>(items: &mut Vec<T>, limit: usize) {
        if limit > 0 {
            items.truncate(limit);
        }
    }
}

/// Utility helpers.
pub mod utils {
    /// Case-insensitive substring test. An empty needle matches anything.
    pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }
}
