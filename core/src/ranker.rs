//! Quick-filter ranking.
//!
//! Given the contacts currently on screen, order their entries by how evenly
//! each one splits that set. An entry held by half of the candidates is the
//! most informative next filter; one held by none or all of them is useless.

use crate::entry::Entry;
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// An entry and the share of candidates carrying it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterChoice {
    pub entry: Entry,
    pub frequency: f64,
}

impl FilterChoice {
    /// Distance from an even split, in `[0, 0.5]`. Lower is better.
    pub fn imbalance(&self) -> f64 {
        (self.frequency - 0.5).abs()
    }
}

/// Entries of `candidates` with their frequencies, most even split first.
///
/// A contact counts at most once per distinct entry. Equal imbalances are
/// ordered by entry.
pub fn ranked_filters<C: AsRef<[Entry]>>(candidates: &[C]) -> Vec<FilterChoice> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let mut counts: AHashMap<&Entry, usize> = AHashMap::new();
    for contact in candidates {
        let distinct: AHashSet<&Entry> = contact.as_ref().iter().collect();
        for entry in distinct {
            *counts.entry(entry).or_insert(0) += 1;
        }
    }

    let total = candidates.len() as f64;
    let mut ranked: Vec<FilterChoice> = counts
        .into_iter()
        .map(|(entry, count)| FilterChoice {
            entry: entry.clone(),
            frequency: count as f64 / total,
        })
        .collect();

    ranked.sort_by(|a, b| match a.imbalance().partial_cmp(&b.imbalance()) {
        Some(Ordering::Equal) | None => a.entry.cmp(&b.entry),
        Some(ordering) => ordering,
    });
    ranked
}

/// Entries of `candidates`, most even split first.
pub fn rank_entries<C: AsRef<[Entry]>>(candidates: &[C]) -> Vec<Entry> {
    ranked_filters(candidates)
        .into_iter()
        .map(|c| c.entry)
        .collect()
}
