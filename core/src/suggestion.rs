//! Read-side suggestions over a `CoOccurrenceModel`.
//!
//! Two questions are answered here:
//! - "what attribute should this contact get next?" (`generate_suggestions`)
//! - "which key did the user mean for this value?" (`suggest_key`)
//!
//! Neither call mutates the model.

use crate::cooccurrence::CoOccurrenceModel;
use crate::entry::Entry;
use crate::utils::contains_ignore_case;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// A candidate entry with its accumulated evidence score.
///
/// The score is a sum of conditional probabilities, not a calibrated
/// probability; it can exceed 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub entry: Entry,
    pub score: f64,
}

/// Ranks entries against the statistics of one model.
#[derive(Debug, Clone, Copy)]
pub struct SuggestionEngine<'a> {
    model: &'a CoOccurrenceModel,
}

impl<'a> SuggestionEngine<'a> {
    pub fn new(model: &'a CoOccurrenceModel) -> Self {
        Self { model }
    }

    /// Every observed entry scored against `existing`.
    ///
    /// score(c) = sum of P(c | g) over each `g` in `existing` with `g != c`.
    /// Sorted by score descending, then by entry, so equal model state always
    /// yields the same order.
    pub fn scored_suggestions(&self, existing: &[Entry]) -> Vec<Suggestion> {
        let mut out: Vec<Suggestion> = self
            .model
            .iter()
            .map(|(candidate, _)| {
                let score: f64 = existing
                    .iter()
                    .filter(|given| *given != candidate)
                    .map(|given| self.model.conditional_probability(candidate, given))
                    .sum();
                Suggestion {
                    entry: candidate.clone(),
                    score,
                }
            })
            .collect();

        out.sort_by(|a, b| match b.score.partial_cmp(&a.score) {
            Some(Ordering::Equal) | None => a.entry.cmp(&b.entry),
            Some(ordering) => ordering,
        });
        out
    }

    /// Observed entries ordered from most to least likely next attribute.
    pub fn generate_suggestions(&self, existing: &[Entry]) -> Vec<Entry> {
        self.scored_suggestions(existing)
            .into_iter()
            .map(|s| s.entry)
            .collect()
    }

    /// Guess the key for a freshly typed `value`.
    ///
    /// 1. The most frequent observed entry whose value contains `value`
    ///    (case-insensitive) wins outright.
    /// 2. Otherwise the key of `known_values_by_key` with the largest share of
    ///    values containing `value` is paired with `value`.
    /// 3. Otherwise `Entry("", value)`.
    pub fn suggest_key(
        &self,
        value: &str,
        known_values_by_key: &HashMap<String, Vec<String>>,
    ) -> Entry {
        // sorted walk + strict comparison: ties go to the smallest entry
        let mut best: Option<(&Entry, u64)> = None;
        for entry in self.model.entries() {
            if !contains_ignore_case(&entry.value, value) {
                continue;
            }
            let count = self.model.total(entry);
            if best.map_or(true, |(_, top)| count > top) {
                best = Some((entry, count));
            }
        }
        if let Some((entry, _)) = best {
            return entry.clone();
        }

        let mut keys: Vec<&String> = known_values_by_key.keys().collect();
        keys.sort();
        let mut best_key = "";
        let mut best_share = 0.0_f64;
        for key in keys {
            let values = &known_values_by_key[key];
            if values.is_empty() {
                continue;
            }
            let hits = values
                .iter()
                .filter(|v| contains_ignore_case(v, value))
                .count();
            let share = hits as f64 / values.len() as f64;
            if share > best_share {
                best_share = share;
                best_key = key.as_str();
            }
        }
        Entry::new(best_key, value)
    }
}
