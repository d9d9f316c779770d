// core/src/cooccurrence.rs
//
// Incremental co-occurrence statistics over a contact book.
// Tracks how often each entry appears and how many contacts carry each
// unordered pair of entries, and derives P(a | b) from the two.

use crate::entry::{Entry, PairKey};
use crate::error::{Error, Result};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, warn};

/// Occurrence totals and joint pair counts for one contact book.
///
/// Mutation is paired: every `add_entry` must eventually be matched by a
/// `remove_entry` with the same entry and equivalent context, otherwise
/// counts drift. An entry stays observed after its total falls back to zero;
/// joint buckets at zero are dropped.
#[derive(Debug, Clone, Default)]
pub struct CoOccurrenceModel {
    totals: AHashMap<Entry, u64>,
    joint: AHashMap<PairKey, u64>,
    initialized: bool,
}

/// Summary counters for logging and inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStats {
    /// Distinct entries with a non-zero total
    pub entries: usize,
    /// Distinct unordered pairs with a non-zero joint count
    pub pairs: usize,
    /// Sum of all entry totals
    pub observations: u64,
}

/// On-disk form of the model. Buckets are sorted so equal models encode
/// to identical bytes.
#[derive(Debug, Serialize, Deserialize)]
struct ModelSnapshot {
    initialized: bool,
    totals: Vec<(Entry, u64)>,
    joint: Vec<(Entry, Entry, u64)>,
}

impl CoOccurrenceModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk-load a whole book.
    ///
    /// Each contact's entries are added in order, with the entries before
    /// them as the existing set, so every co-occurring pair in a contact is
    /// counted once. Fails if the model was already initialized or has seen
    /// incremental updates.
    pub fn initialize<C: AsRef<[Entry]>>(&mut self, book: &[C]) -> Result<()> {
        if self.initialized || !self.totals.is_empty() {
            warn!(
                entries = self.totals.len(),
                "refusing to initialize a populated co-occurrence model"
            );
            return Err(Error::AlreadyInitialized);
        }

        for contact in book {
            let contact = contact.as_ref();
            for (i, entry) in contact.iter().enumerate() {
                self.add_entry(entry, &contact[..i]);
            }
        }
        self.initialized = true;

        let stats = self.stats();
        debug!(
            contacts = book.len(),
            entries = stats.entries,
            pairs = stats.pairs,
            "initialized co-occurrence model"
        );
        Ok(())
    }

    /// Record `entry` being added to a contact that already holds `existing`.
    ///
    /// `existing` must not contain `entry` itself; any element equal to it is
    /// skipped rather than counted as a self-pair.
    pub fn add_entry(&mut self, entry: &Entry, existing: &[Entry]) {
        *self.totals.entry(entry.clone()).or_insert(0) += 1;
        for other in existing {
            if other == entry {
                continue;
            }
            *self.joint.entry(PairKey::new(entry, other)).or_insert(0) += 1;
        }
    }

    /// Record `entry` being removed from a contact.
    ///
    /// `existing` is the contact's attribute set at removal time and may still
    /// include `entry`; elements equal to it are skipped.
    pub fn remove_entry(&mut self, entry: &Entry, existing: &[Entry]) {
        if !decrement_total(&mut self.totals, entry) {
            warn!(%entry, "removing an entry that was never added");
            debug_assert!(false, "total for {entry} would go negative");
        }
        for other in existing {
            if other == entry {
                continue;
            }
            if !decrement_joint(&mut self.joint, &PairKey::new(entry, other)) {
                warn!(%entry, %other, "removing a pair that was never added");
                debug_assert!(false, "joint count for {entry}/{other} would go negative");
            }
        }
    }

    /// Undo everything a contact contributed.
    ///
    /// Walks the entries in order against a shrinking copy of the contact,
    /// which exactly reverses the pairwise counts of `initialize` or of
    /// repeated `add_entry` calls.
    pub fn remove_contact(&mut self, contact: &[Entry]) {
        let mut remaining: Vec<Entry> = contact.to_vec();
        for entry in contact {
            self.remove_entry(entry, &remaining);
            if let Some(pos) = remaining.iter().position(|e| e == entry) {
                remaining.remove(pos);
            }
        }
    }

    /// Empirical P(a | b): joint(a, b) / total(b), or 0 when `b` is unseen.
    ///
    /// No smoothing is applied.
    pub fn conditional_probability(&self, a: &Entry, b: &Entry) -> f64 {
        let denom = self.total(b);
        if denom == 0 {
            return 0.0;
        }
        self.joint(a, b) as f64 / denom as f64
    }

    /// Occurrences of `entry` across the book.
    pub fn total(&self, entry: &Entry) -> u64 {
        self.totals.get(entry).copied().unwrap_or(0)
    }

    /// Number of contacts carrying both `a` and `b`. Symmetric in its arguments.
    pub fn joint(&self, a: &Entry, b: &Entry) -> u64 {
        self.joint.get(&PairKey::new(a, b)).copied().unwrap_or(0)
    }

    /// Iterate observed entries with their totals, in no particular order.
    /// Entries whose total has dropped back to zero are still listed.
    pub fn iter(&self) -> impl Iterator<Item = (&Entry, u64)> {
        self.totals.iter().map(|(e, c)| (e, *c))
    }

    /// All entries ever observed, sorted.
    pub fn entries(&self) -> Vec<&Entry> {
        let mut entries: Vec<&Entry> = self.totals.keys().collect();
        entries.sort();
        entries
    }

    /// Number of distinct entries ever observed.
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// Whether every count is zero.
    pub fn is_empty(&self) -> bool {
        self.joint.is_empty() && self.totals.values().all(|c| *c == 0)
    }

    /// Number of distinct pairs with a non-zero joint count.
    pub fn pair_count(&self) -> usize {
        self.joint.len()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn stats(&self) -> ModelStats {
        ModelStats {
            entries: self.totals.values().filter(|c| **c > 0).count(),
            pairs: self.joint.len(),
            observations: self.totals.values().sum(),
        }
    }

    /// Save to bincode file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut totals: Vec<(Entry, u64)> =
            self.totals.iter().map(|(e, c)| (e.clone(), *c)).collect();
        totals.sort();
        let mut joint: Vec<(Entry, Entry, u64)> = self
            .joint
            .iter()
            .map(|(p, c)| {
                let (low, high) = p.members();
                (low.clone(), high.clone(), *c)
            })
            .collect();
        joint.sort();
        let snapshot = ModelSnapshot {
            initialized: self.initialized,
            totals,
            joint,
        };

        let path = path.as_ref();
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, &snapshot)?;
        debug!(path = %path.display(), entries = snapshot.totals.len(), "saved co-occurrence model");
        Ok(())
    }

    /// Load from bincode file
    ///
    /// Pairs are re-keyed through `PairKey::new`, merging any duplicates, and
    /// zero joint counts are skipped.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let snapshot: ModelSnapshot = bincode::deserialize_from(reader)?;
        debug!(path = %path.display(), entries = snapshot.totals.len(), "loaded co-occurrence model");
        let mut joint: AHashMap<PairKey, u64> = AHashMap::new();
        for (a, b, count) in snapshot.joint {
            if count == 0 || a == b {
                continue;
            }
            *joint.entry(PairKey::new(&a, &b)).or_insert(0) += count;
        }
        Ok(Self {
            totals: snapshot.totals.into_iter().collect(),
            joint,
            initialized: snapshot.initialized,
        })
    }
}

/// Decrement an entry total, keeping the entry at zero. Returns false if
/// there was no count to take from.
fn decrement_total(totals: &mut AHashMap<Entry, u64>, entry: &Entry) -> bool {
    let Some(count) = totals.get_mut(entry) else {
        return false;
    };
    match count.checked_sub(1) {
        Some(next) => {
            *count = next;
            true
        }
        None => false,
    }
}

/// Decrement a joint count, dropping the bucket at zero. Returns false if
/// there was no count to take from.
fn decrement_joint(joint: &mut AHashMap<PairKey, u64>, pair: &PairKey) -> bool {
    let Some(count) = joint.get_mut(pair) else {
        return false;
    };
    match count.checked_sub(1) {
        Some(0) | None => {
            let had = *count > 0;
            joint.remove(pair);
            had
        }
        Some(next) => {
            *count = next;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(k: &str, v: &str) -> Entry {
        Entry::new(k, v)
    }

    #[test]
    fn add_entry_counts_totals_and_pairs() {
        let mut m = CoOccurrenceModel::new();
        let school = e("School", "Berkeley");
        let hair = e("Hair", "Brown");
        m.add_entry(&school, &[]);
        m.add_entry(&hair, &[school.clone()]);

        assert_eq!(m.total(&school), 1);
        assert_eq!(m.total(&hair), 1);
        assert_eq!(m.joint(&school, &hair), 1);
        assert_eq!(m.joint(&hair, &school), 1);
        assert_eq!(m.pair_count(), 1);
    }

    #[test]
    fn unseen_lookups_are_zero() {
        let m = CoOccurrenceModel::new();
        let a = e("a", "1");
        let b = e("b", "2");
        assert_eq!(m.total(&a), 0);
        assert_eq!(m.joint(&a, &b), 0);
        assert_eq!(m.conditional_probability(&a, &b), 0.0);
    }

    #[test]
    fn conditional_probability_divides_by_given_total() {
        let mut m = CoOccurrenceModel::new();
        let a = e("Hair", "Brown");
        let b = e("School", "Berkeley");
        m.initialize(&[vec![a.clone(), b.clone()], vec![b.clone()]])
            .unwrap();

        // P(a | b) = 1 / 2, P(b | a) = 1 / 1
        assert!((m.conditional_probability(&a, &b) - 0.5).abs() < 1e-12);
        assert!((m.conditional_probability(&b, &a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn remove_entry_skips_self_pair() {
        let mut m = CoOccurrenceModel::new();
        let a = e("a", "1");
        let b = e("b", "2");
        m.add_entry(&a, &[]);
        m.add_entry(&b, &[a.clone()]);

        // existing still lists `b` itself
        m.remove_entry(&b, &[a.clone(), b.clone()]);
        assert_eq!(m.total(&b), 0);
        assert_eq!(m.joint(&a, &b), 0);
        assert_eq!(m.total(&a), 1);
    }

    #[test]
    fn second_initialize_is_rejected() {
        let mut m = CoOccurrenceModel::new();
        m.initialize(&[vec![e("a", "1")]]).unwrap();
        assert!(matches!(
            m.initialize(&[vec![e("a", "1")]]),
            Err(Error::AlreadyInitialized)
        ));
        assert_eq!(m.total(&e("a", "1")), 1);
    }

    #[test]
    fn initialize_after_incremental_update_is_rejected() {
        let mut m = CoOccurrenceModel::new();
        m.add_entry(&e("a", "1"), &[]);
        assert!(m.initialize(&[vec![e("b", "2")]]).is_err());

        // still rejected once the update is undone
        m.remove_entry(&e("a", "1"), &[]);
        assert!(m.is_empty());
        assert!(m.initialize(&[vec![e("b", "2")]]).is_err());
    }

    #[test]
    fn duplicate_entries_unwind_cleanly() {
        let a = e("a", "1");
        let b = e("b", "2");
        let contact = vec![a.clone(), b.clone(), a.clone()];
        let mut m = CoOccurrenceModel::new();
        m.initialize(&[contact.clone()]).unwrap();
        assert_eq!(m.total(&a), 2);

        m.remove_contact(&contact);
        assert!(m.is_empty());
    }

    #[test]
    fn stats_sum_observations() {
        let mut m = CoOccurrenceModel::new();
        m.initialize(&[
            vec![e("a", "1"), e("b", "2")],
            vec![e("a", "1"), e("c", "3")],
        ])
        .unwrap();
        let stats = m.stats();
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.pairs, 2);
        assert_eq!(stats.observations, 4);
    }

    #[test]
    fn removed_entry_stays_observed_at_zero() {
        let school = e("School", "Berkeley");
        let chase = e("Name", "Chase Norman");
        let david = e("Name", "David Shen");
        let mut m = CoOccurrenceModel::new();
        m.initialize(&[
            vec![school.clone(), chase.clone()],
            vec![school.clone(), david.clone()],
        ])
        .unwrap();

        m.remove_contact(&[school.clone(), chase.clone()]);
        assert_eq!(m.total(&chase), 0);
        assert_eq!(m.joint(&school, &chase), 0);
        assert_eq!(m.len(), 3);
        assert!(m.entries().contains(&&chase));
        assert_eq!(m.stats().entries, 2);
        assert_eq!(m.pair_count(), 1);
        assert!(!m.is_empty());

        // a second removal has nothing left to take
        m.add_entry(&chase, &[]);
        m.remove_entry(&chase, &[]);
        assert_eq!(m.total(&chase), 0);
    }

    #[test]
    fn load_rekeys_pairs_and_skips_zero_counts() {
        let a = e("a", "1");
        let b = e("b", "2");
        let c = e("c", "3");
        // members stored high-then-low, plus a dead pair
        let snapshot = ModelSnapshot {
            initialized: true,
            totals: vec![(a.clone(), 1), (b.clone(), 1), (c.clone(), 0)],
            joint: vec![(b.clone(), a.clone(), 1), (c.clone(), a.clone(), 0)],
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bincode");
        let file = File::create(&path).unwrap();
        bincode::serialize_into(BufWriter::new(file), &snapshot).unwrap();

        let mut m = CoOccurrenceModel::load(&path).unwrap();
        assert_eq!(m.joint(&a, &b), 1);
        assert_eq!(m.joint(&b, &a), 1);
        assert_eq!(m.joint(&a, &c), 0);
        assert_eq!(m.pair_count(), 1);

        m.remove_contact(&[a.clone(), b.clone()]);
        assert!(m.is_empty());
        assert_eq!(m.pair_count(), 0);
    }

    #[test]
    fn save_load_keeps_zero_totals() {
        let a = e("a", "1");
        let b = e("b", "2");
        let mut m = CoOccurrenceModel::new();
        m.initialize(&[vec![a.clone(), b.clone()], vec![a.clone()]])
            .unwrap();
        m.remove_contact(&[a.clone(), b.clone()]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bincode");
        m.save(&path).unwrap();
        let loaded = CoOccurrenceModel::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.total(&b), 0);
        assert_eq!(loaded.total(&a), 1);
        assert_eq!(loaded.stats(), m.stats());
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "would go negative")]
    fn removing_unknown_entry_asserts_in_debug() {
        let mut m = CoOccurrenceModel::new();
        m.remove_entry(&e("ghost", "x"), &[]);
    }
}
