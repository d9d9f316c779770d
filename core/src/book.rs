//! Contact book facade.
//!
//! `ContactBook` owns the contacts, their co-occurrence model and the config,
//! and routes every edit through the model's paired add/remove calls so the
//! statistics always describe the contacts actually held.

use crate::cooccurrence::CoOccurrenceModel;
use crate::entry::{Contact, Entry};
use crate::error::{Error, Result};
use crate::ranker::rank_entries;
use crate::search::{contact_matches, search, tokenize};
use crate::suggestion::SuggestionEngine;
use crate::Config;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Opaque handle for a contact in a `ContactBook`. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContactId(pub u64);

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Contacts in insertion order plus the statistics derived from them.
#[derive(Debug, Clone, Default)]
pub struct ContactBook {
    // parallel vectors: ids[i] names contacts[i]
    ids: Vec<ContactId>,
    contacts: Vec<Contact>,
    model: CoOccurrenceModel,
    config: Config,
    next_id: u64,
}

impl ContactBook {
    /// Create an empty book.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Build a book from a snapshot of contacts, bulk-initializing the model.
    /// Ids are assigned in the order given.
    pub fn from_contacts(contacts: Vec<Contact>, config: Config) -> Result<Self> {
        let mut model = CoOccurrenceModel::new();
        model.initialize(&contacts)?;
        let ids = (0..contacts.len() as u64).map(ContactId).collect();
        Ok(Self {
            next_id: contacts.len() as u64,
            ids,
            contacts,
            model,
            config,
        })
    }

    // ========== Editing ==========

    /// Add a new contact, feeding its entries to the model in order.
    pub fn add_contact(&mut self, contact: Contact) -> ContactId {
        for (i, entry) in contact.iter().enumerate() {
            self.model.add_entry(entry, &contact[..i]);
        }
        let id = ContactId(self.next_id);
        self.next_id += 1;
        debug!(%id, entries = contact.len(), "added contact");
        self.ids.push(id);
        self.contacts.push(contact);
        id
    }

    /// Delete a contact and withdraw its statistics.
    pub fn remove_contact(&mut self, id: ContactId) -> Result<Contact> {
        let pos = self.position(id)?;
        self.ids.remove(pos);
        let contact = self.contacts.remove(pos);
        self.model.remove_contact(&contact);
        debug!(%id, entries = contact.len(), "removed contact");
        Ok(contact)
    }

    /// Append an entry to a contact.
    pub fn add_entry(&mut self, id: ContactId, entry: Entry) -> Result<()> {
        let pos = self.position(id)?;
        let contact = &mut self.contacts[pos];
        self.model.add_entry(&entry, contact);
        contact.push(entry);
        Ok(())
    }

    /// Remove the first occurrence of `entry` from a contact. Returns false if
    /// the contact does not carry it.
    pub fn remove_entry(&mut self, id: ContactId, entry: &Entry) -> Result<bool> {
        let pos = self.position(id)?;
        let contact = &mut self.contacts[pos];
        let Some(at) = contact.iter().position(|e| e == entry) else {
            return Ok(false);
        };
        self.model.remove_entry(entry, contact);
        contact.remove(at);
        Ok(true)
    }

    /// Swap `old` for `new` in place, keeping its position in the contact.
    /// Returns false if the contact does not carry `old`.
    pub fn replace_entry(&mut self, id: ContactId, old: &Entry, new: Entry) -> Result<bool> {
        let pos = self.position(id)?;
        let contact = &mut self.contacts[pos];
        let Some(at) = contact.iter().position(|e| e == old) else {
            return Ok(false);
        };
        self.model.remove_entry(old, contact);
        contact.remove(at);
        self.model.add_entry(&new, contact);
        contact.insert(at, new);
        Ok(true)
    }

    // ========== Accessors ==========

    pub fn contact(&self, id: ContactId) -> Option<&[Entry]> {
        self.position(id).ok().map(|pos| self.contacts[pos].as_slice())
    }

    /// Contacts with their ids, in insertion order.
    pub fn contacts(&self) -> impl Iterator<Item = (ContactId, &[Entry])> {
        self.ids
            .iter()
            .copied()
            .zip(self.contacts.iter().map(|c| c.as_slice()))
    }

    pub fn ids(&self) -> &[ContactId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn model(&self) -> &CoOccurrenceModel {
        &self.model
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Write the model's statistics to a bincode file.
    pub fn save_model<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.model.save(path)
    }

    // ========== Queries ==========

    /// Ids of contacts matching `query`, in book order.
    pub fn search(&self, query: &str) -> Vec<ContactId> {
        search(query, &self.contacts, &self.ids)
    }

    /// Next-attribute suggestions for a draft contact holding `existing`,
    /// with hidden keys, existing entries and the limit applied per config.
    pub fn suggestions(&self, existing: &[Entry]) -> Vec<Entry> {
        let mut out: Vec<Entry> = SuggestionEngine::new(&self.model)
            .generate_suggestions(existing)
            .into_iter()
            .filter(|e| !self.config.is_hidden(&e.key))
            .filter(|e| !(self.config.hide_existing && existing.contains(e)))
            .collect();
        Config::apply_limit(&mut out, self.config.max_suggestions);
        out
    }

    /// Suggestions for a stored contact.
    pub fn suggestions_for(&self, id: ContactId) -> Result<Vec<Entry>> {
        let pos = self.position(id)?;
        Ok(self.suggestions(&self.contacts[pos]))
    }

    /// Guess the key for a typed value, falling back on the values already
    /// filed under each key in this book.
    pub fn suggest_key(&self, value: &str) -> Entry {
        SuggestionEngine::new(&self.model).suggest_key(value, &self.values_by_key())
    }

    /// Distinct values per key across the book, in first-seen order.
    pub fn values_by_key(&self) -> HashMap<String, Vec<String>> {
        let mut out: HashMap<String, Vec<String>> = HashMap::new();
        for entry in self.contacts.iter().flatten() {
            let values = out.entry(entry.key.clone()).or_default();
            if !values.contains(&entry.value) {
                values.push(entry.value.clone());
            }
        }
        out
    }

    /// Quick-filter entries for the contacts matching `query`, most even split
    /// first.
    pub fn filter_entries(&self, query: &str) -> Vec<Entry> {
        let tokens = tokenize(query);
        let matching: Vec<&Contact> = self
            .contacts
            .iter()
            .filter(|c| contact_matches(c, &tokens))
            .collect();
        let mut out: Vec<Entry> = rank_entries(&matching)
            .into_iter()
            .filter(|e| !self.config.is_hidden(&e.key))
            .collect();
        Config::apply_limit(&mut out, self.config.max_filters);
        out
    }

    fn position(&self, id: ContactId) -> Result<usize> {
        self.ids
            .iter()
            .position(|i| *i == id)
            .ok_or(Error::UnknownContact(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(k: &str, v: &str) -> Entry {
        Entry::new(k, v)
    }

    #[test]
    fn incremental_adds_match_bulk_initialize() {
        let contacts = vec![
            vec![e("School", "Berkeley"), e("Hair", "Brown")],
            vec![e("School", "Berkeley"), e("Hair", "Black")],
        ];
        let bulk = ContactBook::from_contacts(contacts.clone(), Config::default()).unwrap();
        let mut incremental = ContactBook::new(Config::default());
        for c in contacts {
            incremental.add_contact(c);
        }
        assert_eq!(bulk.model().stats(), incremental.model().stats());
        assert_eq!(bulk.ids(), incremental.ids());
        let school = e("School", "Berkeley");
        let brown = e("Hair", "Brown");
        assert_eq!(
            bulk.model().joint(&school, &brown),
            incremental.model().joint(&school, &brown)
        );
    }

    #[test]
    fn replace_entry_keeps_position_and_counts() {
        let mut book = ContactBook::new(Config::default());
        let id = book.add_contact(vec![e("Name", "Ada"), e("Hair", "Brown"), e("City", "Oakland")]);

        assert!(book.replace_entry(id, &e("Hair", "Brown"), e("Hair", "Red")).unwrap());
        assert_eq!(
            book.contact(id).unwrap(),
            &[e("Name", "Ada"), e("Hair", "Red"), e("City", "Oakland")]
        );
        let m = book.model();
        assert_eq!(m.total(&e("Hair", "Brown")), 0);
        assert_eq!(m.joint(&e("Hair", "Brown"), &e("Name", "Ada")), 0);
        assert_eq!(m.joint(&e("Hair", "Red"), &e("Name", "Ada")), 1);
        assert_eq!(m.joint(&e("Hair", "Red"), &e("City", "Oakland")), 1);
    }

    #[test]
    fn remove_missing_entry_is_noop() {
        let mut book = ContactBook::new(Config::default());
        let id = book.add_contact(vec![e("a", "1")]);
        assert!(!book.remove_entry(id, &e("b", "2")).unwrap());
        assert_eq!(book.model().total(&e("a", "1")), 1);
    }

    #[test]
    fn unknown_contact_is_an_error() {
        let mut book = ContactBook::new(Config::default());
        let id = book.add_contact(vec![e("a", "1")]);
        book.remove_contact(id).unwrap();
        assert!(matches!(
            book.add_entry(id, e("b", "2")),
            Err(Error::UnknownContact(missing)) if missing == id
        ));
        assert!(book.contact(id).is_none());
    }

    #[test]
    fn values_by_key_dedupes_in_first_seen_order() {
        let book = ContactBook::from_contacts(
            vec![
                vec![e("Hair", "Brown"), e("School", "Berkeley")],
                vec![e("Hair", "Black")],
                vec![e("Hair", "Brown")],
            ],
            Config::default(),
        )
        .unwrap();
        let values = book.values_by_key();
        assert_eq!(values["Hair"], vec!["Brown", "Black"]);
        assert_eq!(values["School"], vec!["Berkeley"]);
    }

    #[test]
    fn suggestions_respect_config() {
        let mut config = Config::default();
        config.hide_key("Name");
        config.max_suggestions = 1;
        let book = ContactBook::from_contacts(
            vec![
                vec![e("Name", "Ada"), e("Team", "Core"), e("Office", "HQ")],
                vec![e("Name", "Bo"), e("Team", "Core"), e("Office", "HQ")],
            ],
            config,
        )
        .unwrap();

        let out = book.suggestions(&[e("Team", "Core")]);
        assert_eq!(out, vec![e("Office", "HQ")]);
    }
}
