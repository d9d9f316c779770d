//! Thread-safe handle over a `ContactBook`.
//!
//! Edits take the write lock, queries take the read lock, so readers never
//! observe a half-applied pair update and may run alongside each other.

use crate::book::{ContactBook, ContactId};
use crate::cooccurrence::ModelStats;
use crate::entry::{Contact, Entry};
use crate::error::Result;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A `ContactBook` shared between threads. Clones refer to the same book.
#[derive(Clone, Debug)]
pub struct SharedBook {
    inner: Arc<RwLock<ContactBook>>,
}

impl SharedBook {
    pub fn new(book: ContactBook) -> Self {
        Self {
            inner: Arc::new(RwLock::new(book)),
        }
    }

    // Poisoned locks are recovered rather than propagated.
    fn read(&self) -> RwLockReadGuard<'_, ContactBook> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ContactBook> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `f` with shared access to the book.
    pub fn with_read<R>(&self, f: impl FnOnce(&ContactBook) -> R) -> R {
        f(&self.read())
    }

    /// Run `f` with exclusive access to the book.
    pub fn with_write<R>(&self, f: impl FnOnce(&mut ContactBook) -> R) -> R {
        f(&mut self.write())
    }

    pub fn add_contact(&self, contact: Contact) -> ContactId {
        self.write().add_contact(contact)
    }

    pub fn remove_contact(&self, id: ContactId) -> Result<Contact> {
        self.write().remove_contact(id)
    }

    pub fn add_entry(&self, id: ContactId, entry: Entry) -> Result<()> {
        self.write().add_entry(id, entry)
    }

    pub fn remove_entry(&self, id: ContactId, entry: &Entry) -> Result<bool> {
        self.write().remove_entry(id, entry)
    }

    pub fn replace_entry(&self, id: ContactId, old: &Entry, new: Entry) -> Result<bool> {
        self.write().replace_entry(id, old, new)
    }

    pub fn search(&self, query: &str) -> Vec<ContactId> {
        self.read().search(query)
    }

    pub fn suggestions(&self, existing: &[Entry]) -> Vec<Entry> {
        self.read().suggestions(existing)
    }

    pub fn suggest_key(&self, value: &str) -> Entry {
        self.read().suggest_key(value)
    }

    pub fn filter_entries(&self, query: &str) -> Vec<Entry> {
        self.read().filter_entries(query)
    }

    pub fn stats(&self) -> ModelStats {
        self.read().model().stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    #[test]
    fn clones_share_one_book() {
        let a = SharedBook::new(ContactBook::new(Config::default()));
        let b = a.clone();
        let id = a.add_contact(vec![Entry::new("Hair", "Brown")]);
        assert_eq!(b.search("brown"), vec![id]);
        assert_eq!(b.stats().entries, 1);
    }
}
