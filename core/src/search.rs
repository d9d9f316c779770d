//! Token search over a contact book.
//!
//! A query is reduced to ASCII letters, digits, spaces and colons, then split
//! on whitespace. A contact matches when every token is a case-insensitive
//! substring of at least one of its `key:value` renderings. Tokens may be
//! satisfied by different entries.

use crate::entry::Entry;

/// Normalize a query into lowercase search tokens.
///
/// Anything outside `[A-Za-z0-9 :]` is dropped silently, so `"hair:brown!"`
/// and `"Hair:Brown"` produce the same single token.
pub fn tokenize(query: &str) -> Vec<String> {
    let kept: String = query
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ' || *c == ':')
        .collect();
    kept.split_whitespace()
        .map(|t| t.to_ascii_lowercase())
        .collect()
}

/// Whether `contact` satisfies every token. Tokens must already be lowercase
/// (as `tokenize` returns them).
pub fn contact_matches(contact: &[Entry], tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return true;
    }
    let rendered: Vec<String> = contact
        .iter()
        .map(|e| e.to_string().to_lowercase())
        .collect();
    tokens
        .iter()
        .all(|token| rendered.iter().any(|r| r.contains(token.as_str())))
}

/// Identifiers of the contacts matching `query`, in book order.
///
/// `identifiers` runs parallel to `book`; an empty query returns all of them.
pub fn search<C, I>(query: &str, book: &[C], identifiers: &[I]) -> Vec<I>
where
    C: AsRef<[Entry]>,
    I: Clone,
{
    let tokens = tokenize(query);
    book.iter()
        .zip(identifiers)
        .filter(|(contact, _)| contact_matches(contact.as_ref(), &tokens))
        .map(|(_, id)| id.clone())
        .collect()
}
