//! Reading contact books from JSON.
//!
//! A book file is an array of contacts, each an array of entries:
//!
//! ```json
//! [
//!   [{"key": "Name", "value": "Chase Norman"}, {"key": "Hair", "value": "Brown"}],
//!   [{"key": "Name", "value": "David Shen"}]
//! ]
//! ```

use anyhow::{Context, Result};
use std::path::Path;
use thymesia_core::Contact;

pub fn load_book(path: &Path) -> Result<Vec<Contact>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading book {}", path.display()))?;
    parse_book(&content).with_context(|| format!("parsing book {}", path.display()))
}

pub fn parse_book(content: &str) -> Result<Vec<Contact>> {
    let book: Vec<Contact> = serde_json::from_str(content)?;
    Ok(book)
}
