//! Query normalization and free-text parsing.
//!
//! A [`QueryKey`] is the identity of one logical lookup: two queries that
//! normalize to the same key share a cache entry and an in-flight fetch.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::{LookupError, Result};

/// `<N>/<Total>`, optionally parenthesised.
static NUMBERING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(?\s*(\d+)\s*/\s*(\d+)\s*\)?").expect("numbering pattern is valid")
});

/// Normalized `(name, number, total)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    name: String,
    number: String,
    total: u32,
}

impl QueryKey {
    /// Normalize raw input into a key.
    ///
    /// The name is diacritics-stripped, lowercased and whitespace-collapsed;
    /// the number loses leading zeros.
    pub fn new(raw_name: &str, raw_number: &str, total: u32) -> Result<Self> {
        let name = strip_diacritics(&collapse_whitespace(raw_name)).to_lowercase();
        if name.is_empty() {
            return Err(LookupError::InvalidQuery("card name is empty".into()));
        }
        Ok(Self {
            name,
            number: normalize_number(raw_number)?,
            total,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn total(&self) -> u32 {
        self.total
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.name, self.number, self.total)
    }
}

/// A normalized lookup plus the forms of the name needed around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardQuery {
    key: QueryKey,
    /// Name as the user typed it (whitespace collapsed), for messages.
    display_name: String,
    /// Diacritics-stripped name with original casing, sent upstream.
    search_name: String,
}

impl CardQuery {
    pub fn new(raw_name: &str, raw_number: &str, total: u32) -> Result<Self> {
        let key = QueryKey::new(raw_name, raw_number, total)?;
        let display_name = collapse_whitespace(raw_name);
        let search_name = strip_diacritics(&display_name);
        Ok(Self {
            key,
            display_name,
            search_name,
        })
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn number(&self) -> &str {
        self.key.number()
    }

    pub fn total(&self) -> u32 {
        self.key.total()
    }

    /// Value of the catalog's `q` search parameter.
    pub fn search_param(&self) -> String {
        format!(
            "name:\"{}\" number:\"{}\"",
            self.search_name.replace('"', ""),
            self.key.number
        )
    }
}

/// Result of parsing free text such as `Pikachu (58/102)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub name: String,
    pub number: String,
    pub total: u32,
}

/// Parse `<Name> (<N>/<Total>)` into its parts.
///
/// Parentheses are optional and spaces around `/` are tolerated. The name
/// is whatever precedes the numbering.
pub fn parse_query(text: &str) -> Result<ParsedQuery> {
    let invalid =
        || LookupError::InvalidQuery(format!("expected '<Name> (<N>/<Total>)', got '{text}'"));

    let caps = NUMBERING.captures(text).ok_or_else(invalid)?;
    let whole = caps.get(0).ok_or_else(invalid)?;
    let number = caps.get(1).ok_or_else(invalid)?.as_str();
    let total = caps
        .get(2)
        .ok_or_else(invalid)?
        .as_str()
        .parse::<u32>()
        .map_err(|_| invalid())?;

    let name = collapse_whitespace(&text[..whole.start()]);
    if name.is_empty() {
        return Err(invalid());
    }

    Ok(ParsedQuery {
        name,
        number: normalize_number(number)?,
        total,
    })
}

/// Decompose and drop combining marks: `Flabébé` → `Flabebe`.
pub fn strip_diacritics(s: &str) -> String {
    s.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_number(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(LookupError::InvalidQuery(format!(
            "card number must be digits, got '{raw}'"
        )));
    }
    let trimmed = raw.trim_start_matches('0');
    Ok(if trimmed.is_empty() { "0" } else { trimmed }.to_string())
}
