//! Composite key encoding.
//!
//! A composite key flattens `(index_name, [part, ...])` into one string the
//! ordered state can range-scan:
//!
//! ```text
//! U+0000 index_name U+0000 part_1 U+0000 ... part_n U+0000
//! ```
//!
//! The leading U+0000 keeps composite keys out of the simple-key namespace.
//! Since U+0000 sorts below every other code point, byte order of encoded keys
//! matches the lexicographic order of the part tuples, so every key sharing a
//! leading run of parts falls inside `[encode(prefix), encode(prefix) + U+10FFFF)`.

use crate::error::{ContractError, Result};

/// Namespace marker and part separator.
pub const SEPARATOR: char = '\u{0}';

/// Highest code point; reserved as the exclusive upper bound of prefix scans.
pub const MAX_CODE_POINT: char = '\u{10FFFF}';

/// A decoded composite key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey {
    index_name: String,
    parts: Vec<String>,
}

impl CompositeKey {
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Consume the key and return its last part; for index entries this is
    /// the referenced primary key.
    pub fn into_primary_key(mut self) -> Option<String> {
        self.parts.pop()
    }
}

/// Reject strings that would make an encoded key ambiguous or escape a prefix range.
pub fn validate_part(part: &str) -> Result<()> {
    if let Some(c) = part.chars().find(|&c| c == SEPARATOR || c == MAX_CODE_POINT) {
        return Err(ContractError::InvalidKeyPart(format!(
            "{:?} contains reserved code point U+{:04X}",
            part, c as u32
        )));
    }
    Ok(())
}

fn validate_index_name(index_name: &str) -> Result<()> {
    if index_name.is_empty() {
        return Err(ContractError::InvalidKeyPart(
            "index name must not be empty".into(),
        ));
    }
    validate_part(index_name)
}

/// Encode an index name and its parts into a flat key.
pub fn encode<S: AsRef<str>>(index_name: &str, parts: &[S]) -> Result<String> {
    validate_index_name(index_name)?;

    let mut capacity = index_name.len() + 2;
    for part in parts {
        let part = part.as_ref();
        validate_part(part)?;
        capacity += part.len() + 1;
    }

    let mut key = String::with_capacity(capacity);
    key.push(SEPARATOR);
    key.push_str(index_name);
    key.push(SEPARATOR);
    for part in parts {
        key.push_str(part.as_ref());
        key.push(SEPARATOR);
    }
    Ok(key)
}

/// Split a flat key back into its index name and parts.
pub fn decode(flat: &str) -> Result<CompositeKey> {
    let body = flat
        .strip_prefix(SEPARATOR)
        .and_then(|rest| rest.strip_suffix(SEPARATOR))
        .ok_or_else(|| ContractError::MalformedKey(flat.to_string()))?;

    if body.contains(MAX_CODE_POINT) {
        return Err(ContractError::MalformedKey(flat.to_string()));
    }

    let mut pieces = body.split(SEPARATOR);
    let index_name = match pieces.next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Err(ContractError::MalformedKey(flat.to_string())),
    };

    Ok(CompositeKey {
        index_name,
        parts: pieces.map(str::to_string).collect(),
    })
}

/// Bounds `[start, end)` covering every key that extends `encode(index_name, parts)`.
pub fn prefix_range<S: AsRef<str>>(index_name: &str, parts: &[S]) -> Result<(String, String)> {
    let start = encode(index_name, parts)?;
    let mut end = String::with_capacity(start.len() + MAX_CODE_POINT.len_utf8());
    end.push_str(&start);
    end.push(MAX_CODE_POINT);
    Ok((start, end))
}
