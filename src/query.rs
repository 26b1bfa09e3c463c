//! Range-scan aggregation into query results.

use crate::error::{ContractError, Result};
use crate::index::SecondaryIndex;
use crate::keys::KeySpace;
use crate::state::{CursorGuard, StateStore};

/// One row of a query result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryEntry {
    pub key: String,
    /// Raw stored bytes; `None` when an indexed record no longer exists.
    pub record: Option<Vec<u8>>,
}

/// Ordered rows produced by one scan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryResult {
    entries: Vec<QueryEntry>,
}

impl QueryResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: String, record: Option<Vec<u8>>) {
        self.entries.push(QueryEntry { key, record });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[QueryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QueryEntry> {
        self.entries.iter()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    /// Serialize as `[{"Key":"k", "Record":<bytes>},...]`.
    ///
    /// Record bytes are embedded verbatim and never parsed: a corrupt stored
    /// value yields a corrupt document. Missing records are written as `null`.
    /// Keys are JSON string-escaped.
    pub fn to_write_through_json(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.estimated_size());
        buffer.push(b'[');

        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                buffer.push(b',');
            }
            buffer.extend_from_slice(b"{\"Key\":");
            write_json_string(&mut buffer, &entry.key);
            buffer.extend_from_slice(b", \"Record\":");
            match &entry.record {
                Some(record) => buffer.extend_from_slice(record),
                None => buffer.extend_from_slice(b"null"),
            }
            buffer.push(b'}');
        }

        buffer.push(b']');
        buffer
    }

    /// Like [`QueryResult::to_write_through_json`], but parses every record
    /// first and re-encodes it; fails on the first record that is not JSON.
    pub fn to_validated_json(&self) -> Result<Vec<u8>> {
        let mut rows = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            let record = match &entry.record {
                Some(bytes) => serde_json::from_slice::<serde_json::Value>(bytes).map_err(|e| {
                    ContractError::Serialization(format!("record {:?}: {}", entry.key, e))
                })?,
                None => serde_json::Value::Null,
            };
            let mut row = serde_json::Map::new();
            row.insert("Key".into(), serde_json::Value::String(entry.key.clone()));
            row.insert("Record".into(), record);
            rows.push(serde_json::Value::Object(row));
        }
        Ok(serde_json::to_vec(&rows)?)
    }

    fn estimated_size(&self) -> usize {
        2 + self
            .entries
            .iter()
            .map(|e| e.key.len() + e.record.as_ref().map_or(4, Vec::len) + 24)
            .sum::<usize>()
    }
}

impl IntoIterator for QueryResult {
    type Item = QueryEntry;
    type IntoIter = std::vec::IntoIter<QueryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'r> IntoIterator for &'r QueryResult {
    type Item = &'r QueryEntry;
    type IntoIter = std::slice::Iter<'r, QueryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn write_json_string(buffer: &mut Vec<u8>, s: &str) {
    // Serializing a &str into a Vec cannot fail.
    if serde_json::to_writer(&mut *buffer, s).is_err() {
        buffer.extend_from_slice(b"\"\"");
    }
}

/// Drives scans and collects their rows.
pub struct QueryAggregator<'a> {
    state: &'a dyn StateStore,
}

impl<'a> QueryAggregator<'a> {
    pub fn new(state: &'a dyn StateStore) -> Self {
        Self { state }
    }

    /// Every entry in `[start, end)`, values passed through untouched.
    ///
    /// A failure part-way through aborts the whole result.
    pub fn collect_range(&self, start: &str, end: &str) -> Result<QueryResult> {
        let mut cursor = CursorGuard::new(self.state.state_by_range(start, end)?);
        let mut result = QueryResult::new();

        for entry in cursor.by_ref() {
            let entry = entry?;
            result.push(entry.key, Some(entry.value));
        }
        cursor.close()?;

        tracing::debug!(start, end, rows = result.len(), "collected range");
        Ok(result)
    }

    /// Every record of a key space.
    pub fn collect_key_space(&self, space: KeySpace) -> Result<QueryResult> {
        let (start, end) = space.range();
        self.collect_range(&start, &end)
    }

    /// Records referencing `foreign_key` through `index_name`.
    ///
    /// A primary key whose record is gone is kept with `record: None`.
    pub fn collect_by_index<S: AsRef<str>>(
        &self,
        index_name: &str,
        foreign_key: &[S],
    ) -> Result<QueryResult> {
        let mut lookup = SecondaryIndex::new(self.state).lookup(index_name, foreign_key)?;
        let mut result = QueryResult::new();

        for primary_key in lookup.by_ref() {
            let primary_key = primary_key?;
            let record = self.state.get_state(&primary_key)?;
            if record.is_none() {
                tracing::warn!(
                    index = index_name,
                    primary_key = %primary_key,
                    "index entry points at a missing record"
                );
            }
            result.push(primary_key, record);
        }
        lookup.close()?;

        tracing::debug!(index = index_name, rows = result.len(), "collected by index");
        Ok(result)
    }
}
