//! Secondary indexes built from composite keys.
//!
//! A relationship "record `pk` references `fk`" is stored as an index entry
//! under `encode(index_name, fk ++ [pk])` with a one-byte sentinel value. The
//! entries sort by foreign key, so "every record referencing `fk`" is one
//! prefix scan.

use crate::error::{ContractError, Result};
use crate::keys::codec;
use crate::state::{CursorGuard, StateStore};

/// Value stored under every index entry. The key carries all the information.
pub const INDEX_SENTINEL: &[u8] = &[0x00];

/// Index operations over a host state.
pub struct SecondaryIndex<'a> {
    state: &'a dyn StateStore,
}

impl<'a> SecondaryIndex<'a> {
    pub fn new(state: &'a dyn StateStore) -> Self {
        Self { state }
    }

    fn entry_key<S: AsRef<str>>(
        index_name: &str,
        foreign_key: &[S],
        primary_key: &str,
    ) -> Result<String> {
        let mut parts: Vec<&str> = foreign_key.iter().map(AsRef::as_ref).collect();
        parts.push(primary_key);
        codec::encode(index_name, &parts)
    }

    /// Record that `primary_key` references `foreign_key`. Re-adding is a no-op.
    pub fn add<S: AsRef<str>>(
        &self,
        index_name: &str,
        foreign_key: &[S],
        primary_key: &str,
    ) -> Result<()> {
        let key = Self::entry_key(index_name, foreign_key, primary_key)?;
        self.state.put_state(&key, INDEX_SENTINEL)?;
        tracing::trace!(index = index_name, primary_key, "index entry added");
        Ok(())
    }

    /// Drop the entry linking `primary_key` to `foreign_key`.
    pub fn remove<S: AsRef<str>>(
        &self,
        index_name: &str,
        foreign_key: &[S],
        primary_key: &str,
    ) -> Result<()> {
        let key = Self::entry_key(index_name, foreign_key, primary_key)?;
        self.state.del_state(&key)?;
        tracing::trace!(index = index_name, primary_key, "index entry removed");
        Ok(())
    }

    /// Move `primary_key` from `old_foreign_key` to `new_foreign_key`.
    ///
    /// Both keys are encoded before anything is written, so an invalid new
    /// key leaves the old entry in place.
    pub fn reindex<S: AsRef<str>, T: AsRef<str>>(
        &self,
        index_name: &str,
        old_foreign_key: &[S],
        new_foreign_key: &[T],
        primary_key: &str,
    ) -> Result<()> {
        let old_key = Self::entry_key(index_name, old_foreign_key, primary_key)?;
        let new_key = Self::entry_key(index_name, new_foreign_key, primary_key)?;
        if old_key == new_key {
            return Ok(());
        }

        self.state.del_state(&old_key)?;
        self.state.put_state(&new_key, INDEX_SENTINEL)?;
        tracing::debug!(index = index_name, primary_key, "index entry moved");
        Ok(())
    }

    /// Primary keys referencing `foreign_key`, in index order.
    pub fn lookup<S: AsRef<str>>(
        &self,
        index_name: &str,
        foreign_key: &[S],
    ) -> Result<IndexLookup<'a>> {
        let parts: Vec<String> = foreign_key.iter().map(|p| p.as_ref().to_string()).collect();
        let cursor = self
            .state
            .state_by_partial_composite_key(index_name, &parts)
            .map_err(|e| match e {
                ContractError::Store(source) => ContractError::IndexScan {
                    index: index_name.to_string(),
                    source,
                },
                other => other,
            })?;

        Ok(IndexLookup {
            index_name: index_name.to_string(),
            state: self.state,
            cursor: CursorGuard::new(cursor),
        })
    }
}

/// Lazy iterator over the primary keys of one index scan.
///
/// The underlying cursor is released when the lookup is closed or dropped.
pub struct IndexLookup<'a> {
    index_name: String,
    state: &'a dyn StateStore,
    cursor: CursorGuard<'a>,
}

impl IndexLookup<'_> {
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Release the scan now.
    pub fn close(self) -> Result<()> {
        let index = self.index_name;
        self.cursor
            .close()
            .map_err(|source| ContractError::IndexScan { index, source })
    }
}

impl Iterator for IndexLookup<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.cursor.next()? {
            Ok(entry) => entry,
            Err(source) => {
                return Some(Err(ContractError::IndexScan {
                    index: self.index_name.clone(),
                    source,
                }))
            }
        };

        let primary_key = self
            .state
            .split_composite_key(&entry.key)
            .and_then(|key| {
                key.into_primary_key()
                    .ok_or_else(|| ContractError::MalformedKey(entry.key.clone()))
            });
        Some(primary_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Fault, MemoryState};

    fn collect(index: &SecondaryIndex<'_>, name: &str, fk: &[&str]) -> Vec<String> {
        index
            .lookup(name, fk)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_lookup_by_prefix() {
        let state = MemoryState::new();
        let index = SecondaryIndex::new(&state);

        index.add("idx", &["A"], "K1").unwrap();
        index.add("idx", &["A"], "K2").unwrap();
        index.add("idx", &["B"], "K3").unwrap();

        assert_eq!(collect(&index, "idx", &["A"]), vec!["K1", "K2"]);
        assert_eq!(collect(&index, "idx", &["B"]), vec!["K3"]);
        assert!(collect(&index, "idx", &["C"]).is_empty());
        assert!(collect(&index, "other", &["A"]).is_empty());
        assert_eq!(state.stats().open_cursors, 0);
    }

    #[test]
    fn test_add_idempotent() {
        let state = MemoryState::new();
        let index = SecondaryIndex::new(&state);

        index.add("idx", &["A"], "K1").unwrap();
        index.add("idx", &["A"], "K1").unwrap();

        assert_eq!(collect(&index, "idx", &["A"]), vec!["K1"]);
        assert_eq!(state.stats().keys, 1);
    }

    #[test]
    fn test_multi_part_foreign_key() {
        let state = MemoryState::new();
        let index = SecondaryIndex::new(&state);

        index.add("idx", &["A", "x"], "K1").unwrap();
        index.add("idx", &["A", "y"], "K2").unwrap();

        assert_eq!(collect(&index, "idx", &["A"]), vec!["K1", "K2"]);
        assert_eq!(collect(&index, "idx", &["A", "y"]), vec!["K2"]);
    }

    #[test]
    fn test_remove_and_reindex() {
        let state = MemoryState::new();
        let index = SecondaryIndex::new(&state);

        index.add("idx", &["A"], "K1").unwrap();
        index.add("idx", &["A"], "K2").unwrap();

        index.reindex("idx", &["A"], &["B"], "K1").unwrap();
        assert_eq!(collect(&index, "idx", &["A"]), vec!["K2"]);
        assert_eq!(collect(&index, "idx", &["B"]), vec!["K1"]);

        index.remove("idx", &["A"], "K2").unwrap();
        assert!(collect(&index, "idx", &["A"]).is_empty());
    }

    #[test]
    fn test_reindex_same_key_writes_nothing() {
        let state = MemoryState::new();
        let index = SecondaryIndex::new(&state);
        index.add("idx", &["A"], "K1").unwrap();
        let writes = state.stats().writes;

        index.reindex("idx", &["A"], &["A"], "K1").unwrap();
        assert_eq!(state.stats().writes, writes);
    }

    #[test]
    fn test_reindex_invalid_target_keeps_entry() {
        let state = MemoryState::new();
        let index = SecondaryIndex::new(&state);
        index.add("idx", &["A"], "K1").unwrap();

        let result = index.reindex("idx", &["A"], &["B\u{0}"], "K1");
        assert!(matches!(result, Err(ContractError::InvalidKeyPart(_))));
        assert_eq!(collect(&index, "idx", &["A"]), vec!["K1"]);
    }

    #[test]
    fn test_add_rejects_separator() {
        let state = MemoryState::new();
        let index = SecondaryIndex::new(&state);

        let result = index.add("idx", &["A\u{0}B"], "K1");
        assert!(matches!(result, Err(ContractError::InvalidKeyPart(_))));
        assert_eq!(state.stats().writes, 0);
    }

    #[test]
    fn test_scan_failure_is_index_scan_error() {
        let state = MemoryState::new();
        let index = SecondaryIndex::new(&state);
        index.add("idx", &["A"], "K1").unwrap();

        state.inject_fault(Fault::OpenScan);
        assert!(matches!(
            index.lookup("idx", &["A"]),
            Err(ContractError::IndexScan { .. })
        ));

        state.inject_fault(Fault::ScanAfter(0));
        let mut lookup = index.lookup("idx", &["A"]).unwrap();
        assert!(matches!(
            lookup.next(),
            Some(Err(ContractError::IndexScan { .. }))
        ));
        drop(lookup);
        assert_eq!(state.stats().open_cursors, 0);
    }

    #[test]
    fn test_early_close_releases_cursor() {
        let state = MemoryState::new();
        let index = SecondaryIndex::new(&state);
        for i in 0..5 {
            index.add("idx", &["A"], &format!("K{}", i)).unwrap();
        }

        let mut lookup = index.lookup("idx", &["A"]).unwrap();
        assert_eq!(lookup.next().unwrap().unwrap(), "K0");
        assert_eq!(state.stats().open_cursors, 1);
        lookup.close().unwrap();
        assert_eq!(state.stats().open_cursors, 0);
    }
}
