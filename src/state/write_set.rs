//! Write-set recording view over a host state.

use super::{ScanCursor, StateStore};
use crate::error::{Result, StoreResult};
use crate::keys::CompositeKey;
use parking_lot::Mutex;

/// Wraps a [`StateStore`] and records every key written or deleted through
/// it, in first-write order.
pub struct WriteSet<'a> {
    inner: &'a dyn StateStore,
    written: Mutex<Vec<String>>,
}

impl<'a> WriteSet<'a> {
    pub fn new(inner: &'a dyn StateStore) -> Self {
        Self {
            inner,
            written: Mutex::new(Vec::new()),
        }
    }

    /// Keys touched so far.
    pub fn keys(&self) -> Vec<String> {
        self.written.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.written.lock().is_empty()
    }

    fn record(&self, key: &str) {
        let mut written = self.written.lock();
        if !written.iter().any(|k| k == key) {
            written.push(key.to_string());
        }
    }
}

impl StateStore for WriteSet<'_> {
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.inner.get_state(key)
    }

    fn put_state(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.inner.put_state(key, value)?;
        self.record(key);
        Ok(())
    }

    fn del_state(&self, key: &str) -> StoreResult<()> {
        self.inner.del_state(key)?;
        self.record(key);
        Ok(())
    }

    fn state_by_range(&self, start: &str, end: &str) -> StoreResult<Box<dyn ScanCursor + '_>> {
        self.inner.state_by_range(start, end)
    }

    fn state_by_partial_composite_key(
        &self,
        index_name: &str,
        parts: &[String],
    ) -> Result<Box<dyn ScanCursor + '_>> {
        self.inner.state_by_partial_composite_key(index_name, parts)
    }

    fn split_composite_key(&self, key: &str) -> Result<CompositeKey> {
        self.inner.split_composite_key(key)
    }
}
