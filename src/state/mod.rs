//! Host key-value state.
//!
//! The contract never owns durability. Every invocation receives a
//! [`StateStore`] view from the host and drives it through point reads and
//! writes plus ordered range scans. [`MemoryState`] is an in-process host used
//! for development and tests.

mod memory;
mod write_set;

pub use memory::{Fault, MemoryState, StateStats};
pub use write_set::WriteSet;

use crate::error::{Result, StoreError, StoreResult};
use crate::keys::{codec, CompositeKey};

/// One entry produced by a scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

/// An open scan over the state, yielding entries in key order.
///
/// A cursor holds host resources until [`ScanCursor::close`] is called.
/// Wrap it in a [`CursorGuard`] so it is released on every exit path.
pub trait ScanCursor: Iterator<Item = StoreResult<KeyValue>> {
    /// Release the cursor. Closing twice is a no-op.
    fn close(&mut self) -> StoreResult<()>;
}

/// Ordered key-value state supplied by the host ledger.
pub trait StateStore {
    /// Read a value; `None` when the key was never written or was deleted.
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Write a value, replacing any previous one.
    fn put_state(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Delete a key. Deleting a missing key is a no-op.
    fn del_state(&self, key: &str) -> StoreResult<()>;

    /// Scan `[start, end)` in key order. An empty `end` leaves the range open.
    fn state_by_range(&self, start: &str, end: &str) -> StoreResult<Box<dyn ScanCursor + '_>>;

    /// Scan every composite key extending `(index_name, parts)`.
    fn state_by_partial_composite_key(
        &self,
        index_name: &str,
        parts: &[String],
    ) -> Result<Box<dyn ScanCursor + '_>> {
        let (start, end) = codec::prefix_range(index_name, parts)?;
        Ok(self.state_by_range(&start, &end)?)
    }

    /// Split a composite key. Hosts with a native splitter may override this.
    fn split_composite_key(&self, key: &str) -> Result<CompositeKey> {
        codec::decode(key)
    }
}

/// Scoped ownership of a [`ScanCursor`].
///
/// The cursor is closed once it is exhausted, on [`CursorGuard::close`], or
/// on drop, whichever comes first.
pub struct CursorGuard<'a> {
    cursor: Box<dyn ScanCursor + 'a>,
    closed: bool,
    /// Close failure seen at exhaustion, reported by `close`.
    deferred: Option<StoreError>,
}

impl<'a> CursorGuard<'a> {
    pub fn new(cursor: Box<dyn ScanCursor + 'a>) -> Self {
        Self {
            cursor,
            closed: false,
            deferred: None,
        }
    }

    /// Close now and surface the host's close error.
    pub fn close(mut self) -> StoreResult<()> {
        if let Some(e) = self.deferred.take() {
            return Err(e);
        }
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.cursor.close()
    }
}

impl Iterator for CursorGuard<'_> {
    type Item = StoreResult<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            return None;
        }
        match self.cursor.next() {
            Some(item) => Some(item),
            None => {
                self.closed = true;
                self.deferred = self.cursor.close().err();
                None
            }
        }
    }
}

impl Drop for CursorGuard<'_> {
    fn drop(&mut self) {
        if let Some(e) = self.deferred.take() {
            tracing::warn!(error = %e, "failed to close scan cursor");
        }
        if !self.closed {
            self.closed = true;
            if let Err(e) = self.cursor.close() {
                tracing::warn!(error = %e, "failed to close scan cursor");
            }
        }
    }
}
