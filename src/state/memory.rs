//! In-memory ordered state.

use super::{KeyValue, ScanCursor, StateStore};
use crate::error::{StoreError, StoreResult};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Failure to inject into a [`MemoryState`], for exercising error paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// Every `get_state` fails.
    Get,
    /// Every `put_state`/`del_state` fails.
    Put,
    /// Opening a scan fails.
    OpenScan,
    /// Scans fail after yielding this many entries.
    ScanAfter(usize),
}

/// Counters exposed for tests and diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StateStats {
    /// Live keys, records and index entries alike.
    pub keys: usize,
    /// Successful puts and deletes.
    pub writes: u64,
    /// Cursors opened and not yet closed.
    pub open_cursors: usize,
}

/// A `BTreeMap`-backed [`StateStore`].
///
/// Scans read a point-in-time copy of the requested range. Like host
/// iterators, a cursor that is dropped without being closed stays counted in
/// [`StateStats::open_cursors`].
#[derive(Default)]
pub struct MemoryState {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
    writes: AtomicU64,
    open_cursors: Arc<AtomicUsize>,
    fault: Mutex<Option<Fault>>,
}

impl MemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> StateStats {
        StateStats {
            keys: self.entries.read().len(),
            writes: self.writes.load(Ordering::SeqCst),
            open_cursors: self.open_cursors.load(Ordering::SeqCst),
        }
    }

    pub fn inject_fault(&self, fault: Fault) {
        *self.fault.lock() = Some(fault);
    }

    pub fn clear_fault(&self) {
        *self.fault.lock() = None;
    }

    fn check_fault(&self, hit: impl Fn(Fault) -> bool, what: &str) -> StoreResult<()> {
        match *self.fault.lock() {
            Some(fault) if hit(fault) => Err(StoreError::Unavailable(format!(
                "injected {} failure",
                what
            ))),
            _ => Ok(()),
        }
    }
}

impl StateStore for MemoryState {
    fn get_state(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.check_fault(|f| f == Fault::Get, "get")?;
        Ok(self.entries.read().get(key).cloned())
    }

    fn put_state(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey("key must not be empty".into()));
        }
        self.check_fault(|f| f == Fault::Put, "put")?;

        self.entries.write().insert(key.to_string(), value.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn del_state(&self, key: &str) -> StoreResult<()> {
        self.check_fault(|f| f == Fault::Put, "delete")?;

        self.entries.write().remove(key);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn state_by_range(&self, start: &str, end: &str) -> StoreResult<Box<dyn ScanCursor + '_>> {
        self.check_fault(|f| f == Fault::OpenScan, "scan open")?;

        let items: Vec<KeyValue> = if !end.is_empty() && start >= end {
            Vec::new()
        } else {
            let upper = if end.is_empty() {
                Bound::Unbounded
            } else {
                Bound::Excluded(end)
            };
            self.entries
                .read()
                .range::<str, _>((Bound::Included(start), upper))
                .map(|(key, value)| KeyValue {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect()
        };

        let fail_after = match *self.fault.lock() {
            Some(Fault::ScanAfter(n)) => Some(n),
            _ => None,
        };

        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryCursor {
            items: items.into_iter(),
            yielded: 0,
            fail_after,
            open: Some(Arc::clone(&self.open_cursors)),
        }))
    }
}

struct MemoryCursor {
    items: std::vec::IntoIter<KeyValue>,
    yielded: usize,
    fail_after: Option<usize>,
    /// Shared open-cursor counter; `None` once closed.
    open: Option<Arc<AtomicUsize>>,
}

impl Iterator for MemoryCursor {
    type Item = StoreResult<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.open.is_none() {
            return None;
        }

        if let Some(limit) = self.fail_after {
            if self.yielded >= limit {
                self.fail_after = None;
                self.items = Vec::new().into_iter();
                return Some(Err(StoreError::Unavailable(format!(
                    "injected scan failure after {} entries",
                    limit
                ))));
            }
        }

        let item = self.items.next()?;
        self.yielded += 1;
        Some(Ok(item))
    }
}

impl ScanCursor for MemoryCursor {
    fn close(&mut self) -> StoreResult<()> {
        if let Some(counter) = self.open.take() {
            counter.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
