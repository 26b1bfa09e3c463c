//! # Card Ledger
//!
//! A demonstration ledger contract over an ordered key-value state, with
//! relationship lookups served by composite-key secondary indexes.
//!
//! ## Core Concepts
//!
//! - **Records**: JSON documents under simple keys from a [`KeySpace`]
//! - **Composite keys**: `(index name, parts...)` flattened so related
//!   entries sort together
//! - **Secondary indexes**: zero-payload composite keys answering
//!   "every record referencing X" with one prefix scan
//! - **Queries**: range and index scans collected into ordered results
//! - **Events**: opt-in write notifications through [`ObservedContract`]
//!
//! ## Example
//!
//! ```ignore
//! use card_ledger::{Contract, MemoryState};
//!
//! let state = MemoryState::new();
//! let contract = Contract::default();
//!
//! contract.dispatch(&state, "initLedger", &[])?;
//!
//! let items = contract.handle(&state, "queryCardItemByCARDID", &["CARD0".into()]);
//! assert!(items.is_success());
//! ```

pub mod contract;
pub mod error;
pub mod events;
pub mod index;
pub mod keys;
pub mod query;
pub mod state;
pub mod types;

// Re-exports
pub use contract::{ChaincodeResponse, Contract, ContractConfig, Operation, Response};
pub use error::{ContractError, Result, StoreError, StoreResult};
pub use events::{
    DropReason, EventFilter, EventHub, LedgerEvent, ObservedContract, SubscriptionConfig,
    SubscriptionHandle, SubscriptionId,
};
pub use index::{IndexLookup, SecondaryIndex, INDEX_SENTINEL};
pub use keys::{CompositeKey, KeySpace, RelationIndex};
pub use query::{QueryAggregator, QueryEntry, QueryResult};
pub use state::{
    CursorGuard, Fault, KeyValue, MemoryState, ScanCursor, StateStats, StateStore, WriteSet,
};
pub use types::*;
