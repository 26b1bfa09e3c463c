//! Ledger events for in-process subscribers.
//!
//! Events are opt-in: wrap a [`crate::Contract`] in an [`ObservedContract`]
//! and every successful invocation that wrote keys broadcasts a
//! [`LedgerEvent::Written`] carrying the transaction id and those keys. The
//! contract itself keeps nothing between calls.
//! Subscribers get bounded buffers; one that falls behind is dropped.
//!
//! # Example
//!
//! ```ignore
//! let observed = ObservedContract::new(Contract::default());
//! let handle = observed.subscribe(SubscriptionConfig {
//!     filter: EventFilter::operations(["createCardItem"]),
//!     ..Default::default()
//! });
//!
//! while let Ok(event) = handle.recv() {
//!     println!("{:?}", event);
//! }
//! ```

mod manager;
mod observed;
mod types;

pub use manager::EventHub;
pub use observed::ObservedContract;
pub use types::{
    DropReason, EventFilter, LedgerEvent, SubscriptionConfig, SubscriptionHandle, SubscriptionId,
};
