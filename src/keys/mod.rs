//! Key layout for records and index entries.
//!
//! Records live under simple keys from a [`KeySpace`]; relationship index
//! entries live under composite keys built by [`codec`].

pub mod codec;
mod space;

pub use codec::{decode, encode, prefix_range, CompositeKey};
pub use space::{KeySpace, RelationIndex};
