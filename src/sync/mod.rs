//! Project alias synchronization.
//!
//! [`alias_table`] holds the pure reconciliation rules; [`registry`] wraps
//! the table in a lock-guarded store that serialises writers and persists
//! every change before publishing it to readers.

pub mod alias_table;
pub mod registry;

pub use alias_table::{candidate_key, sync, AliasTable, SyncReport};
pub use registry::ProjectRegistry;
