//! Luma Storage crate - store contracts and in-memory implementations.
//!
//! The grouping engine only talks to the traits in [`repository`]; the
//! in-memory stores in [`memory`] live for the process (or test fixture)
//! that owns them. Identifiers come from a counter owned by each store.

pub mod error;
pub mod memory;
pub mod repository;

pub use error::StoreError;
pub use memory::{InMemoryEventStore, InMemoryGroupedIntentStore, InMemoryIntentStore};
pub use repository::{GroupedIntentStore, IntentStore, InteractionEventStore};
