//! Infrastructure layer: persistence adapters behind the store contract.

pub mod store;

pub use store::{InMemoryStore, PostStore, StoreError, StoreResult, UserStore};

#[cfg(feature = "postgres")]
pub use store::PostgresStore;
