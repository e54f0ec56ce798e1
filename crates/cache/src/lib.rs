//! Server-state cache for the barbershop client.
//!
//! Query results are stored as JSON under hierarchical [`QueryKey`]s.
//! Mutations apply optimistic patches first and either confirm them or
//! restore the exact pre-mutation entries when the request fails.

pub mod cache;
pub mod key;
pub mod mutation;

pub use cache::{CacheEntry, CacheSnapshot, EntryStatus, QueryCache};
pub use key::QueryKey;
pub use mutation::{Mutation, MutationId};
