//! Application layer of the barbershop client.
//!
//! [`AppContext`] wires the API client, the query cache, the session and
//! the notification bus together. The hooks in [`hooks`] expose every
//! read through the cache and every write through the optimistic
//! mutation contract: patch the cached views, send the request, then
//! confirm and invalidate dependents or roll back and notify.

pub mod context;
pub mod hooks;
pub mod scope;

pub use context::AppContext;
pub use scope::ViewScope;
