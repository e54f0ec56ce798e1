//! Typed client for the barbershop REST backend.
//!
//! [`ApiClient`] attaches the session identity (bearer token, tenant,
//! unit, request id) to every call and maps failures onto
//! [`barbearia_core::CoreError`]. [`session::SessionStore`] owns the
//! persisted client state.

pub mod access;
pub mod api;
pub mod config;
mod endpoints;
pub mod error;
mod resources;
pub mod session;

pub use access::{AccessDecision, RouteAccess};
pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use session::{SessionState, SessionStore};
