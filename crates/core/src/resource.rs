//! Descriptor trait for backend resources with plain CRUD endpoints.
//!
//! The client derives URLs from [`Resource::PATH`], the cache derives query
//! keys from it, and the hooks layer uses [`Resource::apply_update`] and
//! [`Resource::placeholder`] to render optimistic writes.

use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

use crate::types::{EntityId, Timestamp};

pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection path relative to the API base URL, without slashes.
    const PATH: &'static str;

    /// Human-readable entity name used in `NotFound` errors.
    const ENTITY: &'static str;

    /// Whether records belong to a single unit (branch).
    const UNIT_SCOPED: bool;

    type Create: Serialize + Validate + Clone + Send + Sync + 'static;
    type Update: Serialize + Validate + Clone + Send + Sync + 'static;
    type Filter: Serialize + Default + Clone + Send + Sync + 'static;

    fn id(&self) -> EntityId;

    /// Apply an update form to a cached copy.
    fn apply_update(&mut self, update: &Self::Update);

    /// Record shown in lists while a create request is in flight.
    fn placeholder(id: EntityId, create: &Self::Create, now: Timestamp) -> Self;
}

/// Overwrite `target` with `value` when the update form sets it.
pub(crate) fn set_if<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *target = v.clone();
    }
}

/// Like [`set_if`] for optional targets.
pub(crate) fn set_opt_if<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if let Some(v) = value {
        *target = Some(v.clone());
    }
}
