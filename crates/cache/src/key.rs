//! Hierarchical query keys.

use std::fmt;

use barbearia_core::types::{EntityId, UnitId};
use barbearia_core::Resource;
use serde::Serialize;

/// Identifies a cached query: resource name, the unit it was loaded under
/// (for unit-scoped resources) and ordered segments.
///
/// Keys form a hierarchy: `appointments` is a prefix of
/// `appointments/list/{...}` and of `appointments/detail/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    resource: String,
    unit: Option<UnitId>,
    segments: Vec<String>,
}

impl QueryKey {
    /// Key of a tenant-wide resource.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            unit: None,
            segments: Vec::new(),
        }
    }

    /// Key of a resource loaded under `unit`.
    pub fn scoped(resource: impl Into<String>, unit: UnitId) -> Self {
        Self {
            unit: Some(unit),
            ..Self::new(resource)
        }
    }

    /// Root key of `R`, scoped to `unit` only when `R` is unit-scoped.
    pub fn root<R: Resource>(unit: Option<UnitId>) -> Self {
        match unit {
            Some(unit) if R::UNIT_SCOPED => Self::scoped(R::PATH, unit),
            _ => Self::new(R::PATH),
        }
    }

    pub fn with(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// `{root}/list/{filter as JSON}`.
    pub fn list(self, filter: &impl Serialize) -> Self {
        let filter = serde_json::to_string(filter).unwrap_or_default();
        self.with("list").with(filter)
    }

    /// `{root}/list`, prefix of every list query.
    pub fn lists(self) -> Self {
        self.with("list")
    }

    pub fn detail(self, id: EntityId) -> Self {
        self.with("detail").with(id.to_string())
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn unit(&self) -> Option<UnitId> {
        self.unit
    }

    pub fn is_unit_scoped(&self) -> bool {
        self.unit.is_some()
    }

    /// Whether `self` lies under `prefix`. A prefix without a unit matches
    /// keys of every unit.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.resource == prefix.resource
            && (prefix.unit.is_none() || prefix.unit == self.unit)
            && self.segments.starts_with(&prefix.segments)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resource)?;
        if let Some(unit) = self.unit {
            write!(f, "@{unit}")?;
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}
