use serde::{Deserialize, Serialize};

use crate::types::EntityId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity}{}", describe_id(.id))]
    NotFound {
        entity: &'static str,
        id: Option<EntityId>,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("No unit selected")]
    UnitNotSelected,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse error category used to pick the user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    NotFound,
    Conflict,
    ValidationFailed,
    Unauthorized,
    Forbidden,
    NetworkUnavailable,
    UnitRequired,
    Internal,
}

impl CoreError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CoreError::NotFound { .. } => ErrorCategory::NotFound,
            CoreError::Validation(_) => ErrorCategory::ValidationFailed,
            CoreError::Conflict(_) => ErrorCategory::Conflict,
            CoreError::Unauthorized(_) => ErrorCategory::Unauthorized,
            CoreError::Forbidden(_) => ErrorCategory::Forbidden,
            CoreError::NetworkUnavailable(_) => ErrorCategory::NetworkUnavailable,
            CoreError::UnitNotSelected => ErrorCategory::UnitRequired,
            CoreError::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Message suitable for showing to the user, without the category prefix.
    pub fn detail(&self) -> String {
        match self {
            CoreError::NotFound { entity, id } => format!("{entity}{} not found", describe_id(id)),
            CoreError::Validation(msg)
            | CoreError::Conflict(msg)
            | CoreError::Unauthorized(msg)
            | CoreError::Forbidden(msg)
            | CoreError::NetworkUnavailable(msg)
            | CoreError::Internal(msg) => msg.clone(),
            CoreError::UnitNotSelected => "Select a unit before continuing".to_string(),
        }
    }

    /// Whether the session's credentials should be discarded.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, CoreError::Unauthorized(_))
    }
}

fn describe_id(id: &Option<EntityId>) -> String {
    id.map(|id| format!(" with id {id}")).unwrap_or_default()
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let listing = crate::validation::field_messages(&errors)
            .into_iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
            .collect::<Vec<_>>()
            .join("; ");
        CoreError::Validation(listing)
    }
}
