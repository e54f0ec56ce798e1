use barbearia_core::error::{CoreError, ErrorCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

/// A toast shown to the user.
///
/// Constructed via [`Notification::success`], [`Notification::info`] or
/// [`Notification::from_error`] and enriched with
/// [`with_source`](Notification::with_source).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: uuid::Uuid,
    pub level: Level,
    /// Set for error notifications.
    pub category: Option<ErrorCategory>,
    pub title: String,
    pub message: String,
    /// Operation that produced the notification, e.g. `"appointment.status"`.
    pub source: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    fn new(level: Level, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            level,
            category: None,
            title: title.into(),
            message: message.into(),
            source: None,
            timestamp: Utc::now(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Level::Success, title, message)
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Level::Info, title, message)
    }

    /// Error toast with a title chosen by the error's category.
    ///
    /// Network failures are warnings: the user can simply retry.
    pub fn from_error(err: &CoreError) -> Self {
        let category = err.category();
        let level = match category {
            ErrorCategory::NetworkUnavailable => Level::Warning,
            _ => Level::Error,
        };
        let mut notification = Self::new(level, title_for(category), err.detail());
        notification.category = Some(category);
        notification
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

/// Toast title for each error category.
pub fn title_for(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::NotFound => "Registro não encontrado",
        ErrorCategory::Conflict => "Conflito",
        ErrorCategory::ValidationFailed => "Dados inválidos",
        ErrorCategory::Unauthorized => "Sessão expirada",
        ErrorCategory::Forbidden => "Acesso negado",
        ErrorCategory::NetworkUnavailable => "Sem conexão",
        ErrorCategory::UnitRequired => "Selecione uma unidade",
        ErrorCategory::Internal => "Erro inesperado",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_error_becomes_error_toast() {
        let n = Notification::from_error(&CoreError::Conflict("horário já ocupado".into()))
            .with_source("appointment.create");
        assert_eq!(n.level, Level::Error);
        assert_eq!(n.category, Some(ErrorCategory::Conflict));
        assert_eq!(n.title, "Conflito");
        assert_eq!(n.message, "horário já ocupado");
        assert_eq!(n.source.as_deref(), Some("appointment.create"));
        assert!(n.is_error());
    }

    #[test]
    fn network_errors_are_warnings() {
        let n = Notification::from_error(&CoreError::NetworkUnavailable("timeout".into()));
        assert_eq!(n.level, Level::Warning);
        assert_eq!(n.title, "Sem conexão");
    }

    #[test]
    fn success_has_no_category() {
        let n = Notification::success("Agendamento confirmado", "");
        assert!(n.category.is_none());
        assert!(!n.is_error());
    }
}
