//! Route protection evaluated against the current session.

use crate::session::SessionState;

/// What a route requires before it can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    Authenticated,
    /// Needs an authenticated user and an active unit.
    UnitScoped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    RedirectToLogin,
    RedirectToUnitSelection,
}

impl RouteAccess {
    pub fn evaluate(self, session: &SessionState) -> AccessDecision {
        match self {
            RouteAccess::Public => AccessDecision::Allowed,
            _ if session.auth.is_none() => AccessDecision::RedirectToLogin,
            RouteAccess::Authenticated => AccessDecision::Allowed,
            RouteAccess::UnitScoped if session.unit.is_none() => {
                AccessDecision::RedirectToUnitSelection
            }
            RouteAccess::UnitScoped => AccessDecision::Allowed,
        }
    }

    /// Access level of a dashboard path.
    pub fn for_path(path: &str) -> Self {
        let first = path.trim_start_matches('/').split('/').next().unwrap_or("");
        match first {
            "login" | "forgot-password" | "" => RouteAccess::Public,
            "select-unit" | "profile" | "subscription" => RouteAccess::Authenticated,
            _ => RouteAccess::UnitScoped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{AuthSession, UnitSelection};
    use barbearia_core::auth::{Role, SessionUser};
    use uuid::Uuid;

    fn signed_in() -> SessionState {
        let tenant_id = Uuid::new_v4();
        SessionState {
            auth: Some(AuthSession {
                access_token: "token".into(),
                user: SessionUser {
                    id: Uuid::new_v4(),
                    name: "Ana".into(),
                    email: "ana@barbearia.com".into(),
                    role: Role::Manager,
                },
                tenant_id,
                tenant_name: "Barbearia".into(),
                expires_at: None,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn anonymous_user_is_sent_to_login() {
        let state = SessionState::default();
        assert_eq!(
            RouteAccess::UnitScoped.evaluate(&state),
            AccessDecision::RedirectToLogin
        );
        assert_eq!(RouteAccess::Public.evaluate(&state), AccessDecision::Allowed);
    }

    #[test]
    fn unit_scoped_route_needs_a_unit() {
        let mut state = signed_in();
        assert_eq!(
            RouteAccess::UnitScoped.evaluate(&state),
            AccessDecision::RedirectToUnitSelection
        );
        assert_eq!(
            RouteAccess::Authenticated.evaluate(&state),
            AccessDecision::Allowed
        );

        let tenant_id = state.auth.as_ref().unwrap().tenant_id;
        state.unit = Some(UnitSelection {
            unit_id: Uuid::new_v4(),
            tenant_id,
            unit_name: "Centro".into(),
        });
        assert_eq!(RouteAccess::UnitScoped.evaluate(&state), AccessDecision::Allowed);
    }

    #[test]
    fn paths_map_to_access_levels() {
        assert_eq!(RouteAccess::for_path("/login"), RouteAccess::Public);
        assert_eq!(RouteAccess::for_path("/select-unit"), RouteAccess::Authenticated);
        assert_eq!(RouteAccess::for_path("/agenda/2026-10-16"), RouteAccess::UnitScoped);
    }
}
