//! Login payloads exchanged with `/auth/*`.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::tenancy::Tenant;
use crate::types::EntityId;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Credentials {
    #[validate(email(message = "e-mail inválido"))]
    pub email: String,
    #[validate(length(min = 6, message = "senha deve ter pelo menos 6 caracteres"))]
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Manager,
    Receptionist,
    Professional,
    /// Platform operator; the only role allowed to manage plans.
    Admin,
}

impl Role {
    pub fn can_manage_finance(self) -> bool {
        matches!(self, Role::Owner | Role::Manager | Role::Admin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: SessionUser,
    pub tenant: Tenant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_password_is_rejected_locally() {
        let creds = Credentials {
            email: "dono@barbearia.com".into(),
            password: "123".into(),
        };
        assert!(creds.validate().is_err());
    }

    #[test]
    fn receptionist_cannot_manage_finance() {
        assert!(!Role::Receptionist.can_manage_finance());
        assert!(Role::Owner.can_manage_finance());
    }
}
