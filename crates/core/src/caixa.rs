//! Cash-register (caixa) sessions.
//!
//! A unit has at most one open session. Reinforcements add cash to the
//! drawer, withdrawals (sangrias) remove it, sales are recorded by the
//! backend when a comanda is closed with cash.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::{Cents, EntityId, Timestamp, UnitId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashSessionStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashMovementKind {
    Reinforcement,
    Withdrawal,
    Sale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashMovement {
    pub id: EntityId,
    pub kind: CashMovementKind,
    pub amount_cents: Cents,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

impl CashMovement {
    /// Effect on the drawer balance.
    pub fn signed_amount(&self) -> Cents {
        match self.kind {
            CashMovementKind::Reinforcement | CashMovementKind::Sale => self.amount_cents,
            CashMovementKind::Withdrawal => -self.amount_cents,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashSession {
    pub id: EntityId,
    pub unit_id: UnitId,
    pub opened_by: EntityId,
    pub opened_at: Timestamp,
    pub closed_at: Option<Timestamp>,
    pub opening_balance_cents: Cents,
    pub closing_balance_cents: Option<Cents>,
    pub status: CashSessionStatus,
    #[serde(default)]
    pub movements: Vec<CashMovement>,
}

impl CashSession {
    pub fn is_open(&self) -> bool {
        self.status == CashSessionStatus::Open
    }

    /// Balance the drawer should hold given the recorded movements.
    pub fn expected_balance(&self) -> Cents {
        self.opening_balance_cents
            + self
                .movements
                .iter()
                .map(CashMovement::signed_amount)
                .sum::<Cents>()
    }

    /// Counted minus expected; negative means cash is missing.
    pub fn difference(&self, counted_cents: Cents) -> Cents {
        counted_cents - self.expected_balance()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OpenCashSession {
    #[validate(range(min = 0, message = "saldo inicial não pode ser negativo"))]
    pub opening_balance_cents: Cents,
}

impl OpenCashSession {
    /// Session shown as current while the open request is in flight.
    pub fn provisional(
        &self,
        id: EntityId,
        unit_id: UnitId,
        opened_by: EntityId,
        now: Timestamp,
    ) -> CashSession {
        CashSession {
            id,
            unit_id,
            opened_by,
            opened_at: now,
            closed_at: None,
            opening_balance_cents: self.opening_balance_cents,
            closing_balance_cents: None,
            status: CashSessionStatus::Open,
            movements: Vec::new(),
        }
    }
}

/// Body of the reinforce and withdraw endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CashMovementForm {
    #[validate(range(min = 1, message = "valor deve ser maior que zero"))]
    pub amount_cents: Cents,
    #[validate(length(max = 200))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CloseCashSession {
    #[validate(range(min = 0))]
    pub counted_balance_cents: Cents,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movement(kind: CashMovementKind, amount_cents: Cents) -> CashMovement {
        CashMovement {
            id: EntityId::new_v4(),
            kind,
            amount_cents,
            description: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn expected_balance_accounts_for_every_movement() {
        let session = CashSession {
            id: EntityId::new_v4(),
            unit_id: UnitId::new_v4(),
            opened_by: EntityId::new_v4(),
            opened_at: chrono::Utc::now(),
            closed_at: None,
            opening_balance_cents: 10_000,
            closing_balance_cents: None,
            status: CashSessionStatus::Open,
            movements: vec![
                movement(CashMovementKind::Sale, 4_500),
                movement(CashMovementKind::Withdrawal, 2_000),
                movement(CashMovementKind::Reinforcement, 500),
            ],
        };
        assert_eq!(session.expected_balance(), 13_000);
        assert_eq!(session.difference(12_900), -100);
        assert!(session.is_open());
    }

    #[test]
    fn zero_withdrawal_is_rejected() {
        let form = CashMovementForm {
            amount_cents: 0,
            description: None,
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn provisional_session_starts_open_with_the_opening_balance() {
        let form = OpenCashSession {
            opening_balance_cents: 15_000,
        };
        let session = form.provisional(
            EntityId::new_v4(),
            UnitId::new_v4(),
            EntityId::new_v4(),
            chrono::Utc::now(),
        );
        assert!(session.is_open());
        assert_eq!(session.expected_balance(), 15_000);
        assert!(session.movements.is_empty());
    }
}
