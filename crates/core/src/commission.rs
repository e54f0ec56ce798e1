use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::resource::{set_if, set_opt_if, Resource};
use crate::types::{Cents, EntityId, PageParams, Timestamp, UnitId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionStatus {
    Pending,
    Paid,
}

/// Commission earned by a professional on a service or sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commission {
    pub id: EntityId,
    pub unit_id: UnitId,
    pub professional_id: EntityId,
    #[serde(default)]
    pub professional_name: String,
    pub appointment_id: Option<EntityId>,
    pub comanda_id: Option<EntityId>,
    pub base_cents: Cents,
    pub percent: u8,
    pub amount_cents: Cents,
    pub status: CommissionStatus,
    pub reference_date: NaiveDate,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

/// Manual commission entry (bonus or correction).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCommission {
    pub professional_id: EntityId,
    #[validate(range(min = 0))]
    pub base_cents: Cents,
    #[validate(range(max = 100))]
    pub percent: u8,
    pub reference_date: NaiveDate,
    #[validate(length(min = 3, max = 200))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCommission {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CommissionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, max = 200))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommissionFilter {
    #[serde(flatten)]
    pub page: PageParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professional_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CommissionStatus>,
}

/// Per-professional totals from `GET /commissions/summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionSummary {
    pub professional_id: EntityId,
    pub professional_name: String,
    pub total_cents: Cents,
    pub paid_cents: Cents,
    pub pending_cents: Cents,
}

/// Commission amount for a base value, rounded half-up to the centavo.
pub fn commission_amount(base_cents: Cents, percent: u8) -> Cents {
    (base_cents * i64::from(percent) + 50) / 100
}

impl Resource for Commission {
    const PATH: &'static str = "commissions";
    const ENTITY: &'static str = "commission";
    const UNIT_SCOPED: bool = true;

    type Create = CreateCommission;
    type Update = UpdateCommission;
    type Filter = CommissionFilter;

    fn id(&self) -> EntityId {
        self.id
    }

    fn apply_update(&mut self, update: &UpdateCommission) {
        set_if(&mut self.status, &update.status);
        set_opt_if(&mut self.description, &update.description);
    }

    fn placeholder(id: EntityId, create: &CreateCommission, now: Timestamp) -> Self {
        Self {
            id,
            unit_id: UnitId::nil(),
            professional_id: create.professional_id,
            professional_name: String::new(),
            appointment_id: None,
            comanda_id: None,
            base_cents: create.base_cents,
            percent: create.percent,
            amount_cents: commission_amount(create.base_cents, create.percent),
            status: CommissionStatus::Pending,
            reference_date: create.reference_date,
            description: create.description.clone(),
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_rounds_half_up() {
        assert_eq!(commission_amount(4500, 40), 1800);
        assert_eq!(commission_amount(999, 50), 500);
        assert_eq!(commission_amount(0, 50), 0);
    }

    #[test]
    fn filter_serializes_only_set_fields() {
        let filter = CommissionFilter {
            status: Some(CommissionStatus::Pending),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            serde_json::json!({"status": "pending"})
        );
    }
}
