//! Comanda: the running tab of a customer visit, closed out at payment.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::finance::PaymentMethod;
use crate::types::{Cents, EntityId, PageParams, Timestamp, UnitId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComandaStatus {
    Open,
    Closed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Service,
    Product,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComandaItem {
    pub id: EntityId,
    pub kind: ItemKind,
    pub reference_id: EntityId,
    pub description: String,
    pub professional_id: Option<EntityId>,
    pub quantity: u32,
    pub unit_price_cents: Cents,
}

impl ComandaItem {
    pub fn subtotal(&self) -> Cents {
        self.unit_price_cents * i64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comanda {
    pub id: EntityId,
    pub unit_id: UnitId,
    pub customer_id: Option<EntityId>,
    #[serde(default)]
    pub customer_name: String,
    pub appointment_id: Option<EntityId>,
    pub status: ComandaStatus,
    #[serde(default)]
    pub items: Vec<ComandaItem>,
    #[serde(default)]
    pub discount_cents: Cents,
    pub opened_at: Timestamp,
    pub closed_at: Option<Timestamp>,
}

impl Comanda {
    pub fn gross_total(&self) -> Cents {
        self.items.iter().map(ComandaItem::subtotal).sum()
    }

    pub fn amount_due(&self) -> Cents {
        (self.gross_total() - self.discount_cents).max(0)
    }

    pub fn is_open(&self) -> bool {
        self.status == ComandaStatus::Open
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OpenComanda {
    pub customer_id: Option<EntityId>,
    pub appointment_id: Option<EntityId>,
}

impl OpenComanda {
    /// Empty tab shown in lists while the open request is in flight.
    pub fn placeholder(&self, id: EntityId, unit_id: UnitId, now: Timestamp) -> Comanda {
        Comanda {
            id,
            unit_id,
            customer_id: self.customer_id,
            customer_name: String::new(),
            appointment_id: self.appointment_id,
            status: ComandaStatus::Open,
            items: Vec::new(),
            discount_cents: 0,
            opened_at: now,
            closed_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddComandaItem {
    pub kind: ItemKind,
    pub reference_id: EntityId,
    #[validate(length(min = 1, max = 120))]
    pub description: String,
    pub professional_id: Option<EntityId>,
    #[validate(range(min = 1, message = "quantidade deve ser pelo menos 1"))]
    pub quantity: u32,
    #[validate(range(min = 0))]
    pub unit_price_cents: Cents,
}

impl AddComandaItem {
    /// Item shown in the comanda while the add request is in flight.
    pub fn to_item(&self, id: EntityId) -> ComandaItem {
        ComandaItem {
            id,
            kind: self.kind,
            reference_id: self.reference_id,
            description: self.description.clone(),
            professional_id: self.professional_id,
            quantity: self.quantity,
            unit_price_cents: self.unit_price_cents,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PaymentLine {
    pub method: PaymentMethod,
    #[validate(range(min = 1))]
    pub amount_cents: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CloseComanda {
    #[validate(length(min = 1, message = "informe ao menos uma forma de pagamento"), nested)]
    pub payments: Vec<PaymentLine>,
    #[validate(range(min = 0))]
    pub discount_cents: Cents,
}

impl CloseComanda {
    /// Checkout rules that depend on the comanda being closed: it must be
    /// open, the discount cannot exceed the total and the payments must
    /// cover exactly the amount due.
    pub fn validate_against(&self, comanda: &Comanda) -> Result<(), CoreError> {
        if !comanda.is_open() {
            return Err(CoreError::Validation("comanda já está fechada".into()));
        }
        let gross = comanda.gross_total();
        if self.discount_cents > gross {
            return Err(CoreError::Validation(
                "desconto maior que o total da comanda".into(),
            ));
        }
        let paid: Cents = self.payments.iter().map(|p| p.amount_cents).sum();
        let due = gross - self.discount_cents;
        if paid != due {
            return Err(CoreError::Validation(format!(
                "pagamentos somam {paid} mas o valor devido é {due}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComandaFilter {
    #[serde(flatten)]
    pub page: PageParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ComandaStatus>,
}
