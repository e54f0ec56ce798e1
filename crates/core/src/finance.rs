//! Accounts payable/receivable and the DRE (profit and loss) report.

use std::borrow::Cow;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::resource::{set_if, set_opt_if, Resource};
use crate::types::{Cents, EntityId, PageParams, Timestamp, UnitId};
use crate::validation::validate_not_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Open,
    Settled,
    Overdue,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Pix,
    CreditCard,
    DebitCard,
    BankTransfer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountPayable {
    pub id: EntityId,
    pub unit_id: UnitId,
    pub description: String,
    pub supplier: Option<String>,
    pub category: Option<String>,
    pub amount_cents: Cents,
    pub due_date: NaiveDate,
    pub settled_at: Option<Timestamp>,
    pub status: AccountStatus,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountReceivable {
    pub id: EntityId,
    pub unit_id: UnitId,
    pub description: String,
    pub customer_id: Option<EntityId>,
    pub category: Option<String>,
    pub amount_cents: Cents,
    pub due_date: NaiveDate,
    pub settled_at: Option<Timestamp>,
    pub status: AccountStatus,
    pub created_at: Timestamp,
}

/// Shared create form for payables and receivables.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAccount {
    #[validate(length(min = 3, max = 200), custom(function = "validate_not_blank"))]
    pub description: String,
    /// Supplier for payables; ignored by receivables.
    #[validate(length(max = 100))]
    pub supplier: Option<String>,
    pub customer_id: Option<EntityId>,
    #[validate(length(max = 50))]
    pub category: Option<String>,
    #[validate(range(min = 1, message = "valor deve ser maior que zero"))]
    pub amount_cents: Cents,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, max = 200), custom(function = "validate_not_blank"))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "valor deve ser maior que zero"))]
    pub amount_cents: Option<Cents>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountStatus>,
}

/// Body of `POST /accounts-payable/{id}/pay` and
/// `POST /accounts-receivable/{id}/receive`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Settlement {
    pub method: PaymentMethod,
    #[validate(range(min = 1))]
    pub amount_cents: Cents,
    pub settled_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountFilter {
    #[serde(flatten)]
    pub page: PageParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_to: Option<NaiveDate>,
}

impl Resource for AccountPayable {
    const PATH: &'static str = "accounts-payable";
    const ENTITY: &'static str = "account payable";
    const UNIT_SCOPED: bool = true;

    type Create = CreateAccount;
    type Update = UpdateAccount;
    type Filter = AccountFilter;

    fn id(&self) -> EntityId {
        self.id
    }

    fn apply_update(&mut self, update: &UpdateAccount) {
        set_if(&mut self.description, &update.description);
        set_opt_if(&mut self.category, &update.category);
        set_if(&mut self.amount_cents, &update.amount_cents);
        set_if(&mut self.due_date, &update.due_date);
        set_if(&mut self.status, &update.status);
    }

    fn placeholder(id: EntityId, create: &CreateAccount, now: Timestamp) -> Self {
        Self {
            id,
            unit_id: UnitId::nil(),
            description: create.description.clone(),
            supplier: create.supplier.clone(),
            category: create.category.clone(),
            amount_cents: create.amount_cents,
            due_date: create.due_date,
            settled_at: None,
            status: AccountStatus::Open,
            created_at: now,
        }
    }
}

impl Resource for AccountReceivable {
    const PATH: &'static str = "accounts-receivable";
    const ENTITY: &'static str = "account receivable";
    const UNIT_SCOPED: bool = true;

    type Create = CreateAccount;
    type Update = UpdateAccount;
    type Filter = AccountFilter;

    fn id(&self) -> EntityId {
        self.id
    }

    fn apply_update(&mut self, update: &UpdateAccount) {
        set_if(&mut self.description, &update.description);
        set_opt_if(&mut self.category, &update.category);
        set_if(&mut self.amount_cents, &update.amount_cents);
        set_if(&mut self.due_date, &update.due_date);
        set_if(&mut self.status, &update.status);
    }

    fn placeholder(id: EntityId, create: &CreateAccount, now: Timestamp) -> Self {
        Self {
            id,
            unit_id: UnitId::nil(),
            description: create.description.clone(),
            customer_id: create.customer_id,
            category: create.category.clone(),
            amount_cents: create.amount_cents,
            due_date: create.due_date,
            settled_at: None,
            status: AccountStatus::Open,
            created_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// DRE
// ---------------------------------------------------------------------------

/// Period of `GET /financial/dre`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_period"))]
pub struct DreQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

fn validate_period(query: &DreQuery) -> Result<(), ValidationError> {
    if query.start > query.end {
        return Err(ValidationError::new("period")
            .with_message(Cow::Borrowed("data inicial deve ser anterior à data final")));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DreLine {
    pub label: String,
    pub amount_cents: Cents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DreReport {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub gross_revenue_cents: Cents,
    pub deductions_cents: Cents,
    pub net_revenue_cents: Cents,
    pub costs_cents: Cents,
    pub gross_profit_cents: Cents,
    pub operating_expenses_cents: Cents,
    pub net_income_cents: Cents,
    #[serde(default)]
    pub lines: Vec<DreLine>,
}

impl DreReport {
    /// Net income over net revenue, in percent.
    pub fn net_margin_percent(&self) -> Option<f64> {
        if self.net_revenue_cents == 0 {
            return None;
        }
        Some(self.net_income_cents as f64 * 100.0 / self.net_revenue_cents as f64)
    }
}
