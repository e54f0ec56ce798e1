//! SaaS plans and the tenant's subscription.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::resource::{set_if, Resource};
use crate::types::{Cents, EntityId, PageParams, Timestamp, TenantId};
use crate::validation::validate_not_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingInterval {
    Monthly,
    Yearly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: EntityId,
    pub name: String,
    pub price_cents: Cents,
    pub interval: BillingInterval,
    #[serde(default)]
    pub features: Vec<String>,
    pub max_units: u32,
    pub active: bool,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePlan {
    #[validate(length(min = 2, max = 60), custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(range(min = 0))]
    pub price_cents: Cents,
    pub interval: BillingInterval,
    #[serde(default)]
    pub features: Vec<String>,
    #[validate(range(min = 1))]
    pub max_units: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, max = 60), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub price_cents: Option<Cents>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub max_units: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanFilter {
    #[serde(flatten)]
    pub page: PageParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl Resource for Plan {
    const PATH: &'static str = "plans";
    const ENTITY: &'static str = "plan";
    const UNIT_SCOPED: bool = false;

    type Create = CreatePlan;
    type Update = UpdatePlan;
    type Filter = PlanFilter;

    fn id(&self) -> EntityId {
        self.id
    }

    fn apply_update(&mut self, update: &UpdatePlan) {
        set_if(&mut self.name, &update.name);
        set_if(&mut self.price_cents, &update.price_cents);
        set_if(&mut self.features, &update.features);
        set_if(&mut self.max_units, &update.max_units);
        set_if(&mut self.active, &update.active);
    }

    fn placeholder(id: EntityId, create: &CreatePlan, now: Timestamp) -> Self {
        Self {
            id,
            name: create.name.clone(),
            price_cents: create.price_cents,
            interval: create.interval,
            features: create.features.clone(),
            max_units: create.max_units,
            active: true,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Trialing,
    Active,
    PastDue,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: EntityId,
    pub tenant_id: TenantId,
    pub plan_id: EntityId,
    pub plan_name: String,
    pub status: SubscriptionStatus,
    pub current_period_end: Timestamp,
    #[serde(default)]
    pub cancel_at_period_end: bool,
}

impl Subscription {
    /// Whether the tenant may keep using paid features.
    pub fn grants_access(&self, now: Timestamp) -> bool {
        match self.status {
            SubscriptionStatus::Trialing | SubscriptionStatus::Active => true,
            SubscriptionStatus::PastDue => false,
            SubscriptionStatus::Cancelled => now < self.current_period_end,
        }
    }
}
