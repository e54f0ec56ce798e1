//! Service and product catalog of a unit.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::resource::{set_if, set_opt_if, Resource};
use crate::types::{Cents, EntityId, PageParams, Timestamp, UnitId};
use crate::validation::validate_not_blank;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: EntityId,
    pub unit_id: UnitId,
    pub name: String,
    pub category: Option<String>,
    pub duration_minutes: u32,
    pub price_cents: Cents,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateService {
    #[validate(length(min = 2, max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(length(max = 50))]
    pub category: Option<String>,
    #[validate(range(min = 5, max = 480, message = "duração deve estar entre 5 e 480 minutos"))]
    pub duration_minutes: u32,
    #[validate(range(min = 0, message = "preço não pode ser negativo"))]
    pub price_cents: Cents,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateService {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, max = 100), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 5, max = 480, message = "duração deve estar entre 5 e 480 minutos"))]
    pub duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "preço não pode ser negativo"))]
    pub price_cents: Option<Cents>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFilter {
    #[serde(flatten)]
    pub page: PageParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Resource for Service {
    const PATH: &'static str = "services";
    const ENTITY: &'static str = "service";
    const UNIT_SCOPED: bool = true;

    type Create = CreateService;
    type Update = UpdateService;
    type Filter = CatalogFilter;

    fn id(&self) -> EntityId {
        self.id
    }

    fn apply_update(&mut self, update: &UpdateService) {
        set_if(&mut self.name, &update.name);
        set_opt_if(&mut self.category, &update.category);
        set_if(&mut self.duration_minutes, &update.duration_minutes);
        set_if(&mut self.price_cents, &update.price_cents);
        set_if(&mut self.active, &update.active);
    }

    fn placeholder(id: EntityId, create: &CreateService, now: Timestamp) -> Self {
        Self {
            id,
            unit_id: UnitId::nil(),
            name: create.name.clone(),
            category: create.category.clone(),
            duration_minutes: create.duration_minutes,
            price_cents: create.price_cents,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: EntityId,
    pub unit_id: UnitId,
    pub name: String,
    pub sku: Option<String>,
    pub price_cents: Cents,
    pub cost_cents: Cents,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Product {
    /// Gross margin over the sale price, in percent. `None` for free items.
    pub fn margin_percent(&self) -> Option<f64> {
        if self.price_cents <= 0 {
            return None;
        }
        Some((self.price_cents - self.cost_cents) as f64 * 100.0 / self.price_cents as f64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProduct {
    #[validate(length(min = 2, max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(length(max = 40))]
    pub sku: Option<String>,
    #[validate(range(min = 0))]
    pub price_cents: Cents,
    #[validate(range(min = 0))]
    pub cost_cents: Cents,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, max = 100), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 40))]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub price_cents: Option<Cents>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub cost_cents: Option<Cents>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl Resource for Product {
    const PATH: &'static str = "products";
    const ENTITY: &'static str = "product";
    const UNIT_SCOPED: bool = true;

    type Create = CreateProduct;
    type Update = UpdateProduct;
    type Filter = CatalogFilter;

    fn id(&self) -> EntityId {
        self.id
    }

    fn apply_update(&mut self, update: &UpdateProduct) {
        set_if(&mut self.name, &update.name);
        set_opt_if(&mut self.sku, &update.sku);
        set_if(&mut self.price_cents, &update.price_cents);
        set_if(&mut self.cost_cents, &update.cost_cents);
        set_if(&mut self.active, &update.active);
    }

    fn placeholder(id: EntityId, create: &CreateProduct, now: Timestamp) -> Self {
        Self {
            id,
            unit_id: UnitId::nil(),
            name: create.name.clone(),
            sku: create.sku.clone(),
            price_cents: create.price_cents,
            cost_cents: create.cost_cents,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
