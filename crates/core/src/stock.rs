use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::resource::{set_if, Resource};
use crate::types::{EntityId, PageParams, Timestamp, UnitId};

/// Stock position of one product at one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub id: EntityId,
    pub unit_id: UnitId,
    pub product_id: EntityId,
    #[serde(default)]
    pub product_name: String,
    pub quantity: i64,
    pub min_quantity: i64,
    pub updated_at: Timestamp,
}

impl StockItem {
    pub fn is_below_minimum(&self) -> bool {
        self.quantity < self.min_quantity
    }

    /// Quantity after applying a movement locally.
    pub fn apply_movement(&mut self, movement: &StockMovement) {
        match movement.kind {
            MovementKind::Entry => self.quantity += movement.quantity,
            MovementKind::Exit => self.quantity -= movement.quantity,
            MovementKind::Adjustment => self.quantity = movement.quantity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Entry,
    Exit,
    /// Sets the counted quantity after an inventory check.
    Adjustment,
}

/// Body of `POST /stock/{id}/movements`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StockMovement {
    pub kind: MovementKind,
    #[validate(range(min = 0, message = "quantidade não pode ser negativa"))]
    pub quantity: i64,
    #[validate(length(max = 200))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateStockItem {
    pub product_id: EntityId,
    #[validate(range(min = 0))]
    pub quantity: i64,
    #[validate(range(min = 0))]
    pub min_quantity: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateStockItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub min_quantity: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockFilter {
    #[serde(flatten)]
    pub page: PageParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub below_minimum: Option<bool>,
}

impl Resource for StockItem {
    const PATH: &'static str = "stock";
    const ENTITY: &'static str = "stock item";
    const UNIT_SCOPED: bool = true;

    type Create = CreateStockItem;
    type Update = UpdateStockItem;
    type Filter = StockFilter;

    fn id(&self) -> EntityId {
        self.id
    }

    fn apply_update(&mut self, update: &UpdateStockItem) {
        set_if(&mut self.min_quantity, &update.min_quantity);
    }

    fn placeholder(id: EntityId, create: &CreateStockItem, now: Timestamp) -> Self {
        Self {
            id,
            unit_id: UnitId::nil(),
            product_id: create.product_id,
            product_name: String::new(),
            quantity: create.quantity,
            min_quantity: create.min_quantity,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i64) -> StockItem {
        StockItem {
            id: EntityId::new_v4(),
            unit_id: UnitId::new_v4(),
            product_id: EntityId::new_v4(),
            product_name: "Pomada".into(),
            quantity,
            min_quantity: 5,
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn movements_adjust_quantity() {
        let mut stock = item(10);
        stock.apply_movement(&StockMovement {
            kind: MovementKind::Exit,
            quantity: 7,
            reason: None,
        });
        assert_eq!(stock.quantity, 3);
        assert!(stock.is_below_minimum());

        stock.apply_movement(&StockMovement {
            kind: MovementKind::Adjustment,
            quantity: 12,
            reason: Some("inventário".into()),
        });
        assert_eq!(stock.quantity, 12);
        assert!(!stock.is_below_minimum());
    }

    #[test]
    fn negative_movement_is_rejected() {
        let movement = StockMovement {
            kind: MovementKind::Entry,
            quantity: -2,
            reason: None,
        };
        assert!(movement.validate().is_err());
    }
}
