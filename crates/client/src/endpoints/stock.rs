use barbearia_core::error::CoreError;
use barbearia_core::stock::{StockItem, StockMovement};
use barbearia_core::types::EntityId;
use barbearia_core::validation::validate_form;

use crate::api::ApiClient;

impl ApiClient {
    pub async fn record_stock_movement(
        &self,
        id: EntityId,
        movement: &StockMovement,
    ) -> Result<StockItem, CoreError> {
        validate_form(movement)?;
        self.session().require_unit().await?;
        self.post(&format!("stock/{id}/movements"), movement)
            .await
            .map_err(|e| e.into_core_for("stock item", Some(id)))
    }
}
