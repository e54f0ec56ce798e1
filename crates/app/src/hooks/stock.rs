use barbearia_cache::mutation::patches;
use barbearia_cache::Mutation;
use barbearia_core::error::CoreError;
use barbearia_core::stock::{StockFilter, StockItem, StockMovement};
use barbearia_core::types::EntityId;
use barbearia_core::validation::validate_form;

use super::{invalidate_dependents, patch_typed, to_value, ResourceHooks};
use crate::context::AppContext;

#[derive(Clone)]
pub struct StockHooks {
    ctx: AppContext,
    items: ResourceHooks<StockItem>,
}

impl StockHooks {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            items: ResourceHooks::new(ctx.clone()),
            ctx,
        }
    }

    pub fn items(&self) -> &ResourceHooks<StockItem> {
        &self.items
    }

    /// Items below their minimum quantity.
    pub async fn low_stock(&self) -> Result<Vec<StockItem>, CoreError> {
        let page = self
            .items
            .list(StockFilter {
                below_minimum: Some(true),
                ..Default::default()
            })
            .await?;
        Ok(page
            .data
            .into_iter()
            .filter(StockItem::is_below_minimum)
            .collect())
    }

    /// Record an entry, exit or inventory adjustment.
    pub async fn record_movement(
        &self,
        id: EntityId,
        movement: StockMovement,
    ) -> Result<StockItem, CoreError> {
        validate_form(&movement)?;
        let this = self.clone();
        self.ctx
            .settle("stock.movement", async move {
                let root = this.items.root().await?;
                let detail_movement = movement.clone();
                let list_movement = movement.clone();
                let id_str = id.to_string();
                let mutation = Mutation::new("stock.movement")
                    .patch(root.clone().detail(id), move |v| {
                        patch_typed::<StockItem>(v, |item| item.apply_movement(&detail_movement))
                    })
                    .patch_all(root.clone().lists(), move |v| {
                        patches::update_record(v, &id_str, |record| {
                            patch_typed::<StockItem>(record, |item| item.apply_movement(&list_movement))
                        })
                    })
                    .invalidate(root.clone().lists());
                let mutation = invalidate_dependents(mutation, "stock");

                let item = this
                    .ctx
                    .cache
                    .mutate(mutation, this.ctx.api.record_stock_movement(id, &movement))
                    .await?;
                this.ctx.cache.set_query_data(root.detail(id), to_value(&item)?).await;
                if item.is_below_minimum() {
                    tracing::warn!(stock_item_id = %id, quantity = item.quantity, "Stock below minimum");
                }
                Ok(item)
            })
            .await
    }
}
