use barbearia_cache::mutation::patches;
use barbearia_cache::{Mutation, QueryKey};
use barbearia_core::comanda::{
    AddComandaItem, CloseComanda, Comanda, ComandaFilter, ComandaStatus, OpenComanda,
};
use barbearia_core::error::CoreError;
use barbearia_core::types::{EntityId, Page};
use barbearia_core::validation::validate_form;
use chrono::Utc;
use serde_json::{json, Value};

use super::{invalidate_dependents, to_value};
use crate::context::AppContext;

/// Point-of-sale tabs of the active unit.
#[derive(Clone)]
pub struct ComandaHooks {
    ctx: AppContext,
}

impl ComandaHooks {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    async fn root(&self) -> Result<QueryKey, CoreError> {
        let unit = self.ctx.session.require_unit().await?;
        Ok(QueryKey::scoped("comandas", unit))
    }

    pub async fn list(&self, filter: ComandaFilter) -> Result<Page<Comanda>, CoreError> {
        let result = async {
            let key = self.root().await?.list(&filter);
            let api = self.ctx.api.clone();
            self.ctx
                .cache
                .fetch_as(key, move || async move { api.comandas(&filter).await })
                .await
        }
        .await;
        if let Err(err) = &result {
            self.ctx.check_auth(err).await;
        }
        result
    }

    pub async fn get(&self, id: EntityId) -> Result<Comanda, CoreError> {
        let result = async {
            let key = self.root().await?.detail(id);
            let api = self.ctx.api.clone();
            self.ctx
                .cache
                .fetch_as(key, move || async move { api.comanda(id).await })
                .await
        }
        .await;
        if let Err(err) = &result {
            self.ctx.check_auth(err).await;
        }
        result
    }

    /// Open a tab. A placeholder shows in the cached lists until the
    /// backend answers.
    pub async fn open(&self, form: OpenComanda) -> Result<Comanda, CoreError> {
        validate_form(&form)?;
        let this = self.clone();
        self.ctx
            .settle("comanda.open", async move {
                let root = this.root().await?;
                let unit_id = this.ctx.session.require_unit().await?;
                let placeholder = to_value(&form.placeholder(EntityId::new_v4(), unit_id, Utc::now()))?;
                let mutation = Mutation::new("comanda.open")
                    .patch_all(root.clone().lists(), move |v| patches::push_record(v, &placeholder))
                    .invalidate(root.clone().lists());
                let comanda = this
                    .ctx
                    .cache
                    .mutate(mutation, this.ctx.api.open_comanda(&form))
                    .await?;
                this.ctx
                    .cache
                    .set_query_data(root.detail(comanda.id), to_value(&comanda)?)
                    .await;
                Ok(comanda)
            })
            .await
    }

    pub async fn add_item(&self, id: EntityId, item: AddComandaItem) -> Result<Comanda, CoreError> {
        validate_form(&item)?;
        let this = self.clone();
        self.ctx
            .settle("comanda.add_item", async move {
                let root = this.root().await?;
                let pending = to_value(&item.to_item(EntityId::new_v4()))?;
                let mutation = Mutation::new("comanda.add_item")
                    .patch(root.clone().detail(id), move |v| {
                        if let Some(items) = v.get_mut("items").and_then(Value::as_array_mut) {
                            items.push(pending.clone());
                        }
                    })
                    .invalidate(root.clone().lists());
                this.finish(root, id, mutation, this.ctx.api.add_comanda_item(id, &item))
                    .await
            })
            .await
    }

    pub async fn remove_item(&self, id: EntityId, item_id: EntityId) -> Result<(), CoreError> {
        let this = self.clone();
        self.ctx
            .settle("comanda.remove_item", async move {
                let root = this.root().await?;
                let item = item_id.to_string();
                let mutation = Mutation::new("comanda.remove_item")
                    .patch(root.clone().detail(id), move |v| {
                        if let Some(items) = v.get_mut("items").and_then(Value::as_array_mut) {
                            items.retain(|i| i.get("id").and_then(Value::as_str) != Some(item.as_str()));
                        }
                    })
                    .invalidate(root.clone().lists())
                    .invalidate(root.detail(id));
                this.ctx
                    .cache
                    .mutate(mutation, this.ctx.api.remove_comanda_item(id, item_id))
                    .await
            })
            .await
    }

    /// Check out a comanda. Payments must cover exactly the amount due;
    /// this is checked against `comanda` before any request is sent.
    pub async fn close(&self, comanda: &Comanda, form: CloseComanda) -> Result<Comanda, CoreError> {
        validate_form(&form)?;
        form.validate_against(comanda)?;
        let id = comanda.id;
        let this = self.clone();
        self.ctx
            .settle("comanda.close", async move {
                let root = this.root().await?;
                let id_str = id.to_string();
                let list_id = id_str.clone();
                let fields = json!({ "status": ComandaStatus::Closed, "discount_cents": form.discount_cents });
                let list_fields = fields.clone();
                let mutation = Mutation::new("comanda.close")
                    .patch(root.clone().detail(id), move |v| {
                        patches::merge_fields(v, &id_str, &fields)
                    })
                    .patch_all(root.clone().lists(), move |v| {
                        patches::merge_fields(v, &list_id, &list_fields)
                    })
                    .invalidate(root.clone().lists());
                let mutation = invalidate_dependents(mutation, "comandas");
                let closed = this
                    .finish(root, id, mutation, this.ctx.api.close_comanda(id, &form))
                    .await?;
                tracing::info!(comanda_id = %id, total_cents = closed.amount_due(), "Comanda checked out");
                Ok(closed)
            })
            .await
    }

    /// Run `request` under `mutation` and store the returned comanda.
    async fn finish(
        &self,
        root: QueryKey,
        id: EntityId,
        mutation: Mutation,
        request: impl std::future::Future<Output = Result<Comanda, CoreError>>,
    ) -> Result<Comanda, CoreError> {
        let comanda = self.ctx.cache.mutate(mutation, request).await?;
        self.ctx
            .cache
            .set_query_data(root.detail(id), to_value(&comanda)?)
            .await;
        Ok(comanda)
    }
}
