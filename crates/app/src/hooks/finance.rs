use barbearia_cache::mutation::patches;
use barbearia_cache::{Mutation, QueryKey};
use barbearia_core::error::CoreError;
use barbearia_core::finance::{
    AccountPayable, AccountReceivable, AccountStatus, DreQuery, DreReport, Settlement,
};
use barbearia_core::types::EntityId;
use barbearia_core::validation::validate_form;
use barbearia_core::Resource;
use serde_json::json;

use super::{invalidate_dependents, to_value, ResourceHooks};
use crate::context::AppContext;

/// Accounts payable/receivable and the income statement.
#[derive(Clone)]
pub struct FinanceHooks {
    ctx: AppContext,
    payables: ResourceHooks<AccountPayable>,
    receivables: ResourceHooks<AccountReceivable>,
}

impl FinanceHooks {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            payables: ResourceHooks::new(ctx.clone()),
            receivables: ResourceHooks::new(ctx.clone()),
            ctx,
        }
    }

    pub fn payables(&self) -> &ResourceHooks<AccountPayable> {
        &self.payables
    }

    pub fn receivables(&self) -> &ResourceHooks<AccountReceivable> {
        &self.receivables
    }

    /// Mark a payable as paid.
    pub async fn pay(&self, id: EntityId, settlement: Settlement) -> Result<AccountPayable, CoreError> {
        validate_form(&settlement)?;
        let this = self.clone();
        self.ctx
            .settle("account_payable.pay", async move {
                let root = this.payables.root().await?;
                let mutation =
                    settle_mutation::<AccountPayable>("account_payable.pay", &root, id, &settlement);
                let paid = this
                    .ctx
                    .cache
                    .mutate(mutation, this.ctx.api.pay_account(id, &settlement))
                    .await?;
                this.ctx.cache.set_query_data(root.detail(id), to_value(&paid)?).await;
                Ok(paid)
            })
            .await
    }

    /// Mark a receivable as received.
    pub async fn receive(
        &self,
        id: EntityId,
        settlement: Settlement,
    ) -> Result<AccountReceivable, CoreError> {
        validate_form(&settlement)?;
        let this = self.clone();
        self.ctx
            .settle("account_receivable.receive", async move {
                let root = this.receivables.root().await?;
                let mutation = settle_mutation::<AccountReceivable>(
                    "account_receivable.receive",
                    &root,
                    id,
                    &settlement,
                );
                let received = this
                    .ctx
                    .cache
                    .mutate(mutation, this.ctx.api.receive_account(id, &settlement))
                    .await?;
                this.ctx
                    .cache
                    .set_query_data(root.detail(id), to_value(&received)?)
                    .await;
                Ok(received)
            })
            .await
    }

    /// Income statement (DRE) of the active unit.
    pub async fn dre(&self, query: DreQuery) -> Result<DreReport, CoreError> {
        validate_form(&query)?;
        let result = async {
            let unit = self.ctx.session.require_unit().await?;
            let key = QueryKey::scoped("financial", unit).with("dre").list(&query);
            let api = self.ctx.api.clone();
            self.ctx
                .cache
                .fetch_as(key, move || async move { api.dre(&query).await })
                .await
        }
        .await;
        if let Err(err) = &result {
            self.ctx.check_auth(err).await;
        }
        result
    }
}

fn settle_mutation<R: Resource>(
    label: &str,
    root: &QueryKey,
    id: EntityId,
    settlement: &Settlement,
) -> Mutation {
    let fields = json!({
        "status": AccountStatus::Settled,
        "settled_at": settlement.settled_at.unwrap_or_else(chrono::Utc::now),
    });
    let list_fields = fields.clone();
    let id_str = id.to_string();
    let list_id = id_str.clone();
    let mutation = Mutation::new(label)
        .patch(root.clone().detail(id), move |v| {
            patches::merge_fields(v, &id_str, &fields)
        })
        .patch_all(root.clone().lists(), move |v| {
            patches::merge_fields(v, &list_id, &list_fields)
        })
        .invalidate(root.clone().lists());
    invalidate_dependents(mutation, R::PATH)
}
