use barbearia_cache::{Mutation, QueryKey};
use barbearia_core::caixa::{
    CashMovement, CashMovementForm, CashMovementKind, CashSession, CloseCashSession,
    OpenCashSession,
};
use barbearia_core::error::CoreError;
use barbearia_core::types::EntityId;
use barbearia_core::validation::validate_form;
use chrono::Utc;
use serde_json::Value;

use super::to_value;
use crate::context::AppContext;

/// Cash-register session of the active unit.
#[derive(Clone)]
pub struct CaixaHooks {
    ctx: AppContext,
}

impl CaixaHooks {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    async fn current_key(&self) -> Result<QueryKey, CoreError> {
        let unit = self.ctx.session.require_unit().await?;
        Ok(QueryKey::scoped("caixa", unit).with("current"))
    }

    /// Open session, `None` while the drawer is closed.
    pub async fn current(&self) -> Result<Option<CashSession>, CoreError> {
        let result = async {
            let key = self.current_key().await?;
            let api = self.ctx.api.clone();
            self.ctx
                .cache
                .fetch_as(key, move || async move { api.current_cash_session().await })
                .await
        }
        .await;
        if let Err(err) = &result {
            self.ctx.check_auth(err).await;
        }
        result
    }

    /// Open the drawer. The provisional session shows as current until
    /// the backend answers.
    pub async fn open(&self, form: OpenCashSession) -> Result<CashSession, CoreError> {
        validate_form(&form)?;
        let this = self.clone();
        self.ctx
            .settle("caixa.open", async move {
                let key = this.current_key().await?;
                let unit_id = this.ctx.session.require_unit().await?;
                let opened_by = this
                    .ctx
                    .session
                    .snapshot()
                    .await
                    .auth
                    .map(|auth| auth.user.id)
                    .unwrap_or_else(EntityId::nil);
                let provisional =
                    form.provisional(EntityId::new_v4(), unit_id, opened_by, Utc::now());

                let mutation = Mutation::new("caixa.open")
                    .insert(key.clone(), to_value(&provisional)?)
                    .invalidate(QueryKey::new("dashboard"));
                let session = this
                    .ctx
                    .cache
                    .mutate(mutation, this.ctx.api.open_cash_session(&form))
                    .await?;
                this.ctx.cache.set_query_data(key, to_value(&Some(&session))?).await;
                Ok(session)
            })
            .await
    }

    /// Add cash to the drawer (reforço).
    pub async fn reinforce(&self, id: EntityId, form: CashMovementForm) -> Result<CashSession, CoreError> {
        self.movement(id, CashMovementKind::Reinforcement, form).await
    }

    /// Take cash out of the drawer (sangria).
    pub async fn withdraw(&self, id: EntityId, form: CashMovementForm) -> Result<CashSession, CoreError> {
        self.movement(id, CashMovementKind::Withdrawal, form).await
    }

    pub async fn close(&self, id: EntityId, form: CloseCashSession) -> Result<CashSession, CoreError> {
        validate_form(&form)?;
        let this = self.clone();
        self.ctx
            .settle("caixa.close", async move {
                let key = this.current_key().await?;
                let mutation = Mutation::new("caixa.close")
                    .insert(key.clone(), Value::Null)
                    .invalidate(QueryKey::new("dashboard"));
                let closed = this
                    .ctx
                    .cache
                    .mutate(mutation, this.ctx.api.close_cash_session(id, &form))
                    .await?;
                if let Some(counted) = closed.closing_balance_cents {
                    tracing::info!(
                        cash_session_id = %id,
                        difference_cents = closed.difference(counted),
                        "Cash session reconciled"
                    );
                }
                Ok(closed)
            })
            .await
    }

    async fn movement(
        &self,
        id: EntityId,
        kind: CashMovementKind,
        form: CashMovementForm,
    ) -> Result<CashSession, CoreError> {
        validate_form(&form)?;
        let source = match kind {
            CashMovementKind::Withdrawal => "caixa.withdraw",
            _ => "caixa.reinforce",
        };
        let this = self.clone();
        self.ctx
            .settle(source, async move {
                let key = this.current_key().await?;
                let pending = to_value(&CashMovement {
                    id: EntityId::new_v4(),
                    kind,
                    amount_cents: form.amount_cents,
                    description: form.description.clone(),
                    created_at: Utc::now(),
                })?;
                let mutation = Mutation::new(source).patch(key.clone(), move |v| {
                    if let Some(movements) = v.get_mut("movements").and_then(Value::as_array_mut) {
                        movements.push(pending.clone());
                    }
                });
                let request = async {
                    match kind {
                        CashMovementKind::Withdrawal => this.ctx.api.withdraw_cash(id, &form).await,
                        _ => this.ctx.api.reinforce_cash(id, &form).await,
                    }
                };
                let session = this.ctx.cache.mutate(mutation, request).await?;
                this.ctx.cache.set_query_data(key, to_value(&Some(&session))?).await;
                Ok(session)
            })
            .await
    }
}
