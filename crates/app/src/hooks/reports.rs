use barbearia_cache::{Mutation, QueryKey};
use barbearia_core::commission::{CommissionFilter, CommissionSummary};
use barbearia_core::dashboard::DailySummary;
use barbearia_core::error::CoreError;
use barbearia_core::pricing::{PricingResult, PricingSimulation};
use barbearia_core::subscription::Subscription;
use barbearia_core::validation::validate_form;
use chrono::NaiveDate;
use serde_json::Value;

use super::to_value;
use crate::context::AppContext;

/// Dashboard aggregates, commission reports, pricing and the tenant's
/// subscription.
#[derive(Clone)]
pub struct ReportHooks {
    ctx: AppContext,
}

impl ReportHooks {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    pub async fn daily_summary(&self, date: NaiveDate) -> Result<DailySummary, CoreError> {
        let result = async {
            let unit = self.ctx.session.require_unit().await?;
            let key = QueryKey::scoped("dashboard", unit)
                .with("daily")
                .with(date.to_string());
            let api = self.ctx.api.clone();
            self.ctx
                .cache
                .fetch_as(key, move || async move { api.daily_summary(date).await })
                .await
        }
        .await;
        self.observe(result).await
    }

    pub async fn commission_summary(
        &self,
        filter: CommissionFilter,
    ) -> Result<Vec<CommissionSummary>, CoreError> {
        let result = async {
            let unit = self.ctx.session.require_unit().await?;
            let key = QueryKey::scoped("commissions", unit)
                .with("summary")
                .with(serde_json::to_string(&filter).unwrap_or_default());
            let api = self.ctx.api.clone();
            self.ctx
                .cache
                .fetch_as(key, move || async move { api.commission_summary(&filter).await })
                .await
        }
        .await;
        self.observe(result).await
    }

    /// Suggested price for a service. Not cached.
    pub async fn simulate_pricing(
        &self,
        simulation: PricingSimulation,
    ) -> Result<PricingResult, CoreError> {
        validate_form(&simulation)?;
        let result = self.ctx.api.simulate_pricing(&simulation).await;
        self.ctx.report("pricing.simulate", result).await
    }

    pub async fn subscription(&self) -> Result<Subscription, CoreError> {
        let api = self.ctx.api.clone();
        let result = self
            .ctx
            .cache
            .fetch_as(subscription_key(), move || async move {
                api.current_subscription().await
            })
            .await;
        self.observe(result).await
    }

    /// Cancel at period end; the plan stays usable until then.
    pub async fn cancel_subscription(&self) -> Result<Subscription, CoreError> {
        let this = self.clone();
        self.ctx
            .settle("subscription.cancel", async move {
                let mutation = Mutation::new("subscription.cancel").patch(subscription_key(), |v| {
                    if let Some(record) = v.as_object_mut() {
                        record.insert("cancel_at_period_end".into(), Value::Bool(true));
                    }
                });
                let subscription = this
                    .ctx
                    .cache
                    .mutate(mutation, this.ctx.api.cancel_subscription())
                    .await?;
                this.ctx
                    .cache
                    .set_query_data(subscription_key(), to_value(&subscription)?)
                    .await;
                Ok(subscription)
            })
            .await
    }

    async fn observe<T>(&self, result: Result<T, CoreError>) -> Result<T, CoreError> {
        if let Err(err) = &result {
            self.ctx.check_auth(err).await;
        }
        result
    }
}

fn subscription_key() -> QueryKey {
    QueryKey::new("subscriptions").with("current")
}
