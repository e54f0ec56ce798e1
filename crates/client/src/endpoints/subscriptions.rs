use barbearia_core::error::CoreError;
use barbearia_core::subscription::Subscription;

use crate::api::ApiClient;

impl ApiClient {
    pub async fn current_subscription(&self) -> Result<Subscription, CoreError> {
        self.get("subscriptions/current")
            .await
            .map_err(|e| e.into_core_for("subscription", None))
    }

    /// Cancel at the end of the current period.
    pub async fn cancel_subscription(&self) -> Result<Subscription, CoreError> {
        let subscription = self
            .post("subscriptions/current/cancel", &serde_json::json!({}))
            .await
            .map_err(|e| e.into_core_for("subscription", None))?;
        tracing::info!("Subscription cancellation requested");
        Ok(subscription)
    }
}
