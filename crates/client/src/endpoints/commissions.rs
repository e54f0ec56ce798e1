use barbearia_core::commission::{CommissionFilter, CommissionSummary};
use barbearia_core::error::CoreError;

use crate::api::ApiClient;

impl ApiClient {
    pub async fn commission_summary(
        &self,
        filter: &CommissionFilter,
    ) -> Result<Vec<CommissionSummary>, CoreError> {
        self.session().require_unit().await?;
        Ok(self.get_with("commissions/summary", filter).await?)
    }
}
