use barbearia_core::dashboard::DailySummary;
use barbearia_core::error::CoreError;
use chrono::NaiveDate;

use crate::api::ApiClient;

impl ApiClient {
    pub async fn daily_summary(&self, date: NaiveDate) -> Result<DailySummary, CoreError> {
        self.session().require_unit().await?;
        Ok(self.get_with("dashboard/daily", &[("date", date)]).await?)
    }
}
