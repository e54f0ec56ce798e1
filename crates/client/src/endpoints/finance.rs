use barbearia_core::error::CoreError;
use barbearia_core::finance::{AccountPayable, AccountReceivable, DreQuery, DreReport, Settlement};
use barbearia_core::types::EntityId;
use barbearia_core::validation::validate_form;

use crate::api::ApiClient;

impl ApiClient {
    pub async fn pay_account(
        &self,
        id: EntityId,
        settlement: &Settlement,
    ) -> Result<AccountPayable, CoreError> {
        validate_form(settlement)?;
        self.session().require_unit().await?;
        self.post(&format!("accounts-payable/{id}/pay"), settlement)
            .await
            .map_err(|e| e.into_core_for("account payable", Some(id)))
    }

    pub async fn receive_account(
        &self,
        id: EntityId,
        settlement: &Settlement,
    ) -> Result<AccountReceivable, CoreError> {
        validate_form(settlement)?;
        self.session().require_unit().await?;
        self.post(&format!("accounts-receivable/{id}/receive"), settlement)
            .await
            .map_err(|e| e.into_core_for("account receivable", Some(id)))
    }

    /// Income statement (DRE) for a period.
    pub async fn dre(&self, query: &DreQuery) -> Result<DreReport, CoreError> {
        validate_form(query)?;
        self.session().require_unit().await?;
        Ok(self.get_with("financial/dre", query).await?)
    }
}
