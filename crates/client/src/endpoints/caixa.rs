use barbearia_core::caixa::{CashMovementForm, CashSession, CloseCashSession, OpenCashSession};
use barbearia_core::error::CoreError;
use barbearia_core::types::EntityId;
use barbearia_core::validation::validate_form;

use crate::api::ApiClient;
use crate::error::ApiError;

impl ApiClient {
    /// Open cash session of the active unit, `None` when the drawer is closed.
    pub async fn current_cash_session(&self) -> Result<Option<CashSession>, CoreError> {
        self.session().require_unit().await?;
        match self.get("caixa/current").await {
            Ok(session) => Ok(Some(session)),
            Err(ApiError::Status { status: 404, .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn open_cash_session(&self, form: &OpenCashSession) -> Result<CashSession, CoreError> {
        validate_form(form)?;
        self.session().require_unit().await?;
        let session: CashSession = self.post("caixa/open", form).await?;
        tracing::info!(cash_session_id = %session.id, "Cash session opened");
        Ok(session)
    }

    pub async fn reinforce_cash(
        &self,
        id: EntityId,
        form: &CashMovementForm,
    ) -> Result<CashSession, CoreError> {
        self.cash_movement(id, "reinforce", form).await
    }

    pub async fn withdraw_cash(
        &self,
        id: EntityId,
        form: &CashMovementForm,
    ) -> Result<CashSession, CoreError> {
        self.cash_movement(id, "withdraw", form).await
    }

    pub async fn close_cash_session(
        &self,
        id: EntityId,
        form: &CloseCashSession,
    ) -> Result<CashSession, CoreError> {
        validate_form(form)?;
        self.session().require_unit().await?;
        let session: CashSession = self
            .post(&format!("caixa/{id}/close"), form)
            .await
            .map_err(|e| e.into_core_for("cash session", Some(id)))?;
        tracing::info!(cash_session_id = %id, "Cash session closed");
        Ok(session)
    }

    async fn cash_movement(
        &self,
        id: EntityId,
        action: &str,
        form: &CashMovementForm,
    ) -> Result<CashSession, CoreError> {
        validate_form(form)?;
        self.session().require_unit().await?;
        self.post(&format!("caixa/{id}/{action}"), form)
            .await
            .map_err(|e| e.into_core_for("cash session", Some(id)))
    }
}
