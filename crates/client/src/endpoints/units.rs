use barbearia_core::error::CoreError;
use barbearia_core::tenancy::Unit;
use barbearia_core::types::Page;

use crate::api::ApiClient;
use crate::session::UnitSelection;

impl ApiClient {
    /// Units of the signed-in tenant.
    pub async fn units(&self) -> Result<Vec<Unit>, CoreError> {
        let page: Page<Unit> = self.get("units").await?;
        Ok(page.data)
    }

    /// Make `unit` the active unit. Returns `true` when the unit changed.
    pub async fn select_unit(&self, unit: &Unit) -> Result<bool, CoreError> {
        let changed = self
            .session()
            .select_unit(UnitSelection {
                unit_id: unit.id,
                tenant_id: unit.tenant_id,
                unit_name: unit.name.clone(),
            })
            .await?;
        Ok(changed)
    }
}
