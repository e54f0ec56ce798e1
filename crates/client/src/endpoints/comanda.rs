use barbearia_core::comanda::{AddComandaItem, CloseComanda, Comanda, ComandaFilter, OpenComanda};
use barbearia_core::error::CoreError;
use barbearia_core::types::{EntityId, Page};
use barbearia_core::validation::validate_form;

use crate::api::ApiClient;

const ENTITY: &str = "comanda";

impl ApiClient {
    pub async fn comandas(&self, filter: &ComandaFilter) -> Result<Page<Comanda>, CoreError> {
        self.session().require_unit().await?;
        Ok(self.get_with("comandas", filter).await?)
    }

    pub async fn comanda(&self, id: EntityId) -> Result<Comanda, CoreError> {
        self.session().require_unit().await?;
        self.get(&format!("comandas/{id}"))
            .await
            .map_err(|e| e.into_core_for(ENTITY, Some(id)))
    }

    pub async fn open_comanda(&self, form: &OpenComanda) -> Result<Comanda, CoreError> {
        self.session().require_unit().await?;
        Ok(self.post("comandas", form).await?)
    }

    pub async fn add_comanda_item(
        &self,
        id: EntityId,
        item: &AddComandaItem,
    ) -> Result<Comanda, CoreError> {
        validate_form(item)?;
        self.session().require_unit().await?;
        self.post(&format!("comandas/{id}/items"), item)
            .await
            .map_err(|e| e.into_core_for(ENTITY, Some(id)))
    }

    pub async fn remove_comanda_item(&self, id: EntityId, item_id: EntityId) -> Result<(), CoreError> {
        self.session().require_unit().await?;
        self.delete(&format!("comandas/{id}/items/{item_id}"))
            .await
            .map_err(|e| e.into_core_for(ENTITY, Some(id)))
    }

    /// Close (checkout) a comanda. Callers holding the current comanda
    /// should also run [`CloseComanda::validate_against`] first.
    pub async fn close_comanda(&self, id: EntityId, form: &CloseComanda) -> Result<Comanda, CoreError> {
        validate_form(form)?;
        self.session().require_unit().await?;
        let closed: Comanda = self
            .post(&format!("comandas/{id}/close"), form)
            .await
            .map_err(|e| e.into_core_for(ENTITY, Some(id)))?;
        tracing::info!(comanda_id = %id, "Comanda closed");
        Ok(closed)
    }
}
