//! Generic CRUD over any [`Resource`].
//!
//! Forms are validated before any request is built, and unit-scoped
//! resources refuse to run until a unit is selected.

use barbearia_core::error::CoreError;
use barbearia_core::types::{EntityId, Page};
use barbearia_core::validation::validate_form;
use barbearia_core::Resource;

use crate::api::ApiClient;

impl ApiClient {
    pub async fn list<R: Resource>(&self, filter: &R::Filter) -> Result<Page<R>, CoreError> {
        self.ensure_scope::<R>().await?;
        self.get_with(R::PATH, filter)
            .await
            .map_err(|e| e.into_core_for(R::ENTITY, None))
    }

    pub async fn find<R: Resource>(&self, id: EntityId) -> Result<R, CoreError> {
        self.ensure_scope::<R>().await?;
        self.get(&item_path::<R>(id))
            .await
            .map_err(|e| e.into_core_for(R::ENTITY, Some(id)))
    }

    pub async fn create<R: Resource>(&self, form: &R::Create) -> Result<R, CoreError> {
        validate_form(form)?;
        self.ensure_scope::<R>().await?;
        let created: R = self
            .post(R::PATH, form)
            .await
            .map_err(|e| e.into_core_for(R::ENTITY, None))?;
        tracing::info!(entity = R::ENTITY, id = %created.id(), "Created");
        Ok(created)
    }

    pub async fn update<R: Resource>(&self, id: EntityId, form: &R::Update) -> Result<R, CoreError> {
        validate_form(form)?;
        self.ensure_scope::<R>().await?;
        self.put(&item_path::<R>(id), form)
            .await
            .map_err(|e| e.into_core_for(R::ENTITY, Some(id)))
    }

    pub async fn remove<R: Resource>(&self, id: EntityId) -> Result<(), CoreError> {
        self.ensure_scope::<R>().await?;
        self.delete(&item_path::<R>(id))
            .await
            .map_err(|e| e.into_core_for(R::ENTITY, Some(id)))?;
        tracing::info!(entity = R::ENTITY, %id, "Deleted");
        Ok(())
    }

    async fn ensure_scope<R: Resource>(&self) -> Result<(), CoreError> {
        if R::UNIT_SCOPED {
            self.session().require_unit().await?;
        }
        Ok(())
    }
}

pub(crate) fn item_path<R: Resource>(id: EntityId) -> String {
    format!("{}/{id}", R::PATH)
}
