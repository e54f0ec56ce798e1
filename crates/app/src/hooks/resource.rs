use std::marker::PhantomData;

use barbearia_cache::mutation::patches;
use barbearia_cache::{Mutation, QueryKey};
use barbearia_core::error::CoreError;
use barbearia_core::types::{EntityId, Page};
use barbearia_core::validation::validate_form;
use barbearia_core::Resource;
use chrono::Utc;

use super::{invalidate_dependents, patch_typed, to_value};
use crate::context::AppContext;

/// Cached CRUD for one [`Resource`].
///
/// Writes follow the optimistic contract: creates show a placeholder in
/// every cached list, updates patch the detail and list entries, deletes
/// drop them. Form validation runs before anything else, so invalid input
/// neither touches the cache nor reaches the network. Writes settle on
/// their own task, so a caller that stops waiting never strands them.
pub struct ResourceHooks<R: Resource> {
    ctx: AppContext,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for ResourceHooks<R> {
    fn clone(&self) -> Self {
        Self::new(self.ctx.clone())
    }
}

impl<R: Resource> ResourceHooks<R> {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            _resource: PhantomData,
        }
    }

    /// Root query key, scoped to the active unit for unit-scoped resources.
    pub async fn root(&self) -> Result<QueryKey, CoreError> {
        if R::UNIT_SCOPED {
            let unit = self.ctx.session.require_unit().await?;
            Ok(QueryKey::scoped(R::PATH, unit))
        } else {
            Ok(QueryKey::new(R::PATH))
        }
    }

    pub async fn list(&self, filter: R::Filter) -> Result<Page<R>, CoreError> {
        let result = async {
            let key = self.root().await?.list(&filter);
            let api = self.ctx.api.clone();
            self.ctx
                .cache
                .fetch_as(key, move || async move { api.list::<R>(&filter).await })
                .await
        }
        .await;
        self.observe(result).await
    }

    pub async fn get(&self, id: EntityId) -> Result<R, CoreError> {
        let result = async {
            let key = self.root().await?.detail(id);
            let api = self.ctx.api.clone();
            self.ctx
                .cache
                .fetch_as(key, move || async move { api.find::<R>(id).await })
                .await
        }
        .await;
        self.observe(result).await
    }

    pub async fn create(&self, form: R::Create) -> Result<R, CoreError> {
        validate_form(&form)?;
        let this = self.clone();
        self.ctx
            .settle(source::<R>("create"), async move {
                this.create_optimistic(&form).await
            })
            .await
    }

    pub async fn update(&self, id: EntityId, form: R::Update) -> Result<R, CoreError> {
        validate_form(&form)?;
        let this = self.clone();
        self.ctx
            .settle(source::<R>("update"), async move {
                this.update_optimistic(id, &form).await
            })
            .await
    }

    pub async fn delete(&self, id: EntityId) -> Result<(), CoreError> {
        let this = self.clone();
        self.ctx
            .settle(source::<R>("delete"), async move {
                this.delete_optimistic(id).await
            })
            .await
    }

    async fn create_optimistic(&self, form: &R::Create) -> Result<R, CoreError> {
        let root = self.root().await?;
        let placeholder = to_value(&R::placeholder(EntityId::new_v4(), form, Utc::now()))?;

        let mutation = Mutation::new(source::<R>("create"))
            .patch_all(root.clone().lists(), move |v| patches::push_record(v, &placeholder))
            .invalidate(root.clone().lists());
        let mutation = invalidate_dependents(mutation, R::PATH);

        let created = self
            .ctx
            .cache
            .mutate(mutation, self.ctx.api.create::<R>(form))
            .await?;
        self.ctx
            .cache
            .set_query_data(root.detail(created.id()), to_value(&created)?)
            .await;
        Ok(created)
    }

    async fn update_optimistic(&self, id: EntityId, form: &R::Update) -> Result<R, CoreError> {
        let root = self.root().await?;
        let id_str = id.to_string();

        let detail_form = form.clone();
        let list_form = form.clone();
        let mutation = Mutation::new(source::<R>("update"))
            .patch(root.clone().detail(id), move |v| {
                patch_typed::<R>(v, |r| r.apply_update(&detail_form))
            })
            .patch_all(root.clone().lists(), move |v| {
                patches::update_record(v, &id_str, |record| {
                    patch_typed::<R>(record, |r| r.apply_update(&list_form))
                })
            })
            .invalidate(root.clone().lists());
        let mutation = invalidate_dependents(mutation, R::PATH);

        let updated = self
            .ctx
            .cache
            .mutate(mutation, self.ctx.api.update::<R>(id, form))
            .await?;
        self.ctx
            .cache
            .set_query_data(root.detail(id), to_value(&updated)?)
            .await;
        Ok(updated)
    }

    async fn delete_optimistic(&self, id: EntityId) -> Result<(), CoreError> {
        let root = self.root().await?;
        let id_str = id.to_string();

        let mutation = Mutation::new(source::<R>("delete"))
            .remove(root.clone().detail(id))
            .patch_all(root.clone().lists(), move |v| patches::remove_record(v, &id_str))
            .invalidate(root.lists());
        let mutation = invalidate_dependents(mutation, R::PATH);

        self.ctx
            .cache
            .mutate(mutation, self.ctx.api.remove::<R>(id))
            .await
    }

    async fn observe<T>(&self, result: Result<T, CoreError>) -> Result<T, CoreError> {
        if let Err(err) = &result {
            self.ctx.check_auth(err).await;
        }
        result
    }
}

fn source<R: Resource>(action: &str) -> String {
    format!("{}.{action}", R::ENTITY)
}
