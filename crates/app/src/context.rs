//! Shared application state handed to every hook.

use std::future::Future;
use std::sync::Arc;

use barbearia_cache::{QueryCache, QueryKey};
use barbearia_client::session::FileSessionPersistence;
use barbearia_client::{ApiClient, ClientConfig, SessionStore};
use barbearia_core::auth::Credentials;
use barbearia_core::error::CoreError;
use barbearia_core::tenancy::Unit;
use barbearia_events::{Notification, NotificationBus};

/// Cloneable handle to the client, cache, session and notification bus.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ClientConfig>,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
    pub cache: Arc<QueryCache>,
    pub notifications: Arc<NotificationBus>,
}

impl AppContext {
    pub fn new(config: ClientConfig, session: Arc<SessionStore>) -> Result<Self, CoreError> {
        let api = ApiClient::new(&config, Arc::clone(&session))?;
        let cache = Arc::new(QueryCache::new(config.cache_stale_time()));
        Ok(Self {
            config: Arc::new(config),
            session,
            api,
            cache,
            notifications: Arc::new(NotificationBus::default()),
        })
    }

    /// Build a context whose session is persisted at `config.session_file`.
    pub async fn load(config: ClientConfig) -> Result<Self, CoreError> {
        let persistence = FileSessionPersistence::new(config.session_file.clone());
        let session = Arc::new(SessionStore::load(persistence).await?);
        Self::new(config, session)
    }

    /// Publish a failed operation as a notification.
    ///
    /// An `Unauthorized` failure also drops every cached query; the API
    /// client has already cleared the stored credentials.
    pub async fn report<T>(&self, source: &str, result: Result<T, CoreError>) -> Result<T, CoreError> {
        if let Err(err) = &result {
            self.check_auth(err).await;
            self.notifications
                .publish(Notification::from_error(err).with_source(source));
        }
        result
    }

    /// Run a write on its own task and report its outcome there.
    ///
    /// The caller may stop waiting, e.g. when its [`ViewScope`] is
    /// cancelled; the request still settles, the cache is confirmed or
    /// rolled back and a failure is still published.
    ///
    /// [`ViewScope`]: crate::ViewScope
    pub async fn settle<T, F>(&self, source: impl Into<String>, write: F) -> Result<T, CoreError>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, CoreError>> + Send + 'static,
    {
        let ctx = self.clone();
        let source = source.into();
        let task = tokio::spawn(async move {
            let result = write.await;
            ctx.report(&source, result).await
        });
        match task.await {
            Ok(result) => result,
            Err(e) => Err(CoreError::Internal(format!("write task failed: {e}"))),
        }
    }

    /// Clear the cache after an authentication failure without notifying.
    pub async fn check_auth(&self, err: &CoreError) {
        if err.is_auth_failure() {
            tracing::info!("Session rejected by backend, clearing cached data");
            self.cache.clear().await;
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<(), CoreError> {
        let result = self.api.login(credentials).await;
        let auth = self.report("auth.login", result).await?;
        self.cache.clear().await;
        self.notifications.publish(
            Notification::success("Bem-vindo", format!("Olá, {}", auth.user.name))
                .with_source("auth.login"),
        );
        Ok(())
    }

    /// Sign out and forget every cached query.
    pub async fn logout(&self) -> Result<(), CoreError> {
        self.api.logout().await?;
        self.cache.clear().await;
        Ok(())
    }

    /// Units of the tenant, served from cache.
    pub async fn units(&self) -> Result<Vec<Unit>, CoreError> {
        let api = self.api.clone();
        let result = self
            .cache
            .fetch_as(QueryKey::new("units"), move || async move { api.units().await })
            .await;
        if let Err(err) = &result {
            self.check_auth(err).await;
        }
        result
    }

    /// Switch the active unit.
    ///
    /// Every unit-scoped query is dropped and fetches still running under
    /// the previous unit are prevented from writing.
    pub async fn select_unit(&self, unit: &Unit) -> Result<(), CoreError> {
        let result = self.api.select_unit(unit).await;
        let changed = self.report("unit.select", result).await?;
        if changed {
            let dropped = self.cache.clear_unit_scoped().await;
            tracing::info!(unit_id = %unit.id, unit = %unit.name, dropped, "Active unit changed");
            self.notifications.publish(
                Notification::info("Unidade selecionada", unit.name.clone()).with_source("unit.select"),
            );
        }
        Ok(())
    }

    /// Look a unit up by id among the tenant's units and select it.
    pub async fn select_unit_by_id(&self, unit_id: uuid::Uuid) -> Result<Unit, CoreError> {
        let unit = self
            .units()
            .await?
            .into_iter()
            .find(|u| u.id == unit_id)
            .ok_or(CoreError::NotFound {
                entity: "unit",
                id: Some(unit_id),
            })?;
        self.select_unit(&unit).await?;
        Ok(unit)
    }
}
