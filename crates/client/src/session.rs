//! Persisted client session: auth, active unit and UI preferences.
//!
//! Auth and unit selection have independent lifecycles. A user can be
//! authenticated with no unit selected; unit-scoped operations call
//! [`SessionStore::require_unit`] and fail until a unit is chosen.
//!
//! Every change is written through a [`SessionPersistence`] backend so the
//! state survives restarts.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use barbearia_core::auth::{LoginResponse, SessionUser};
use barbearia_core::error::CoreError;
use barbearia_core::types::{TenantId, Timestamp, UnitId};
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Name of the cookie used for server-rendered route protection.
pub const AUTH_COOKIE: &str = "access_token";

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub user: SessionUser,
    pub tenant_id: TenantId,
    pub tenant_name: String,
    /// Read from the token's `exp` claim when present.
    pub expires_at: Option<Timestamp>,
}

impl AuthSession {
    pub fn from_login(login: LoginResponse) -> Self {
        let expires_at = read_claims(&login.access_token)
            .and_then(|claims| claims.exp)
            .and_then(|exp| Utc.timestamp_opt(exp, 0).single());
        Self {
            access_token: login.access_token,
            user: login.user,
            tenant_id: login.tenant.id,
            tenant_name: login.tenant.name,
            expires_at,
        }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSelection {
    pub unit_id: UnitId,
    pub tenant_id: TenantId,
    pub unit_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiPreferences {
    pub sidebar_collapsed: bool,
    pub theme: Theme,
    pub breadcrumbs: Vec<Breadcrumb>,
}

/// The persisted session document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    pub auth: Option<AuthSession>,
    pub unit: Option<UnitSelection>,
    pub ui: UiPreferences,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }
}

/// Identity attached to every outbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub token: Option<String>,
    pub tenant_id: Option<TenantId>,
    pub unit_id: Option<UnitId>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session document is invalid: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Unit {unit_id} belongs to another tenant")]
    TenantMismatch { unit_id: UnitId },
}

impl From<SessionError> for CoreError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotAuthenticated => CoreError::Unauthorized(err.to_string()),
            SessionError::TenantMismatch { .. } => CoreError::Forbidden(err.to_string()),
            SessionError::Io(_) | SessionError::Serde(_) => CoreError::Internal(err.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Persistence backends
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SessionPersistence: Send + Sync {
    /// Load the stored document, `None` when nothing was stored yet.
    async fn load(&self) -> Result<Option<SessionState>, SessionError>;

    async fn save(&self, state: &SessionState) -> Result<(), SessionError>;
}

/// JSON file on disk, replaced atomically on every save.
pub struct FileSessionPersistence {
    path: PathBuf,
}

impl FileSessionPersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionPersistence for FileSessionPersistence {
    async fn load(&self) -> Result<Option<SessionState>, SessionError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&bytes) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                // A corrupt document must not lock the user out.
                tracing::warn!(path = %self.path.display(), error = %e, "Discarding unreadable session file");
                Ok(None)
            }
        }
    }

    async fn save(&self, state: &SessionState) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Keeps the document in memory; used by tests and ephemeral sessions.
#[derive(Default)]
pub struct MemorySessionPersistence {
    saved: std::sync::Mutex<Option<SessionState>>,
}

impl MemorySessionPersistence {
    pub fn with_state(state: SessionState) -> Self {
        Self {
            saved: std::sync::Mutex::new(Some(state)),
        }
    }

    /// Last saved document.
    pub fn saved(&self) -> Option<SessionState> {
        self.saved.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl SessionPersistence for MemorySessionPersistence {
    async fn load(&self) -> Result<Option<SessionState>, SessionError> {
        Ok(self.saved())
    }

    async fn save(&self, state: &SessionState) -> Result<(), SessionError> {
        if let Ok(mut guard) = self.saved.lock() {
            *guard = Some(state.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl<P: SessionPersistence + ?Sized> SessionPersistence for std::sync::Arc<P> {
    async fn load(&self) -> Result<Option<SessionState>, SessionError> {
        (**self).load().await
    }

    async fn save(&self, state: &SessionState) -> Result<(), SessionError> {
        (**self).save(state).await
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

pub struct SessionStore {
    state: RwLock<SessionState>,
    persistence: Box<dyn SessionPersistence>,
}

impl SessionStore {
    /// Load the persisted session, discarding an expired token.
    pub async fn load(persistence: impl SessionPersistence + 'static) -> Result<Self, SessionError> {
        let mut state = persistence.load().await?.unwrap_or_default();

        if state.auth.as_ref().is_some_and(|auth| auth.is_expired(Utc::now())) {
            tracing::info!("Stored session token expired, signing out");
            state.auth = None;
            persistence.save(&state).await?;
        }

        Ok(Self {
            state: RwLock::new(state),
            persistence: Box::new(persistence),
        })
    }

    /// Empty, non-persistent session.
    pub async fn in_memory() -> Self {
        Self {
            state: RwLock::new(SessionState::default()),
            persistence: Box::new(MemorySessionPersistence::default()),
        }
    }

    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn request_context(&self) -> RequestContext {
        let state = self.state.read().await;
        RequestContext {
            token: state.auth.as_ref().map(|a| a.access_token.clone()),
            tenant_id: state.auth.as_ref().map(|a| a.tenant_id),
            unit_id: state.unit.as_ref().map(|u| u.unit_id),
        }
    }

    /// Active unit, or `UnitNotSelected` to gate unit-scoped pages.
    pub async fn require_unit(&self) -> Result<UnitId, CoreError> {
        let state = self.state.read().await;
        if state.auth.is_none() {
            return Err(SessionError::NotAuthenticated.into());
        }
        state
            .unit
            .as_ref()
            .map(|u| u.unit_id)
            .ok_or(CoreError::UnitNotSelected)
    }

    /// Store a fresh login. A unit selected for another tenant is dropped.
    pub async fn login(&self, auth: AuthSession) -> Result<(), SessionError> {
        self.update(|state| {
            if state
                .unit
                .as_ref()
                .is_some_and(|unit| unit.tenant_id != auth.tenant_id)
            {
                state.unit = None;
            }
            tracing::info!(user_id = %auth.user.id, tenant_id = %auth.tenant_id, "Signed in");
            state.auth = Some(auth);
        })
        .await
    }

    /// Sign out: clears credentials and the unit selection, keeps UI preferences.
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.update(|state| {
            state.auth = None;
            state.unit = None;
        })
        .await
    }

    /// Drop the credentials only, e.g. after the backend rejected the token.
    pub async fn clear_auth(&self) -> Result<(), SessionError> {
        self.update(|state| state.auth = None).await
    }

    /// Select the active unit. Returns `true` when the unit changed.
    pub async fn select_unit(&self, selection: UnitSelection) -> Result<bool, SessionError> {
        let mut state = self.state.write().await;
        let auth = state.auth.as_ref().ok_or(SessionError::NotAuthenticated)?;
        if auth.tenant_id != selection.tenant_id {
            return Err(SessionError::TenantMismatch {
                unit_id: selection.unit_id,
            });
        }
        let changed = state.unit.as_ref().map(|u| u.unit_id) != Some(selection.unit_id);
        let mut next = state.clone();
        next.unit = Some(selection);
        self.persistence.save(&next).await?;
        *state = next;
        Ok(changed)
    }

    pub async fn clear_unit(&self) -> Result<(), SessionError> {
        self.update(|state| state.unit = None).await
    }

    pub async fn update_ui(&self, f: impl FnOnce(&mut UiPreferences)) -> Result<(), SessionError> {
        self.update(|state| f(&mut state.ui)).await
    }

    /// `Set-Cookie` value mirroring the current token. Without a token the
    /// cookie is expired so it never outlives the session.
    pub async fn auth_cookie(&self) -> String {
        let state = self.state.read().await;
        match &state.auth {
            Some(auth) => format!(
                "{AUTH_COOKIE}={}; Path=/; SameSite=Lax",
                auth.access_token
            ),
            None => format!("{AUTH_COOKIE}=; Path=/; Max-Age=0; SameSite=Lax"),
        }
    }

    /// Apply `f` and persist. Memory only changes once the save succeeded.
    async fn update(&self, f: impl FnOnce(&mut SessionState)) -> Result<(), SessionError> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        f(&mut next);
        self.persistence.save(&next).await?;
        *state = next;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Token claims
// ---------------------------------------------------------------------------

/// Claims read from the access token. Signatures are checked by the
/// backend; the client only needs the expiry and subject.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    pub sub: Option<String>,
    pub exp: Option<i64>,
    pub tenant_id: Option<String>,
}

pub fn read_claims(token: &str) -> Option<TokenClaims> {
    use jsonwebtoken::{decode, DecodingKey, Validation};

    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use barbearia_core::auth::Role;
    use barbearia_core::tenancy::Tenant;
    use std::sync::Arc;

    fn token(exp: i64) -> String {
        let claims = serde_json::json!({"sub": "user-1", "exp": exp});
        jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(b"server-secret"),
        )
        .unwrap()
    }

    fn auth(tenant_id: TenantId, exp: i64) -> AuthSession {
        AuthSession::from_login(LoginResponse {
            access_token: token(exp),
            user: SessionUser {
                id: uuid::Uuid::new_v4(),
                name: "Ana".into(),
                email: "ana@barbearia.com".into(),
                role: Role::Owner,
            },
            tenant: Tenant {
                id: tenant_id,
                name: "Barbearia do Zé".into(),
                slug: "barbearia-do-ze".into(),
            },
        })
    }

    fn future_exp() -> i64 {
        Utc::now().timestamp() + 3600
    }

    #[test]
    fn claims_are_read_without_the_signing_key() {
        let claims = read_claims(&token(1_900_000_000)).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("user-1"));
        assert_eq!(claims.exp, Some(1_900_000_000));
    }

    #[test]
    fn garbage_token_has_no_claims() {
        assert!(read_claims("not-a-jwt").is_none());
    }

    #[tokio::test]
    async fn authenticated_without_unit_is_gated() {
        let store = SessionStore::in_memory().await;
        store.login(auth(TenantId::new_v4(), future_exp())).await.unwrap();

        assert!(store.snapshot().await.is_authenticated());
        assert_eq!(store.require_unit().await, Err(CoreError::UnitNotSelected));
    }

    #[tokio::test]
    async fn selecting_a_unit_requires_login() {
        let store = SessionStore::in_memory().await;
        let err = store
            .select_unit(UnitSelection {
                unit_id: UnitId::new_v4(),
                tenant_id: TenantId::new_v4(),
                unit_name: "Centro".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::NotAuthenticated));
    }

    #[tokio::test]
    async fn unit_of_another_tenant_is_rejected() {
        let store = SessionStore::in_memory().await;
        store.login(auth(TenantId::new_v4(), future_exp())).await.unwrap();
        let err = store
            .select_unit(UnitSelection {
                unit_id: UnitId::new_v4(),
                tenant_id: TenantId::new_v4(),
                unit_name: "Outra".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::TenantMismatch { .. }));
    }

    #[tokio::test]
    async fn request_context_carries_tenant_and_unit() {
        let tenant = TenantId::new_v4();
        let unit = UnitId::new_v4();
        let store = SessionStore::in_memory().await;
        store.login(auth(tenant, future_exp())).await.unwrap();
        let changed = store
            .select_unit(UnitSelection {
                unit_id: unit,
                tenant_id: tenant,
                unit_name: "Centro".into(),
            })
            .await
            .unwrap();
        assert!(changed);

        let ctx = store.request_context().await;
        assert_eq!(ctx.tenant_id, Some(tenant));
        assert_eq!(ctx.unit_id, Some(unit));
        assert!(ctx.token.is_some());
        assert_eq!(store.require_unit().await, Ok(unit));
    }

    #[tokio::test]
    async fn cookie_follows_token_lifecycle() {
        let store = SessionStore::in_memory().await;
        assert!(store.auth_cookie().await.contains("Max-Age=0"));

        let session = auth(TenantId::new_v4(), future_exp());
        let token = session.access_token.clone();
        store.login(session).await.unwrap();
        assert!(store.auth_cookie().await.starts_with(&format!("access_token={token}")));

        store.logout().await.unwrap();
        assert!(store.auth_cookie().await.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn logout_keeps_ui_preferences() {
        let store = SessionStore::in_memory().await;
        store.login(auth(TenantId::new_v4(), future_exp())).await.unwrap();
        store
            .update_ui(|ui| {
                ui.theme = Theme::Dark;
                ui.sidebar_collapsed = true;
            })
            .await
            .unwrap();
        store.logout().await.unwrap();

        let state = store.snapshot().await;
        assert!(state.auth.is_none());
        assert!(state.unit.is_none());
        assert_eq!(state.ui.theme, Theme::Dark);
        assert!(state.ui.sidebar_collapsed);
    }

    #[tokio::test]
    async fn every_change_is_persisted() {
        let backend = Arc::new(MemorySessionPersistence::default());
        let store = SessionStore::load(Arc::clone(&backend)).await.unwrap();
        store.login(auth(TenantId::new_v4(), future_exp())).await.unwrap();

        let saved = backend.saved().unwrap();
        assert!(saved.auth.is_some());
    }

    struct ReadOnlyDisk;

    #[async_trait]
    impl SessionPersistence for ReadOnlyDisk {
        async fn load(&self) -> Result<Option<SessionState>, SessionError> {
            Ok(None)
        }

        async fn save(&self, _state: &SessionState) -> Result<(), SessionError> {
            Err(std::io::Error::other("read-only file system").into())
        }
    }

    #[tokio::test]
    async fn failed_save_leaves_memory_unchanged() {
        let store = SessionStore::load(ReadOnlyDisk).await.unwrap();

        let err = store.login(auth(TenantId::new_v4(), future_exp())).await;
        assert!(matches!(err, Err(SessionError::Io(_))));
        assert!(store.snapshot().await.auth.is_none());

        store.update_ui(|ui| ui.sidebar_collapsed = true).await.unwrap_err();
        assert!(!store.snapshot().await.ui.sidebar_collapsed);
    }

    #[tokio::test]
    async fn expired_token_is_dropped_at_load() {
        let tenant = TenantId::new_v4();
        let state = SessionState {
            auth: Some(auth(tenant, Utc::now().timestamp() - 60)),
            unit: Some(UnitSelection {
                unit_id: UnitId::new_v4(),
                tenant_id: tenant,
                unit_name: "Centro".into(),
            }),
            ui: UiPreferences::default(),
        };
        let store = SessionStore::load(MemorySessionPersistence::with_state(state))
            .await
            .unwrap();
        let loaded = store.snapshot().await;
        assert!(loaded.auth.is_none());
        assert!(loaded.unit.is_some());
    }

    #[tokio::test]
    async fn file_backend_round_trips_and_tolerates_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = SessionStore::load(FileSessionPersistence::new(&path)).await.unwrap();
        store.update_ui(|ui| ui.theme = Theme::Light).await.unwrap();

        let reloaded = SessionStore::load(FileSessionPersistence::new(&path)).await.unwrap();
        assert_eq!(reloaded.snapshot().await.ui.theme, Theme::Light);

        tokio::fs::write(&path, b"{not json").await.unwrap();
        let recovered = SessionStore::load(FileSessionPersistence::new(&path)).await.unwrap();
        assert_eq!(recovered.snapshot().await, SessionState::default());
    }
}
