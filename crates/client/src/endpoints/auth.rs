use barbearia_core::auth::{Credentials, SessionUser};
use barbearia_core::error::CoreError;
use barbearia_core::validation::validate_form;

use crate::api::ApiClient;
use crate::session::AuthSession;

impl ApiClient {
    /// Authenticate and store the resulting session.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthSession, CoreError> {
        validate_form(credentials)?;
        let response = self.post("auth/login", credentials).await.map_err(CoreError::from)?;
        let auth = AuthSession::from_login(response);
        self.session().login(auth.clone()).await?;
        Ok(auth)
    }

    pub async fn me(&self) -> Result<SessionUser, CoreError> {
        Ok(self.get("auth/me").await?)
    }

    /// Revoke the token on the backend and clear the local session.
    ///
    /// The local session is cleared even when the backend call fails.
    pub async fn logout(&self) -> Result<(), CoreError> {
        if let Err(e) = self.post_empty("auth/logout").await {
            tracing::warn!(error = %e, "Backend logout failed");
        }
        self.session().logout().await?;
        tracing::info!("Signed out");
        Ok(())
    }
}
