//! HTTP client for the barbershop REST API.
//!
//! Every request is decorated from the [`SessionStore`]: bearer token,
//! tenant, active unit and a fresh request id. A `401` clears the stored
//! credentials so the next render redirects to login.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::SessionStore;

pub const TENANT_HEADER: &str = "x-tenant-id";
pub const UNIT_HEADER: &str = "x-unit-id";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP client bound to one backend and one session.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_client(http, config.api_base_url.clone(), session))
    }

    /// Reuse an existing [`reqwest::Client`].
    pub fn with_client(http: reqwest::Client, base_url: String, session: Arc<SessionStore>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.request(Method::GET, path).await, path).await?;
        Self::parse_response(response).await
    }

    /// `GET` with query parameters serialized from `query`.
    pub async fn get_with<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let builder = self.request(Method::GET, path).await.query(query);
        let response = self.send(builder, path).await?;
        Self::parse_response(response).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::POST, path, body).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::PUT, path, body).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::PATCH, path, body).await
    }

    /// `POST` without a body, discarding the response body.
    pub async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        let response = self.send(self.request(Method::POST, path).await, path).await?;
        Self::check_status(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self.send(self.request(Method::DELETE, path).await, path).await?;
        Self::check_status(response).await
    }

    async fn send_json<T, B>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let builder = self.request(method, path).await.json(body);
        let response = self.send(builder, path).await?;
        Self::parse_response(response).await
    }

    /// Build a request carrying the session headers.
    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let ctx = self.session.request_context().await;
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        let mut builder = self
            .http
            .request(method, url)
            .header(REQUEST_ID_HEADER, uuid::Uuid::new_v4().to_string());
        if let Some(token) = ctx.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(tenant_id) = ctx.tenant_id {
            builder = builder.header(TENANT_HEADER, tenant_id.to_string());
        }
        if let Some(unit_id) = ctx.unit_id {
            builder = builder.header(UNIT_HEADER, unit_id.to_string());
        }
        builder
    }

    async fn send(&self, builder: RequestBuilder, path: &str) -> Result<Response, ApiError> {
        let request = builder.build()?;
        let method = request.method().clone();
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let response = self.http.execute(request).await.map_err(|e| {
            tracing::debug!(%method, path, request_id = %request_id, error = %e, "Request failed");
            e
        })?;

        let status = response.status();
        tracing::debug!(%method, path, request_id = %request_id, status = status.as_u16(), "API request");

        if status == reqwest::StatusCode::UNAUTHORIZED {
            if let Err(e) = self.session.clear_auth().await {
                tracing::warn!(error = %e, "Failed to clear rejected session");
            }
        }
        Ok(response)
    }

    /// Convert a non-2xx response into [`ApiError::Status`].
    async fn ensure_success(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_body(status.as_u16(), &body));
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
