//! Mock backend for client integration tests.
//!
//! Spins an axum server on an ephemeral port. Routes are registered as
//! `(method, path)` pairs answering with a status and a JSON body; every
//! request is recorded so tests can assert on headers and call counts.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use uuid::Uuid;

use barbearia_client::session::{AuthSession, UnitSelection};
use barbearia_client::{ApiClient, SessionStore};
use barbearia_core::auth::{Role, SessionUser};
use barbearia_core::types::{TenantId, UnitId};

pub const API_PREFIX: &str = "/api/v1";

type Handler = Arc<dyn Fn(Option<&Value>) -> (u16, Value) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<(Method, String), Handler>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct MockBackend {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}{API_PREFIX}"),
            state,
        }
    }

    /// Answer `method path` with a fixed status and body.
    pub fn on(&self, method: Method, path: &str, status: u16, body: Value) {
        self.on_fn(method, path, move |_| (status, body.clone()));
    }

    /// Answer `method path` with a handler receiving the request body.
    pub fn on_fn(
        &self,
        method: Method,
        path: &str,
        handler: impl Fn(Option<&Value>) -> (u16, Value) + Send + Sync + 'static,
    ) {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), Arc::new(handler));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("no request recorded")
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix(API_PREFIX)
        .unwrap_or(uri.path())
        .to_string();
    let body = serde_json::from_slice::<Value>(&body).ok();

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        headers,
        body: body.clone(),
    });

    let handler = state.routes.lock().unwrap().get(&(method, path)).cloned();
    match handler {
        Some(handler) => {
            let (status, value) = handler(body.as_ref());
            let status = StatusCode::from_u16(status).unwrap();
            if status == StatusCode::NO_CONTENT {
                status.into_response()
            } else {
                (status, Json(value)).into_response()
            }
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "route not mocked", "code": "NOT_FOUND"})),
        )
            .into_response(),
    }
}

pub fn test_user() -> SessionUser {
    SessionUser {
        id: Uuid::new_v4(),
        name: "Carla Recepção".into(),
        email: "carla@barbearia.com".into(),
        role: Role::Receptionist,
    }
}

pub fn test_auth(tenant_id: TenantId) -> AuthSession {
    AuthSession {
        access_token: "test-token".into(),
        user: test_user(),
        tenant_id,
        tenant_name: "Barbearia Teste".into(),
        expires_at: None,
    }
}

/// In-memory session signed in to `tenant_id` with `unit_id` selected.
pub async fn signed_in_session(tenant_id: TenantId, unit_id: Option<UnitId>) -> Arc<SessionStore> {
    let session = Arc::new(SessionStore::in_memory().await);
    session.login(test_auth(tenant_id)).await.unwrap();
    if let Some(unit_id) = unit_id {
        session
            .select_unit(UnitSelection {
                unit_id,
                tenant_id,
                unit_name: "Unidade Centro".into(),
            })
            .await
            .unwrap();
    }
    session
}

pub fn client_for(backend: &MockBackend, session: Arc<SessionStore>) -> ApiClient {
    ApiClient::with_client(reqwest::Client::new(), backend.base_url.clone(), session)
}

pub fn empty_page() -> Value {
    json!({"data": [], "total": 0, "page": 1, "page_size": 20})
}
