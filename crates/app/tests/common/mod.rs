//! Mock backend and context builders for hook integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use tokio::sync::Notify;
use uuid::Uuid;

use barbearia_app::AppContext;
use barbearia_client::session::{AuthSession, UnitSelection};
use barbearia_client::{ClientConfig, SessionStore};
use barbearia_core::auth::{Role, SessionUser};
use barbearia_core::types::{TenantId, UnitId};

pub const API_PREFIX: &str = "/api/v1";

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

    pub fn unit_id(&self) -> Option<Uuid> {
        self.header("x-unit-id").and_then(|v| v.parse().ok())
    }
}

type Handler = Arc<dyn Fn(&RecordedRequest) -> (u16, Value) + Send + Sync>;

/// Holds the response of one route until released.
#[derive(Clone, Default)]
pub struct Gate {
    arrived: Arc<Notify>,
    release: Arc<Notify>,
}

impl Gate {
    /// Wait until a request reached the route.
    pub async fn arrived(&self) {
        self.arrived.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<(Method, String), Handler>>,
    gates: Mutex<HashMap<(Method, String), Gate>>,
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

    pub fn on(&self, method: Method, path: &str, status: u16, body: Value) {
        self.on_fn(method, path, move |_| (status, body.clone()));
    }

    pub fn on_fn(
        &self,
        method: Method,
        path: &str,
        handler: impl Fn(&RecordedRequest) -> (u16, Value) + Send + Sync + 'static,
    ) {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), Arc::new(handler));
    }

    /// Hold responses on `path` until [`Gate::release`] is called.
    pub fn gate(&self, method: Method, path: &str) -> Gate {
        let gate = Gate::default();
        self.state
            .gates
            .lock()
            .unwrap()
            .insert((method, path.to_string()), gate.clone());
        gate
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = RecordedRequest {
        method: method.clone(),
        path: uri
            .path()
            .strip_prefix(API_PREFIX)
            .unwrap_or(uri.path())
            .to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: serde_json::from_slice(&body).ok(),
    };
    state.requests.lock().unwrap().push(request.clone());

    let gate = state
        .gates
        .lock()
        .unwrap()
        .get(&(method.clone(), request.path.clone()))
        .cloned();
    if let Some(gate) = gate {
        gate.arrived.notify_one();
        gate.release.notified().await;
    }

    let handler = state
        .routes
        .lock()
        .unwrap()
        .get(&(method, request.path.clone()))
        .cloned();
    match handler {
        Some(handler) => {
            let (status, value) = handler(&request);
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

// ---------------------------------------------------------------------------
// Context builders
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub backend: MockBackend,
    pub ctx: AppContext,
    pub tenant_id: TenantId,
    pub unit_id: UnitId,
}

/// A context signed in to a fresh tenant with one unit selected.
pub async fn test_app() -> TestApp {
    let backend = MockBackend::start().await;
    let tenant_id = Uuid::new_v4();
    let unit_id = Uuid::new_v4();

    let session = Arc::new(SessionStore::in_memory().await);
    session
        .login(AuthSession {
            access_token: "test-token".into(),
            user: SessionUser {
                id: Uuid::new_v4(),
                name: "Rafael Gerente".into(),
                email: "rafael@barbearia.com".into(),
                role: Role::Manager,
            },
            tenant_id,
            tenant_name: "Barbearia Teste".into(),
            expires_at: None,
        })
        .await
        .unwrap();
    session
        .select_unit(UnitSelection {
            unit_id,
            tenant_id,
            unit_name: "Unidade Centro".into(),
        })
        .await
        .unwrap();

    let config = ClientConfig {
        api_base_url: backend.base_url.clone(),
        ..Default::default()
    };
    let ctx = AppContext::new(config, session).unwrap();

    TestApp {
        backend,
        ctx,
        tenant_id,
        unit_id,
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn slot_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 14, 0, 0).unwrap()
}

pub fn appointment_json(id: Uuid, unit_id: Uuid, status: &str) -> Value {
    let start = slot_start();
    json!({
        "id": id,
        "tenant_id": Uuid::nil(),
        "unit_id": unit_id,
        "customer_id": Uuid::nil(),
        "customer_name": "João",
        "professional_id": Uuid::nil(),
        "professional_name": "Marcos",
        "service_ids": [Uuid::nil()],
        "start_time": start,
        "end_time": start + chrono::Duration::minutes(30),
        "status": status,
        "total_cents": 4500,
        "notes": null,
        "created_at": start,
        "updated_at": start,
    })
}

pub fn page(items: Vec<Value>) -> Value {
    let total = items.len();
    json!({"data": items, "total": total, "page": 1, "page_size": 20})
}

pub fn customer_json(id: Uuid, name: &str) -> Value {
    let now = slot_start();
    json!({
        "id": id,
        "name": name,
        "phone": "(11) 98765-4321",
        "email": null,
        "cpf": null,
        "birth_date": null,
        "notes": null,
        "tags": [],
        "created_at": now,
        "updated_at": now,
    })
}
