//! Views that go away while their work is pending, and sessions that
//! outlive the process.

mod common;

use axum::http::Method;
use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;

use barbearia_app::hooks::AppointmentHooks;
use barbearia_app::{AppContext, ViewScope};
use barbearia_client::ClientConfig;
use barbearia_core::appointment::AppointmentStatus::{Confirmed, Created};
use barbearia_core::auth::Credentials;
use barbearia_core::tenancy::Unit;
use barbearia_events::Level;

use common::{appointment_json, page, test_app, MockBackend};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

#[tokio::test]
async fn leaving_the_view_mid_status_change_still_rolls_back() {
    let app = test_app().await;
    let id = Uuid::new_v4();
    app.backend.on(
        Method::GET,
        "/appointments",
        200,
        page(vec![appointment_json(id, app.unit_id, "CREATED")]),
    );
    app.backend.on(
        Method::GET,
        &format!("/appointments/{id}"),
        200,
        appointment_json(id, app.unit_id, "CREATED"),
    );
    let hooks = AppointmentHooks::new(app.ctx.clone());
    hooks.day(day()).await.unwrap();
    let appointment = hooks.get(id).await.unwrap();
    let before = app.ctx.cache.snapshot().await;

    let path = format!("/appointments/{id}/status");
    app.backend
        .on(Method::PATCH, &path, 409, json!({"error": "horário já ocupado"}));
    let gate = app.backend.gate(Method::PATCH, &path);
    let mut notifications = app.ctx.notifications.subscribe();

    let view = ViewScope::new();
    let (outcome, ()) = tokio::join!(
        view.run(hooks.change_status(&appointment, Confirmed, None)),
        async {
            gate.arrived().await;
            view.cancel();
        },
    );
    assert!(outcome.is_none());
    assert_eq!(hooks.get(id).await.unwrap().status, Confirmed);

    gate.release();
    let notification = notifications.recv().await.unwrap();
    assert_eq!(notification.level, Level::Error);
    assert_eq!(notification.source.as_deref(), Some("appointment.status"));

    assert_eq!(app.ctx.cache.snapshot().await, before);
    assert_eq!(hooks.get(id).await.unwrap().status, Created);
    assert_eq!(hooks.day(day()).await.unwrap().data[0].status, Created);
}

#[tokio::test]
async fn closed_view_never_receives_its_pending_read() {
    let app = test_app().await;
    let id = Uuid::new_v4();
    app.backend.on(
        Method::GET,
        "/appointments",
        200,
        page(vec![appointment_json(id, app.unit_id, "CREATED")]),
    );
    let gate = app.backend.gate(Method::GET, "/appointments");
    let hooks = AppointmentHooks::new(app.ctx.clone());

    let view = ViewScope::new();
    let (outcome, ()) = tokio::join!(view.run(hooks.day(day())), async {
        gate.arrived().await;
        view.cancel();
    });
    assert!(outcome.is_none());

    // The next view picks up the request that was already in flight.
    gate.release();
    let reopened = ViewScope::new();
    let page = reopened.run(hooks.day(day())).await.unwrap().unwrap();
    assert_eq!(page.data[0].id, id);
    assert_eq!(app.backend.count(Method::GET, "/appointments"), 1);
}

#[tokio::test]
async fn session_file_survives_a_restart() {
    let backend = MockBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = ClientConfig {
        api_base_url: backend.base_url.clone(),
        session_file: dir.path().join("nested").join("session.json"),
        ..Default::default()
    };
    let tenant_id = Uuid::new_v4();
    let unit_id = Uuid::new_v4();
    backend.on(
        Method::POST,
        "/auth/login",
        200,
        json!({
            "access_token": "opaque-token",
            "user": {
                "id": Uuid::new_v4(),
                "name": "Ana Dona",
                "email": "ana@barbearia.com",
                "role": "owner",
            },
            "tenant": {"id": tenant_id, "name": "Barbearia da Ana", "slug": "barbearia-da-ana"},
        }),
    );

    let first = AppContext::load(config.clone()).await.unwrap();
    first
        .login(&Credentials {
            email: "ana@barbearia.com".into(),
            password: "segredo123".into(),
        })
        .await
        .unwrap();
    first
        .select_unit(&Unit {
            id: unit_id,
            tenant_id,
            name: "Unidade Centro".into(),
            address: None,
            active: true,
        })
        .await
        .unwrap();
    drop(first);

    let restarted = AppContext::load(config).await.unwrap();
    let state = restarted.session.snapshot().await;
    assert_eq!(state.auth.map(|a| a.tenant_id), Some(tenant_id));
    assert_eq!(state.unit.map(|u| u.unit_id), Some(unit_id));

    backend.on(Method::GET, "/units", 200, page(vec![]));
    restarted.units().await.unwrap();
    let request = backend.requests().pop().unwrap();
    assert_eq!(request.header("authorization"), Some("Bearer opaque-token"));
    assert_eq!(request.unit_id(), Some(unit_id));
}
