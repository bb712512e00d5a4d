//! HTTP-level integration tests exercising the router, auth middleware, and
//! the provisioning endpoint end to end.

mod test_utils;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use zenora::config::AppConfig;
use zenora::server::{AppState, create_app, create_test_app_state};

use test_utils::{seed_department, seed_tenant, seed_user, setup_db, today_stamp};

async fn setup_app() -> (AppState, axum::Router) {
    let config = AppConfig {
        profile: "test".to_string(),
        operator_tokens: vec!["test-token".to_string()],
        ..Default::default()
    };

    let db = setup_db().await;
    let state = create_test_app_state(config, db);
    let app = create_app(state.clone());
    (state, app)
}

fn authed(builder: axum::http::request::Builder, tenant_id: Uuid) -> axum::http::request::Builder {
    builder
        .header("Authorization", "Bearer test-token")
        .header("X-Tenant-Id", tenant_id.to_string())
        .header("Content-Type", "application/json")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_root_is_public() {
    let (_state, app) = setup_app().await;

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["service"], "zenora-provisioning");
}

#[tokio::test]
async fn test_healthz() {
    let (_state, app) = setup_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_api_requires_bearer_token() {
    let (_state, app) = setup_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/tenants")
                .header("Content-Type", "application/json")
                .body(Body::from(json!({ "name": "Acme" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_api_requires_tenant_header() {
    let (_state, app) = setup_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/tenants")
                .header("Authorization", "Bearer test-token")
                .header("Content-Type", "application/json")
                .body(Body::from(json!({ "name": "Acme" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn test_tenant_create_and_get() {
    let (_state, app) = setup_app().await;
    let scope = Uuid::new_v4();

    let response = app
        .clone()
        .oneshot(
            authed(
                Request::builder().method("POST").uri("/api/v1/tenants"),
                scope,
            )
            .body(Body::from(json!({ "name": "Acme Corp" }).to_string()))
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["data"]["name"], "Acme Corp");
    let tenant_id = created["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            authed(
                Request::builder()
                    .method("GET")
                    .uri(format!("/api/v1/tenants/{tenant_id}")),
                scope,
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["data"]["id"], tenant_id.as_str());
}

#[tokio::test]
async fn test_provision_endpoint_creates_employee() {
    let (state, app) = setup_app().await;

    let tenant = seed_tenant(&state.db, "Acme").await;
    let dept = seed_department(&state.db, tenant.id, "Engineering").await;
    let user = seed_user(&state.db, tenant.id, "jane@acme.example", "employee", None).await;

    let payload = json!({
        "user_id": user.id,
        "job_title": "Engineer",
        "department_id": dept.id,
    });

    let response = app
        .clone()
        .oneshot(
            authed(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/employees/provision"),
                tenant.id,
            )
            .body(Body::from(payload.to_string()))
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(
        body["data"]["employee_number"],
        format!("EMP-{}-001", today_stamp())
    );

    // Provisioning again with only a title change updates in place.
    let employee_id = body["data"]["id"].as_str().unwrap().to_string();
    let payload = json!({
        "user_id": user.id,
        "job_title": "Staff Engineer",
    });

    let response = app
        .oneshot(
            authed(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/employees/provision"),
                tenant.id,
            )
            .body(Body::from(payload.to_string()))
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["id"], employee_id.as_str());
    assert_eq!(body["data"]["job_title"], "Staff Engineer");
}

#[tokio::test]
async fn test_provision_endpoint_validation_error_shape() {
    let (state, app) = setup_app().await;

    let tenant = seed_tenant(&state.db, "Acme").await;
    let user = seed_user(&state.db, tenant.id, "jane@acme.example", "employee", None).await;

    let response = app
        .oneshot(
            authed(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/employees/provision"),
                tenant.id,
            )
            .body(Body::from(json!({ "user_id": user.id }).to_string()))
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_FAILED");
    assert!(body["details"]["job_title"].is_string());
    assert!(body["details"]["department_id"].is_string());
    assert!(body["trace_id"].is_string());
}

#[tokio::test]
async fn test_subordinates_endpoint() {
    let (state, app) = setup_app().await;

    let tenant = seed_tenant(&state.db, "Acme").await;
    let dept = seed_department(&state.db, tenant.id, "Engineering").await;
    let boss = seed_user(&state.db, tenant.id, "boss@acme.example", "manager", None).await;
    let report = seed_user(&state.db, tenant.id, "dev@acme.example", "employee", None).await;

    let svc = test_utils::provisioning(&state.db);
    let outcome = svc
        .provision(
            tenant.id,
            zenora::provisioning::ProvisionRequest {
                user_id: report.id,
                job_title: Some("Engineer".to_string()),
                department_id: Some(dept.id),
                manager_user_id: Some(boss.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let boss_employee_id = outcome.employee.manager_id.unwrap();

    let response = app
        .oneshot(
            authed(
                Request::builder()
                    .method("GET")
                    .uri(format!("/api/v1/employees/{boss_employee_id}/subordinates")),
                tenant.id,
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let ids = body["data"].as_array().unwrap();
    assert_eq!(ids.len(), 1);
    assert_eq!(ids[0], outcome.employee.id.to_string());
}
