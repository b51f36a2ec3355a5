//! HTTP sources against a local stand-in LMS backend.

use std::net::SocketAddr;

use axum::Json;
use axum::Router;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use serde_json::json;

use lms_common::error::FetchError;
use lms_common::types::Resource;
use lms_common::models::{KycLevel, NewLimitTemplate};
use lms_engine::{Action, Fetcher, Mutator};
use lms_sources::graphql::HttpGraphQlSource;
use lms_sources::rest::HttpRestSource;

// ============================================================
// Shared helpers
// ============================================================

async fn graphql(Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
    let query = body["query"].as_str().unwrap_or_default();
    if query.contains("GetRiskAlerts") {
        Json(json!({ "data": { "riskAlerts": [{ "id": "alert_gql_001" }] } }))
    } else if query.contains("mutation ResolveAlert") {
        Json(json!({
            "data": {
                "resolveAlert": { "success": false, "alert": null, "errors": ["alert already resolved"] }
            }
        }))
    } else if query.contains("mutation ApproveKyc") {
        let id = body["variables"]["applicationId"].clone();
        Json(json!({
            "data": {
                "approveKyc": { "success": true, "application": { "id": id, "status": "APPROVED" }, "errors": [] }
            }
        }))
    } else if query.contains("GetDashboardData") {
        Json(json!({
            "data": {
                "systemStatus": { "activeAlerts": 3 },
                "riskDistribution": { "high": 5, "medium": 12, "low": 23, "minimal": 89 }
            }
        }))
    } else {
        Json(json!({ "errors": [{ "message": "unknown query" }] }))
    }
}

/// Serve a fake LMS backend on an ephemeral port.
async fn spawn_backend() -> SocketAddr {
    let app = Router::new()
        .route(
            "/api/v1/transactions/",
            get(|| async { Json(json!({ "count": 0, "next": null, "previous": null, "results": [] })) }),
        )
        .route(
            "/api/v1/dashboard-stats/",
            get(|| async {
                Json(json!({
                    "active_alerts": 3,
                    "pending_kyc": 8,
                    "high_risk_transactions": 5,
                    "minimal_risk_transactions": 89
                }))
            }),
        )
        .route(
            "/api/v1/risk-alerts/",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
        )
        .route(
            "/api/v1/limit-templates/",
            get(|| async { "not json" }).post(|Json(body): Json<serde_json::Value>| async move {
                let mut created = body;
                created["id"] = json!("template_900");
                created["is_active"] = json!(true);
                (StatusCode::CREATED, Json(created))
            }),
        )
        .route(
            "/api/v1/kyc-applications/{id}/approve/",
            post(|Path(id): Path<String>, Json(body): Json<serde_json::Value>| async move {
                Json(json!({ "id": id, "status": "APPROVED", "notes": body["notes"] }))
            }),
        )
        .route(
            "/api/v1/transactions/{id}/",
            patch(|Path(id): Path<String>, Json(body): Json<serde_json::Value>| async move {
                if id == "txn_locked" {
                    return (StatusCode::CONFLICT, Json(json!({ "detail": "locked" })));
                }
                (StatusCode::OK, Json(json!({ "id": id, "status": body["status"] })))
            }),
        )
        .route(
            "/api/v1/risk-alerts/{id}/resolve/",
            post(|| async { StatusCode::NO_CONTENT }),
        )
        .route("/graphql/", post(graphql));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn rest(addr: SocketAddr) -> HttpRestSource {
    HttpRestSource::new(reqwest::Client::new(), format!("http://{}/api/v1", addr))
}

// ============================================================
// REST
// ============================================================

#[tokio::test]
async fn test_rest_page_passthrough() {
    let addr = spawn_backend().await;
    let page = rest(addr).fetch(Resource::Transactions).await.unwrap();
    assert_eq!(page["count"], 0);
    assert!(page["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_rest_dashboard_reshaped() {
    let addr = spawn_backend().await;
    let data = rest(addr).fetch(Resource::Dashboard).await.unwrap();
    assert_eq!(data["system_status"]["pending_kyc"], 8);
    assert_eq!(data["risk_distribution"]["high"], 5);
    assert_eq!(data["risk_distribution"]["minimal"], 89);
}

#[tokio::test]
async fn test_rest_error_status() {
    let addr = spawn_backend().await;
    assert_eq!(
        rest(addr).fetch(Resource::Alerts).await,
        Err(FetchError::Status(503))
    );
}

#[tokio::test]
async fn test_rest_malformed_body() {
    let addr = spawn_backend().await;
    let result = rest(addr).fetch(Resource::Templates).await;
    assert!(matches!(result, Err(FetchError::Malformed(_))));
}

#[tokio::test]
async fn test_rest_not_found() {
    let addr = spawn_backend().await;
    assert_eq!(
        rest(addr).fetch(Resource::Kyc).await,
        Err(FetchError::Status(404))
    );
}

#[tokio::test]
async fn test_rest_connection_refused() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = rest(addr).fetch(Resource::Transactions).await;
    assert!(matches!(result, Err(FetchError::Transport(_))));
}

// ============================================================
// GraphQL
// ============================================================

#[tokio::test]
async fn test_graphql_alerts_field_extracted() {
    let addr = spawn_backend().await;
    let source = HttpGraphQlSource::new(reqwest::Client::new(), format!("http://{}/graphql/", addr));

    let alerts = source.fetch(Resource::Alerts).await.unwrap();
    assert_eq!(alerts, json!([{ "id": "alert_gql_001" }]));
}

#[tokio::test]
async fn test_graphql_dashboard_whole_data() {
    let addr = spawn_backend().await;
    let source = HttpGraphQlSource::new(reqwest::Client::new(), format!("http://{}/graphql/", addr));

    let data = source.fetch(Resource::Dashboard).await.unwrap();
    assert_eq!(data["systemStatus"]["activeAlerts"], 3);
    assert_eq!(data["riskDistribution"]["minimal"], 89);
}

// ============================================================
// Mutations
// ============================================================

fn graphql_source(addr: SocketAddr) -> HttpGraphQlSource {
    HttpGraphQlSource::new(reqwest::Client::new(), format!("http://{}/graphql/", addr))
}

#[tokio::test]
async fn test_rest_approve_kyc() {
    let addr = spawn_backend().await;
    let action = Action::ApproveKyc {
        application_id: "kyc_001".to_string(),
        notes: Some("Approved via LMS".to_string()),
    };

    let result = rest(addr).apply(&action).await.unwrap();
    assert_eq!(result["id"], "kyc_001");
    assert_eq!(result["status"], "APPROVED");
    assert_eq!(result["notes"], "Approved via LMS");
}

#[tokio::test]
async fn test_rest_flag_transaction_patch() {
    let addr = spawn_backend().await;
    let action = Action::FlagTransaction {
        transaction_id: "txn_002".to_string(),
        reason: "structuring".to_string(),
    };
    let result = rest(addr).apply(&action).await.unwrap();
    assert_eq!(result["status"], "FLAGGED");

    let locked = Action::FlagTransaction {
        transaction_id: "txn_locked".to_string(),
        reason: "structuring".to_string(),
    };
    assert_eq!(rest(addr).apply(&locked).await, Err(FetchError::Status(409)));
}

#[tokio::test]
async fn test_rest_empty_reply_and_template_create() {
    let addr = spawn_backend().await;
    let resolve = Action::ResolveAlert {
        alert_id: "alert_001".to_string(),
        resolution: "false positive".to_string(),
    };
    assert_eq!(rest(addr).apply(&resolve).await, Ok(serde_json::Value::Null));

    let create = Action::CreateTemplate(NewLimitTemplate {
        name: "Premium".to_string(),
        description: String::new(),
        user_level: KycLevel::Level2,
        daily_withdrawal_limit: 20_000.0,
        monthly_withdrawal_limit: 200_000.0,
        single_transaction_limit: 10_000.0,
        daily_deposit_limit: 50_000.0,
        monthly_deposit_limit: 500_000.0,
    });
    let created = rest(addr).apply(&create).await.unwrap();
    assert_eq!(created["id"], "template_900");
    assert_eq!(created["user_level"], "LEVEL_2");
}

#[tokio::test]
async fn test_graphql_mutation_outcomes() {
    let addr = spawn_backend().await;
    let source = graphql_source(addr);

    let approve = Action::ApproveKyc {
        application_id: "kyc_001".to_string(),
        notes: None,
    };
    let result = source.apply(&approve).await.unwrap();
    assert_eq!(result["application"]["status"], "APPROVED");

    let resolve = Action::ResolveAlert {
        alert_id: "alert_001".to_string(),
        resolution: "duplicate".to_string(),
    };
    assert_eq!(
        source.apply(&resolve).await,
        Err(FetchError::Rejected("alert already resolved".to_string()))
    );
}
