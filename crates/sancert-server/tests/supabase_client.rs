//! `SupabaseClient` against a local stub of the REST endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use sancert_core::{AuthenticatedUser, CertificateRecord};
use sancert_server::backend::{
    BackendError, CertificateBackend, RecordQuery, SupabaseClient, SupabaseConfig,
};
use serde_json::{Value, json};
use tokio::sync::Mutex;

const SERVICE_KEY: &str = "service-key";

#[derive(Default)]
struct Seen {
    uploads: Vec<(String, usize)>,
    removed: Vec<String>,
    rows: Vec<Value>,
    queries: Vec<Option<String>>,
}

type Shared = Arc<Mutex<Seen>>;

fn service_authorized(headers: &HeaderMap) -> bool {
    let bearer = format!("Bearer {SERVICE_KEY}");
    headers.get("apikey").is_some_and(|v| v == SERVICE_KEY)
        && headers.get("authorization").is_some_and(|v| v == bearer.as_str())
}

async fn user(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if headers.get("authorization").is_some_and(|v| v == "Bearer good") {
        (StatusCode::OK, Json(json!({"id": "u1", "email": "tech@example.com", "role": "authenticated"})))
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"msg": "invalid JWT"})))
    }
}

async fn upload(
    State(seen): State<Shared>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, String) {
    if !service_authorized(&headers) || name.contains("forbidden") {
        return (StatusCode::FORBIDDEN, r#"{"error":"Unauthorized"}"#.into());
    }
    assert_eq!(headers.get("content-type").unwrap(), "application/pdf");
    seen.lock().await.uploads.push((name.clone(), body.len()));
    (StatusCode::OK, json!({"Key": format!("certificates/{name}")}).to_string())
}

async fn remove(State(seen): State<Shared>, Path(name): Path<String>) -> StatusCode {
    seen.lock().await.removed.push(name);
    StatusCode::OK
}

async fn insert(
    State(seen): State<Shared>,
    headers: HeaderMap,
    Json(row): Json<Value>,
) -> (StatusCode, String) {
    if !service_authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "no".into());
    }
    if row["model"] == "duplicate" {
        return (StatusCode::CONFLICT, "duplicate key value".into());
    }
    seen.lock().await.rows.push(row);
    (StatusCode::CREATED, String::new())
}

async fn select(State(seen): State<Shared>, RawQuery(query): RawQuery) -> (StatusCode, Json<Value>) {
    let mut seen = seen.lock().await;
    seen.queries.push(query.clone());
    if query.as_deref().is_some_and(|q| q.contains("broken")) {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({})));
    }
    (StatusCode::OK, Json(Value::Array(seen.rows.clone())))
}

async fn spawn_stub() -> (String, Shared) {
    let seen: Shared = Arc::default();
    let app = Router::new()
        .route("/auth/v1/user", get(user))
        .route("/storage/v1/object/certificates/{name}", post(upload).delete(remove))
        .route("/rest/v1/certificates", post(insert).get(select))
        .with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/"), seen)
}

fn client(base_url: &str) -> SupabaseClient {
    SupabaseClient::new(&SupabaseConfig {
        base_url: base_url.to_string(),
        service_key: SERVICE_KEY.into(),
        bucket: "certificates".into(),
        table: "certificates".into(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn record(model: &str) -> CertificateRecord {
    let user = AuthenticatedUser {
        id: "u1".into(),
        email: None,
    };
    let event = json!({"model": model, "manufacturer": "Acme"});
    CertificateRecord::from_event(&event, "cert-1", &user, "https://x/cert.pdf", Utc::now())
}

#[tokio::test]
async fn verify_user_accepts_only_valid_tokens() {
    let (url, _) = spawn_stub().await;
    let client = client(&url);
    let user = client.verify_user("good").await.unwrap().unwrap();
    assert_eq!(user.id, "u1");
    assert_eq!(user.email.as_deref(), Some("tech@example.com"));
    assert!(client.verify_user("bad").await.unwrap().is_none());
}

#[tokio::test]
async fn upload_and_remove_object() {
    let (url, seen) = spawn_stub().await;
    let client = client(&url);
    client
        .upload_pdf("cert_u1_M_1.pdf", b"%PDF-1.5 test".to_vec())
        .await
        .unwrap();
    client.remove_object("cert_u1_M_1.pdf").await.unwrap();

    let seen = seen.lock().await;
    assert_eq!(seen.uploads, vec![("cert_u1_M_1.pdf".to_string(), 13)]);
    assert_eq!(seen.removed, vec!["cert_u1_M_1.pdf".to_string()]);
}

#[tokio::test]
async fn rejected_upload_carries_response_body() {
    let (url, _) = spawn_stub().await;
    let err = client(&url)
        .upload_pdf("forbidden.pdf", vec![1, 2, 3])
        .await
        .unwrap_err();
    match err {
        BackendError::Upload { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, r#"{"error":"Unauthorized"}"#);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn insert_then_select_round_trips_through_table() {
    let (url, seen) = spawn_stub().await;
    let client = client(&url);
    client.insert_record(&record("SSD-500")).await.unwrap();

    let rows = client
        .select_records(&RecordQuery::for_user("u1").page(10, 0))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["model"], "SSD-500");
    assert_eq!(rows[0]["user_email"], "unknown@example.com");

    let seen = seen.lock().await;
    assert_eq!(seen.queries, vec![Some("user_id=eq.u1&limit=10".to_string())]);
}

#[tokio::test]
async fn insert_conflict_is_an_error() {
    let (url, _) = spawn_stub().await;
    let err = client(&url).insert_record(&record("duplicate")).await.unwrap_err();
    assert_eq!(err.to_string(), "Database save failed: duplicate key value");
}

#[tokio::test]
async fn select_failure_is_database_error() {
    let (url, _) = spawn_stub().await;
    let err = client(&url)
        .select_records(&RecordQuery::for_user("broken"))
        .await
        .unwrap_err();
    assert!(matches!(err, BackendError::Select { status: 503 }));
}
