//! In-memory backend for driving the router without a network.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use sancert_core::{AuthenticatedUser, CertificateRecord};
use sancert_server::backend::{BackendError, CertificateBackend, RecordQuery};
use sancert_server::routes::{AppState, build_router};
use serde_json::Value;
use tokio::sync::Mutex;
use tower::ServiceExt;

pub const BASE_URL: &str = "https://proj.supabase.co";
pub const BUCKET: &str = "certificates";
pub const TOKEN: &str = "valid-token";
pub const OTHER_TOKEN: &str = "other-token";

#[derive(Default)]
pub struct Store {
    pub objects: HashMap<String, Vec<u8>>,
    pub records: Vec<Value>,
    pub removed: Vec<String>,
    /// Status returned by the next uploads instead of success.
    pub upload_status: Option<u16>,
    pub insert_status: Option<u16>,
    pub select_status: Option<u16>,
    pub remove_status: Option<u16>,
    /// The identity provider cannot be reached.
    pub provider_down: bool,
}

pub struct FakeBackend {
    users: HashMap<String, AuthenticatedUser>,
    pub store: Mutex<Store>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let mut users = HashMap::new();
        users.insert(
            TOKEN.to_string(),
            AuthenticatedUser {
                id: "u1".into(),
                email: Some("tech@example.com".into()),
            },
        );
        users.insert(
            OTHER_TOKEN.to_string(),
            AuthenticatedUser {
                id: "u2".into(),
                email: None,
            },
        );
        Self {
            users,
            store: Mutex::new(Store::default()),
        }
    }
}

#[async_trait]
impl CertificateBackend for FakeBackend {
    async fn verify_user(&self, token: &str) -> Result<Option<AuthenticatedUser>, BackendError> {
        if self.store.lock().await.provider_down {
            return Err(BackendError::Decode("user payload: connection reset".into()));
        }
        Ok(self.users.get(token).cloned())
    }

    async fn upload_pdf(&self, object_name: &str, pdf: Vec<u8>) -> Result<(), BackendError> {
        let mut store = self.store.lock().await;
        if let Some(status) = store.upload_status {
            return Err(BackendError::Upload {
                status,
                body: r#"{"error":"Unauthorized"}"#.into(),
            });
        }
        store.objects.insert(object_name.to_string(), pdf);
        Ok(())
    }

    async fn remove_object(&self, object_name: &str) -> Result<(), BackendError> {
        let mut store = self.store.lock().await;
        if let Some(status) = store.remove_status {
            return Err(BackendError::Remove {
                status,
                body: "storage unavailable".into(),
            });
        }
        store.objects.remove(object_name);
        store.removed.push(object_name.to_string());
        Ok(())
    }

    fn public_url(&self, object_name: &str) -> String {
        format!("{BASE_URL}/storage/v1/object/public/{BUCKET}/{object_name}")
    }

    async fn insert_record(&self, record: &CertificateRecord) -> Result<(), BackendError> {
        let mut store = self.store.lock().await;
        if let Some(status) = store.insert_status {
            return Err(BackendError::Insert {
                status,
                body: "duplicate key value".into(),
            });
        }
        let row = serde_json::to_value(record).map_err(|e| BackendError::Decode(e.to_string()))?;
        store.records.push(row);
        Ok(())
    }

    async fn select_records(&self, query: &RecordQuery) -> Result<Vec<Value>, BackendError> {
        let store = self.store.lock().await;
        if let Some(status) = store.select_status {
            return Err(BackendError::Select { status });
        }
        let offset = query.offset.unwrap_or(0) as usize;
        let limit = query.limit.filter(|l| *l > 0).map_or(usize::MAX, |l| l as usize);
        Ok(store
            .records
            .iter()
            .filter(|row| row_matches(query, row))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Whether a stored row satisfies every equality filter of `query`.
pub fn row_matches(query: &RecordQuery, row: &Value) -> bool {
    query.filters.iter().all(|(column, expected)| {
        row.get(column)
            .is_some_and(|v| v.as_str().map_or_else(|| v.to_string() == *expected, |s| s == expected))
    })
}

pub fn app() -> (Router, Arc<FakeBackend>) {
    let backend = Arc::new(FakeBackend::new());
    let state = AppState::new(backend.clone(), 2 * 1024 * 1024);
    (build_router(state), backend)
}

/// Send a request and return (status, parsed JSON body).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(v) => {
            builder = builder.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let resp = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
