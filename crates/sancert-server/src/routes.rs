use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use sancert_core::record::CertificateRecord;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{self, Caller};
use crate::backend::CertificateBackend;
use crate::certificates::CertificateService;
use crate::error::ApiError;

pub const SERVICE_NAME: &str = "Media Sanitization Certificate API";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn CertificateBackend>,
    pub certificates: CertificateService,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(backend: Arc<dyn CertificateBackend>, max_body_bytes: usize) -> Self {
        Self {
            certificates: CertificateService::new(Arc::clone(&backend)),
            backend,
            max_body_bytes,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/user-info", get(user_info))
        .route("/generate-certificate", post(generate_certificate))
        .route("/my-certificates", get(my_certificates))
        .route("/certificates-by-device/{model}", get(certificates_by_device))
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /`: service banner.
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now(),
    }))
}

/// `GET /user-info`: the caller's identity. Every failure here is a 401.
pub async fn user_info(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let user = auth::authenticate(state.backend.as_ref(), &headers)
        .await
        .map_err(|e| match e {
            ApiError::Unauthorized(_) => e,
            other => ApiError::Unauthorized(other.to_string()),
        })?;
    Ok(Json(json!({
        "user_id": user.id,
        "email": user.email,
        "authenticated": true,
    })))
}

/// `POST /generate-certificate`
pub async fn generate_certificate(
    State(state): State<AppState>,
    Caller(user): Caller,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let issued = state.certificates.generate(&user, &body).await?;
    Ok(Json(json!({
        "certificate_id": issued.certificate_id,
        "pdf_url": issued.pdf_url,
        "created_at": issued.created_at,
        "user_id": issued.user_id,
        "device_model": issued.device_model,
        "message": "Certificate generated successfully",
    })))
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

const fn default_limit() -> u32 {
    10
}

/// `GET /my-certificates?limit=&offset=`
pub async fn my_certificates(
    State(state): State<AppState>,
    Caller(user): Caller,
    page: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(page) = page.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;
    let rows = state
        .certificates
        .list_for_user(&user, page.limit, page.offset)
        .await?;
    Ok(Json(json!({
        "user_id": user.id,
        "count": rows.len(),
        "certificates": rows,
    })))
}

/// `GET /certificates-by-device/{model}`
pub async fn certificates_by_device(
    State(state): State<AppState>,
    Caller(user): Caller,
    Path(model): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let rows = state.certificates.list_for_device(&user, &model).await?;
    let manufacturer = rows
        .first()
        .map(CertificateRecord::manufacturer_of)
        .unwrap_or_default();
    Ok(Json(json!({
        "device_model": model,
        "manufacturer": manufacturer,
        "total_certificates": rows.len(),
        "certificates": rows,
    })))
}
