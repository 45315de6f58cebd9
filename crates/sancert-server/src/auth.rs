//! Bearer-token authentication against the identity provider.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use sancert_core::AuthenticatedUser;
use tracing::warn;

use crate::backend::CertificateBackend;
use crate::error::ApiError;
use crate::routes::AppState;

pub const MISSING_HEADER: &str = "Missing or invalid authorization header";
pub const INVALID_TOKEN: &str = "Invalid authentication token";

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the caller of a request, or reject with 401.
///
/// Transport failures talking to the provider are not authentication
/// failures and surface as upstream errors.
pub async fn authenticate(
    backend: &dyn CertificateBackend,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, ApiError> {
    let token = bearer_token(headers).ok_or_else(|| ApiError::Unauthorized(MISSING_HEADER.into()))?;
    match backend.verify_user(token).await? {
        Some(user) => Ok(user),
        None => {
            warn!("identity provider rejected bearer token");
            Err(ApiError::Unauthorized(INVALID_TOKEN.into()))
        }
    }
}

/// The authenticated user of the current request.
#[derive(Debug, Clone)]
pub struct Caller(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate(state.backend.as_ref(), &parts.headers)
            .await
            .map(Self)
    }
}
