//! Backend-as-a-service integration.
//!
//! Identity verification, object storage, and the certificate table all
//! live behind one external service. Handlers only see the
//! [`CertificateBackend`] trait; [`SupabaseClient`] is the production
//! implementation over its REST endpoints.

mod supabase;

use async_trait::async_trait;
use sancert_core::{AuthenticatedUser, CertificateRecord};
use serde_json::Value;
use thiserror::Error;

pub use supabase::{SupabaseClient, SupabaseConfig};

/// Errors from calls to the backend service.
///
/// The `Display` text of the status variants is surfaced to API callers
/// verbatim, so it carries the upstream response body.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upload failed: {body}")]
    Upload { status: u16, body: String },

    #[error("Database save failed: {body}")]
    Insert { status: u16, body: String },

    #[error("Database error")]
    Select { status: u16 },

    #[error("Storage removal failed ({status}): {body}")]
    Remove { status: u16, body: String },

    #[error("Unexpected response from backend: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Equality filters plus paging for a table select.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    pub filters: Vec<(String, String)>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl RecordQuery {
    /// Records owned by `user_id`.
    pub fn for_user(user_id: &str) -> Self {
        Self {
            filters: vec![("user_id".into(), user_id.into())],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    #[must_use]
    pub const fn page(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

/// Operations the certificate service needs from the backend.
#[async_trait]
pub trait CertificateBackend: Send + Sync {
    /// Exchange a bearer token for the user it belongs to.
    ///
    /// `Ok(None)` means the provider rejected the token.
    async fn verify_user(&self, token: &str) -> Result<Option<AuthenticatedUser>, BackendError>;

    /// Store a PDF under `object_name` in the certificate bucket.
    async fn upload_pdf(&self, object_name: &str, pdf: Vec<u8>) -> Result<(), BackendError>;

    /// Delete a previously uploaded object.
    async fn remove_object(&self, object_name: &str) -> Result<(), BackendError>;

    /// Public URL of an object in the certificate bucket.
    fn public_url(&self, object_name: &str) -> String;

    async fn insert_record(&self, record: &CertificateRecord) -> Result<(), BackendError>;

    /// Rows of the certificate table matching `query`.
    async fn select_records(&self, query: &RecordQuery) -> Result<Vec<Value>, BackendError>;
}
