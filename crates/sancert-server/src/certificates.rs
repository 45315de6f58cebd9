//! The certificate pipeline and certificate lookups.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sancert_core::event::{parse_event, top_level_keys};
use sancert_core::pdf::render_certificate;
use sancert_core::record::{self, CertificateRecord};
use sancert_core::AuthenticatedUser;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::backend::{CertificateBackend, RecordQuery};
use crate::error::ApiError;

/// Outcome of a successful issuance.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedCertificate {
    pub certificate_id: String,
    pub pdf_url: String,
    pub created_at: DateTime<Utc>,
    pub user_id: String,
    pub device_model: String,
}

#[derive(Clone)]
pub struct CertificateService {
    backend: Arc<dyn CertificateBackend>,
}

impl CertificateService {
    pub fn new(backend: Arc<dyn CertificateBackend>) -> Self {
        Self { backend }
    }

    /// Render, upload and record a certificate for the event in `body`.
    ///
    /// A failed upload writes no record. If the record insert fails after
    /// the upload succeeded, the uploaded PDF is removed again so no
    /// unreferenced file is left in the bucket.
    pub async fn generate(
        &self,
        user: &AuthenticatedUser,
        body: &[u8],
    ) -> Result<IssuedCertificate, ApiError> {
        let event = parse_event(body)?;
        info!(
            user_id = %user.id,
            sections = ?top_level_keys(&event),
            "starting certificate generation"
        );

        let certificate_id = Uuid::new_v4().to_string();
        let pdf = render_certificate(&event, &certificate_id)?;
        info!(%certificate_id, bytes = pdf.len(), "certificate PDF generated");

        let device_model = record::device_model(&event);
        let object_name = record::object_name(&user.id, &device_model, &certificate_id);
        self.backend.upload_pdf(&object_name, pdf).await?;
        let pdf_url = self.backend.public_url(&object_name);

        let created_at = Utc::now();
        let row = CertificateRecord::from_event(&event, &certificate_id, user, &pdf_url, created_at);
        if let Err(e) = self.backend.insert_record(&row).await {
            if let Err(cleanup) = self.backend.remove_object(&object_name).await {
                warn!(%object_name, error = %cleanup, "failed to remove orphaned certificate PDF");
            }
            return Err(e.into());
        }

        info!(%certificate_id, %device_model, "certificate generated");
        Ok(IssuedCertificate {
            certificate_id,
            pdf_url,
            created_at,
            user_id: user.id.clone(),
            device_model,
        })
    }

    /// One page of the caller's certificates.
    pub async fn list_for_user(
        &self,
        user: &AuthenticatedUser,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Value>, ApiError> {
        let query = RecordQuery::for_user(&user.id).page(limit, offset);
        Ok(self.backend.select_records(&query).await?)
    }

    /// The caller's certificates for one device model; 404 when there are none.
    pub async fn list_for_device(
        &self,
        user: &AuthenticatedUser,
        model: &str,
    ) -> Result<Vec<Value>, ApiError> {
        let query = RecordQuery::for_user(&user.id).eq("model", model);
        let rows = self.backend.select_records(&query).await?;
        if rows.is_empty() {
            return Err(ApiError::NotFound("No certificates found".into()));
        }
        Ok(rows)
    }
}
