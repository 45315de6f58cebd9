//! Supabase REST client.
//!
//! Uses reqwest against the `auth/v1`, `storage/v1` and `rest/v1` APIs.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{StatusCode, Url};
use sancert_core::{AuthenticatedUser, CertificateRecord};
use serde_json::Value;
use tracing::{debug, info};

use super::{BackendError, CertificateBackend, RecordQuery};

/// Connection settings for a Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL (e.g., "<https://abc.supabase.co>").
    pub base_url: String,
    /// Service role key.
    pub service_key: String,
    pub bucket: String,
    pub table: String,
    pub timeout: Duration,
}

impl SupabaseConfig {
    pub fn from_service_config(config: &sancert_core::ServiceConfig) -> Self {
        Self {
            base_url: config.backend.url.clone(),
            service_key: config.backend.service_key.clone(),
            bucket: config.backend.bucket.clone(),
            table: config.backend.table.clone(),
            timeout: Duration::from_secs(config.backend.request_timeout_secs),
        }
    }
}

#[derive(Debug)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
    bucket: String,
    table: String,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Result<Self, BackendError> {
        if config.base_url.is_empty() {
            return Err(BackendError::Config("base_url is empty".into()));
        }
        if config.service_key.is_empty() {
            return Err(BackendError::Config("service key is empty".into()));
        }

        let mut headers = HeaderMap::new();
        let key_val = HeaderValue::from_str(&config.service_key)
            .map_err(|_| BackendError::Config("Invalid service key format".into()))?;
        headers.insert("apikey", key_val);

        // reqwest is built with rustls-no-provider; Err means already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
            bucket: config.bucket.clone(),
            table: config.table.clone(),
        })
    }

    pub(crate) fn auth_url(&self) -> String {
        format!("{}/auth/v1/user", self.base_url)
    }

    pub(crate) fn object_url(&self, object_name: &str) -> String {
        format!("{}/storage/v1/object/{}/{object_name}", self.base_url, self.bucket)
    }

    pub(crate) fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    /// Select URL with PostgREST `eq.` filters. Zero limit/offset are omitted.
    pub(crate) fn select_url(&self, query: &RecordQuery) -> Result<Url, BackendError> {
        let mut url = Url::parse(&self.table_url())
            .map_err(|e| BackendError::Config(format!("invalid base_url: {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (column, value) in &query.filters {
                pairs.append_pair(column, &format!("eq.{value}"));
            }
            if let Some(limit) = query.limit.filter(|l| *l > 0) {
                pairs.append_pair("limit", &limit.to_string());
            }
            if let Some(offset) = query.offset.filter(|o| *o > 0) {
                pairs.append_pair("offset", &offset.to_string());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    async fn body_text(resp: reqwest::Response) -> String {
        resp.text().await.unwrap_or_default()
    }
}

const fn created(status: StatusCode) -> bool {
    matches!(status, StatusCode::OK | StatusCode::CREATED)
}

#[async_trait]
impl CertificateBackend for SupabaseClient {
    async fn verify_user(&self, token: &str) -> Result<Option<AuthenticatedUser>, BackendError> {
        let resp = self
            .http
            .get(self.auth_url())
            .bearer_auth(token)
            .send()
            .await?;
        let status = resp.status();
        debug!(status = status.as_u16(), "user verification");
        if status != StatusCode::OK {
            return Ok(None);
        }
        let user = resp
            .json::<AuthenticatedUser>()
            .await
            .map_err(|e| BackendError::Decode(format!("user payload: {e}")))?;
        Ok(Some(user))
    }

    async fn upload_pdf(&self, object_name: &str, pdf: Vec<u8>) -> Result<(), BackendError> {
        info!(object_name, bytes = pdf.len(), "uploading certificate");
        let resp = self
            .http
            .post(self.object_url(object_name))
            .bearer_auth(&self.service_key)
            .header(CONTENT_TYPE, "application/pdf")
            .body(pdf)
            .send()
            .await?;
        let status = resp.status();
        info!(status = status.as_u16(), "upload finished");
        if !created(status) {
            return Err(BackendError::Upload {
                status: status.as_u16(),
                body: Self::body_text(resp).await,
            });
        }
        Ok(())
    }

    async fn remove_object(&self, object_name: &str) -> Result<(), BackendError> {
        let resp = self
            .http
            .delete(self.object_url(object_name))
            .bearer_auth(&self.service_key)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(BackendError::Remove {
                status: status.as_u16(),
                body: Self::body_text(resp).await,
            });
        }
        Ok(())
    }

    fn public_url(&self, object_name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{object_name}",
            self.base_url, self.bucket
        )
    }

    async fn insert_record(&self, record: &CertificateRecord) -> Result<(), BackendError> {
        info!(certificate_id = %record.certificate_id, "saving certificate record");
        let resp = self
            .http
            .post(self.table_url())
            .bearer_auth(&self.service_key)
            .json(record)
            .send()
            .await?;
        let status = resp.status();
        info!(status = status.as_u16(), "save finished");
        if !created(status) {
            return Err(BackendError::Insert {
                status: status.as_u16(),
                body: Self::body_text(resp).await,
            });
        }
        Ok(())
    }

    async fn select_records(&self, query: &RecordQuery) -> Result<Vec<Value>, BackendError> {
        let resp = self
            .http
            .get(self.select_url(query)?)
            .bearer_auth(&self.service_key)
            .send()
            .await?;
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(BackendError::Select {
                status: status.as_u16(),
            });
        }
        resp.json::<Vec<Value>>()
            .await
            .map_err(|e| BackendError::Decode(format!("select payload: {e}")))
    }
}
