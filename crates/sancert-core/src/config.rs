//! Configuration resolution for the certificate service.
//!
//! Resolution order, lowest to highest priority:
//! 1. Built-in defaults
//! 2. Optional JSON settings file
//! 3. Environment variables (a `.env` file is loaded by the binary first)
//! 4. CLI arguments (applied by the binary)

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

use crate::error::{Error, Result};

/// Complete service configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Connection settings for the backend-as-a-service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`.
    pub url: String,
    /// Service key sent as `apikey` (and as bearer for storage/database calls).
    pub service_key: String,
    /// Storage bucket for certificate PDFs.
    pub bucket: String,
    /// Table receiving certificate records.
    pub table: String,
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            service_key: String::new(),
            bucket: "certificates".to_string(),
            table: "certificates".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub max_body_bytes: usize,
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            max_body_bytes: 2 * 1024 * 1024, // 2 MiB
            log_json: false,
        }
    }
}

impl ServiceConfig {
    /// Fail unless the backend can actually be reached.
    pub fn validate(&self) -> Result<()> {
        if self.backend.url.trim().is_empty() {
            return Err(Error::Config("SUPABASE_URL must be set".into()));
        }
        if self.backend.service_key.trim().is_empty() {
            return Err(Error::Config("SUPABASE_KEY must be set".into()));
        }
        if self.backend.bucket.is_empty() || self.backend.table.is_empty() {
            return Err(Error::Config("bucket and table names must not be empty".into()));
        }
        Ok(())
    }
}

/// Load configuration: defaults, then `file` if given, then the process environment.
pub fn load_config(file: Option<&Path>) -> Result<ServiceConfig> {
    let mut config = match file {
        Some(path) => load_config_file(path)?,
        None => ServiceConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn load_config_file(path: &Path) -> Result<ServiceConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

/// Apply environment overrides read through `var`.
pub fn apply_env_overrides(config: &mut ServiceConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("SUPABASE_URL") {
        config.backend.url = val;
    }
    if let Some(val) = var("SUPABASE_KEY") {
        config.backend.service_key = val;
    }
    if let Some(val) = var("SANCERT_BUCKET") {
        config.backend.bucket = val;
    }
    if let Some(val) = var("SANCERT_TABLE") {
        config.backend.table = val;
    }
    if let Some(n) = var("SANCERT_REQUEST_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
        config.backend.request_timeout_secs = n;
    }
    if let Some(addr) = var("SANCERT_LISTEN_ADDR").and_then(|v| v.parse().ok()) {
        config.server.listen_addr = addr;
    }
    if let Some(n) = var("SANCERT_MAX_BODY_BYTES").and_then(|v| v.parse().ok()) {
        config.server.max_body_bytes = n;
    }
    if let Some(val) = var("SANCERT_LOG_JSON") {
        config.server.log_json = matches!(val.as_str(), "1" | "true" | "yes");
    }
}
