//! `sancert` Core Library
//!
//! Shared functionality for the certificate service:
//! - Sanitization event sections and the field resolution policy
//! - Certificate records and storage object naming
//! - Fixed-layout PDF certificate rendering
//! - Configuration resolution and tracing setup
//! - Common error types

pub mod config;
pub mod error;
pub mod event;
pub mod pdf;
pub mod record;
pub mod resolve;
pub mod tracing_init;

pub use config::ServiceConfig;
pub use error::{Error, Result};
pub use event::{AuthenticatedUser, Section};
pub use record::CertificateRecord;
