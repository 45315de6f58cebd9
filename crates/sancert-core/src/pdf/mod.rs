//! Certificate PDF rendering.
//!
//! [`layout`] decides what goes on the certificate, [`writer`] decides
//! where, and [`metrics`] knows how wide text is in the standard fonts.

pub mod layout;
pub mod metrics;
pub mod writer;

use serde_json::Value;
use tracing::debug;

pub use layout::{CertificateLayout, Field, SectionBlock, Tone};

use crate::error::Result;

/// Render `event` as a certificate PDF.
pub fn render_certificate(event: &Value, certificate_id: &str) -> Result<Vec<u8>> {
    let layout = CertificateLayout::from_event(event, certificate_id);
    let bytes = writer::write_pdf(&layout, &format!("{} {certificate_id}", layout.title))?;
    debug!(certificate_id, bytes = bytes.len(), "certificate PDF rendered");
    Ok(bytes)
}
