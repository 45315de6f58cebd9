//! Denormalized certificate record and storage object naming.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::{AuthenticatedUser, Section};
use crate::resolve::{lookup, resolve_text, to_text, top_level};

pub const UNKNOWN_DEVICE: &str = "Unknown_Device";
pub const UNKNOWN: &str = "Unknown";

/// One stored certificate. Field names are the table's column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub certificate_id: String,
    pub user_id: String,
    pub user_email: String,
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    pub property_number: Option<Value>,
    pub media_type: Option<Value>,
    pub media_source: Option<Value>,
    pub pre_sanitization_confidentiality: Option<Value>,
    pub sanitization_method: Option<Value>,
    pub sanitization_technique: Option<Value>,
    pub tool_used: Option<Value>,
    pub verification_method: Option<Value>,
    pub post_sanitization_confidentiality: Option<Value>,
    pub post_sanitization_destination: Option<Value>,
    pub certificate_metadata: Option<Value>,
    pub tool_information: Option<Value>,
    pub sanitization_event: Option<Value>,
    pub media_information: Option<Value>,
    pub sanitization_details: Option<Value>,
    pub host_system_information: Option<Value>,
    pub compliance_information: Option<Value>,
    pub pdf_url: String,
    pub created_at: DateTime<Utc>,
}

/// Device model of an event: `model`, then `media_information.model`.
pub fn device_model(event: &Value) -> String {
    resolve_text(event, "model", Section::MediaInformation, "model", UNKNOWN_DEVICE)
}

/// Model text safe for use inside a storage object name.
pub fn sanitize_model(model: &str) -> String {
    model.replace([' ', '/'], "_")
}

/// Storage object name of a certificate PDF.
pub fn object_name(user_id: &str, model: &str, certificate_id: &str) -> String {
    format!(
        "cert_{user_id}_{}_{certificate_id}.pdf",
        sanitize_model(model)
    )
}

fn fallback(event: &Value, key: &str, section: Section, nested_key: &str) -> Option<Value> {
    lookup(event, key, section, nested_key).cloned()
}

impl CertificateRecord {
    /// Build the record for `event`.
    ///
    /// The seven sections are copied verbatim for audit; the flat fields go
    /// through the resolution policy in [`crate::resolve`].
    pub fn from_event(
        event: &Value,
        certificate_id: &str,
        user: &AuthenticatedUser,
        pdf_url: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        let section = |s: Section| top_level(event, s.key());
        Self {
            certificate_id: certificate_id.to_string(),
            user_id: user.id.clone(),
            user_email: user.attributed_email().to_string(),
            manufacturer: resolve_text(
                event,
                "manufacturer",
                Section::MediaInformation,
                "manufacturer",
                UNKNOWN,
            ),
            model: device_model(event),
            serial_number: resolve_text(
                event,
                "serial_number",
                Section::MediaInformation,
                "serial_number",
                UNKNOWN,
            ),
            property_number: top_level(event, "property_number"),
            media_type: fallback(event, "media_type", Section::MediaInformation, "media_type"),
            media_source: top_level(event, "media_source"),
            pre_sanitization_confidentiality: top_level(event, "pre_sanitization_confidentiality"),
            sanitization_method: fallback(
                event,
                "sanitization_method",
                Section::ToolInformation,
                "method",
            ),
            sanitization_technique: fallback(
                event,
                "sanitization_technique",
                Section::ToolInformation,
                "technique",
            ),
            tool_used: fallback(event, "tool_used", Section::ToolInformation, "name"),
            verification_method: fallback(
                event,
                "verification_method",
                Section::ToolInformation,
                "verification_method",
            ),
            post_sanitization_confidentiality: top_level(
                event,
                "post_sanitization_confidentiality",
            ),
            post_sanitization_destination: top_level(event, "post_sanitization_destination"),
            certificate_metadata: section(Section::CertificateMetadata),
            tool_information: section(Section::ToolInformation),
            sanitization_event: section(Section::SanitizationEvent),
            media_information: section(Section::MediaInformation),
            sanitization_details: section(Section::SanitizationDetails),
            host_system_information: section(Section::HostSystemInformation),
            compliance_information: section(Section::ComplianceInformation),
            pdf_url: pdf_url.to_string(),
            created_at,
        }
    }

    /// Manufacturer of a stored record row, `"Unknown"` when absent.
    pub fn manufacturer_of(row: &Value) -> String {
        row.get("manufacturer")
            .filter(|v| !v.is_null())
            .map_or_else(|| UNKNOWN.to_string(), to_text)
    }
}
