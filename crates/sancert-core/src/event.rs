//! Sanitization event input and the identity attached to it.
//!
//! An event is an arbitrary JSON object. The sections below are the only
//! structure the service relies on; everything else is carried verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// One of the seven named nested groups of a sanitization event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    CertificateMetadata,
    ToolInformation,
    SanitizationEvent,
    MediaInformation,
    SanitizationDetails,
    HostSystemInformation,
    ComplianceInformation,
}

impl Section {
    /// All sections in document order.
    pub const ALL: [Self; 7] = [
        Self::CertificateMetadata,
        Self::ToolInformation,
        Self::SanitizationEvent,
        Self::MediaInformation,
        Self::SanitizationDetails,
        Self::HostSystemInformation,
        Self::ComplianceInformation,
    ];

    /// JSON key of the section in the event body and in the stored record.
    pub const fn key(self) -> &'static str {
        match self {
            Self::CertificateMetadata => "certificate_metadata",
            Self::ToolInformation => "tool_information",
            Self::SanitizationEvent => "sanitization_event",
            Self::MediaInformation => "media_information",
            Self::SanitizationDetails => "sanitization_details",
            Self::HostSystemInformation => "host_system_information",
            Self::ComplianceInformation => "compliance_information",
        }
    }

    /// Heading used for the section on the certificate.
    pub const fn title(self) -> &'static str {
        match self {
            Self::CertificateMetadata => "Certificate Information",
            Self::ToolInformation => "Tool Information",
            Self::SanitizationEvent => "Sanitization Event",
            Self::MediaInformation => "Media Information",
            Self::SanitizationDetails => "Sanitization Details",
            Self::HostSystemInformation => "Host System Information",
            Self::ComplianceInformation => "Compliance Information",
        }
    }

    /// The section's object inside `event`, if present and an object.
    pub fn of(self, event: &Value) -> Option<&Map<String, Value>> {
        event.get(self.key()).and_then(Value::as_object)
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Parse a request body into an event. The body must be a JSON object.
pub fn parse_event(body: &[u8]) -> Result<Value> {
    let value: Value = serde_json::from_slice(body)?;
    if !value.is_object() {
        return Err(Error::InvalidEvent(format!(
            "expected a JSON object, got {}",
            json_kind(&value)
        )));
    }
    Ok(value)
}

/// Names of the top-level keys of an event, for logging.
pub fn top_level_keys(event: &Value) -> Vec<&str> {
    event
        .as_object()
        .map(|m| m.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Placeholder email attributed when the identity provider returns none.
pub const UNKNOWN_EMAIL: &str = "unknown@example.com";

/// User identity returned by the identity provider for a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl AuthenticatedUser {
    /// Email used for attribution on stored records.
    pub fn attributed_email(&self) -> &str {
        self.email
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(UNKNOWN_EMAIL)
    }
}
