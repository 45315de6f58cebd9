//! Content of a certificate, independent of page geometry.

use serde_json::Value;

use crate::event::Section;
use crate::resolve::{NOT_AVAILABLE, is_present, section_value, to_text};

pub const TITLE: &str = "Media Sanitization Certificate";

/// Colour a value is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Normal,
    Success,
}

/// One label/value pair of a grid row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
    pub tone: Tone,
}

/// A titled section: rows of one or two fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionBlock {
    pub section: Section,
    pub rows: Vec<Vec<Field>>,
}

impl SectionBlock {
    pub const fn title(&self) -> &'static str {
        self.section.title()
    }

    /// Value of the field labelled `label`, if the section has one.
    #[cfg(test)]
    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .flatten()
            .find(|f| f.label == label)
            .map(|f| f.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateLayout {
    pub title: &'static str,
    pub sections: Vec<SectionBlock>,
}

/// Reads values out of one section object.
struct Reader<'a> {
    event: &'a Value,
    section: Section,
}

impl Reader<'_> {
    fn field(&self, label: &'static str, key: &str) -> Field {
        Field {
            label,
            value: section_value(self.event, self.section, key, NOT_AVAILABLE),
            tone: Tone::Normal,
        }
    }

    fn success(&self, label: &'static str, key: &str) -> Field {
        Field {
            tone: Tone::Success,
            ..self.field(label, key)
        }
    }

    fn list(&self, key: &str) -> Option<&Vec<Value>> {
        self.section
            .of(self.event)
            .and_then(|s| s.get(key))
            .and_then(Value::as_array)
            .filter(|a| !a.is_empty())
    }
}

fn text(label: &'static str, value: String) -> Field {
    Field {
        label,
        value,
        tone: Tone::Normal,
    }
}

impl CertificateLayout {
    /// Lay out `event` as a certificate for `certificate_id`.
    pub fn from_event(event: &Value, certificate_id: &str) -> Self {
        let r = |section| Reader { event, section };

        let meta = r(Section::CertificateMetadata);
        let shown_id = section_value(
            event,
            Section::CertificateMetadata,
            "certificate_id",
            certificate_id,
        );
        let certificate = vec![
            vec![
                text("Certificate ID:", shown_id),
                meta.field("Generated Timestamp:", "generated_timestamp"),
            ],
            vec![
                meta.field("Version:", "version"),
                meta.field("NIST Reference:", "nist_reference"),
            ],
        ];

        let tool = r(Section::ToolInformation);
        let tools = vec![
            vec![tool.field("Name:", "name"), tool.field("Version:", "version")],
            vec![
                tool.field("Method:", "method"),
                tool.field("Technique:", "technique"),
            ],
            vec![tool.field("Verification Method:", "verification_method")],
        ];

        let ev = r(Section::SanitizationEvent);
        let operator = Section::SanitizationEvent
            .of(event)
            .and_then(|s| s.get("operator"))
            .filter(|o| o.is_object());
        let operator_value = |key: &str| {
            operator
                .and_then(|o| o.get(key))
                .filter(|v| is_present(v))
                .map_or_else(|| NOT_AVAILABLE.to_string(), to_text)
        };
        let sanitization_event = vec![
            vec![
                ev.field("Timestamp:", "timestamp"),
                ev.success("Status:", "status"),
            ],
            vec![
                text("System User:", operator_value("system_user")),
                text("Hostname:", operator_value("hostname")),
            ],
        ];

        let media = r(Section::MediaInformation);
        let media_rows = vec![
            vec![
                media.field("Device Path:", "device_path"),
                media.field("Manufacturer:", "manufacturer"),
            ],
            vec![
                media.field("Model:", "model"),
                media.field("Serial Number:", "serial_number"),
            ],
            vec![
                media.field("Firmware Version:", "firmware_version"),
                media.field("Interface Type:", "interface_type"),
            ],
            vec![
                media.field("Media Type:", "media_type"),
                media.field("Device Type:", "device_type"),
            ],
            vec![
                media.field("Capacity (GB):", "capacity_gb"),
                media.field("Capacity (Bytes):", "capacity_bytes"),
            ],
            vec![
                media.field("Pre-Sanitization Class:", "pre_sanitization_classification"),
                media.field("Post-Sanitization Class:", "post_sanitization_classification"),
            ],
        ];

        let details = r(Section::SanitizationDetails);
        let passes = details
            .list("passes_performed")
            .map_or_else(|| NOT_AVAILABLE.to_string(), |p| p.len().to_string());
        let detail_rows = vec![
            vec![
                text("Passes Performed:", passes),
                details.success("Verification Status:", "verification_status"),
            ],
            vec![details.field("Verification Details:", "verification_details")],
        ];

        let host = r(Section::HostSystemInformation);
        let tools_used = host.list("tools_used").map_or_else(
            || NOT_AVAILABLE.to_string(),
            |t| t.iter().map(to_text).collect::<Vec<_>>().join(", "),
        );
        let host_rows = vec![
            vec![
                host.field("Hostname:", "hostname"),
                host.field("Operating System:", "operating_system"),
            ],
            vec![
                host.field("Kernel Version:", "kernel_version"),
                host.field("Architecture:", "architecture"),
            ],
            vec![
                host.field("System Manufacturer:", "system_manufacturer"),
                host.field("System Model:", "system_model"),
            ],
            vec![
                host.field("System Serial:", "system_serial"),
                host.field("Execution Environment:", "execution_environment"),
            ],
            vec![text("Tools Used:", tools_used)],
        ];

        let compliance = r(Section::ComplianceInformation);
        let compliance_rows = vec![
            vec![
                compliance.field("Standard:", "standard"),
                compliance.field("Sanitization Method:", "sanitization_method"),
            ],
            vec![
                compliance.field("Residual Risk Assessment:", "residual_risk_assessment"),
                compliance.field("Recommended Follow-up:", "recommended_follow_up"),
            ],
        ];

        let rows = [
            certificate,
            tools,
            sanitization_event,
            media_rows,
            detail_rows,
            host_rows,
            compliance_rows,
        ];
        let sections = Section::ALL
            .into_iter()
            .zip(rows)
            .map(|(section, rows)| SectionBlock { section, rows })
            .collect();

        Self {
            title: TITLE,
            sections,
        }
    }

    #[cfg(test)]
    pub fn section(&self, section: Section) -> Option<&SectionBlock> {
        self.sections.iter().find(|b| b.section == section)
    }
}
