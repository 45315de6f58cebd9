//! Field resolution policy.
//!
//! Every derived field is looked up in a fixed order:
//! 1. a flat key at the top level of the event
//! 2. the corresponding key inside one named section
//! 3. a placeholder
//!
//! Stored records depend on this order, so it must not change. A value is
//! only "present" when it is truthy: `null`, `false`, `0`, `""`, `[]` and
//! `{}` fall through to the next source.

use serde_json::Value;

use crate::event::Section;

/// Placeholder rendered on the certificate for absent values.
pub const NOT_AVAILABLE: &str = "N/A";

/// Whether `value` counts as present.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Render a value as certificate/record text. Strings are taken verbatim,
/// booleans read `True`/`False`, and everything else uses its compact JSON
/// form.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}

/// Look up `key` at the top level, then `nested_key` inside `section`.
pub fn lookup<'a>(
    event: &'a Value,
    key: &str,
    section: Section,
    nested_key: &str,
) -> Option<&'a Value> {
    event
        .get(key)
        .filter(|v| is_present(v))
        .or_else(|| {
            section
                .of(event)
                .and_then(|s| s.get(nested_key))
                .filter(|v| is_present(v))
        })
}

/// [`lookup`] rendered as text, or `placeholder` when neither source is present.
pub fn resolve_text(
    event: &Value,
    key: &str,
    section: Section,
    nested_key: &str,
    placeholder: &str,
) -> String {
    lookup(event, key, section, nested_key).map_or_else(|| placeholder.to_string(), to_text)
}

/// A value read from one section only, for certificate cells.
pub fn section_value(event: &Value, section: Section, key: &str, placeholder: &str) -> String {
    section
        .of(event)
        .and_then(|s| s.get(key))
        .filter(|v| is_present(v))
        .map_or_else(|| placeholder.to_string(), to_text)
}

/// A top-level value taken verbatim, `None` when missing or `null`.
pub fn top_level(event: &Value, key: &str) -> Option<Value> {
    event.get(key).filter(|v| !v.is_null()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn top_level_wins_over_section() {
        let event = json!({
            "model": "Top",
            "media_information": {"model": "Nested"}
        });
        assert_eq!(
            resolve_text(&event, "model", Section::MediaInformation, "model", "Unknown_Device"),
            "Top"
        );
    }

    #[test]
    fn section_used_when_top_level_missing() {
        let event = json!({"media_information": {"model": "SSD-500"}});
        assert_eq!(
            resolve_text(&event, "model", Section::MediaInformation, "model", "Unknown_Device"),
            "SSD-500"
        );
    }

    #[test]
    fn placeholder_when_neither_present() {
        let event = json!({"tool_information": {}});
        assert_eq!(
            resolve_text(&event, "model", Section::MediaInformation, "model", "Unknown_Device"),
            "Unknown_Device"
        );
    }

    #[test]
    fn falsy_top_level_falls_through() {
        let event = json!({
            "serial_number": "",
            "media_information": {"serial_number": "S123"}
        });
        assert_eq!(
            resolve_text(&event, "serial_number", Section::MediaInformation, "serial_number", "Unknown"),
            "S123"
        );

        let event = json!({"manufacturer": null, "media_information": {"manufacturer": 0}});
        assert_eq!(
            resolve_text(&event, "manufacturer", Section::MediaInformation, "manufacturer", "Unknown"),
            "Unknown"
        );
    }

    #[test]
    fn non_object_section_is_ignored() {
        let event = json!({"media_information": ["SSD-500"]});
        assert!(lookup(&event, "model", Section::MediaInformation, "model").is_none());
    }

    #[test]
    fn nested_key_may_differ_from_flat_key() {
        let event = json!({"tool_information": {"method": "Purge"}});
        assert_eq!(
            lookup(&event, "sanitization_method", Section::ToolInformation, "method"),
            Some(&json!("Purge"))
        );
    }

    #[test]
    fn numbers_render_as_json_text() {
        let event = json!({"media_information": {"capacity_gb": 512, "capacity_bytes": 512_110_190_592_u64}});
        assert_eq!(
            section_value(&event, Section::MediaInformation, "capacity_gb", NOT_AVAILABLE),
            "512"
        );
        assert_eq!(
            section_value(&event, Section::MediaInformation, "capacity_bytes", NOT_AVAILABLE),
            "512110190592"
        );
    }

    #[test]
    fn booleans_render_capitalised() {
        let event = json!({"sanitization_details": {"verification_status": true}});
        assert_eq!(
            section_value(&event, Section::SanitizationDetails, "verification_status", NOT_AVAILABLE),
            "True"
        );
        assert_eq!(to_text(&json!(false)), "False");
        assert_eq!(to_text(&json!("true")), "true");
    }

    #[test]
    fn section_value_placeholder() {
        let event = json!({});
        assert_eq!(
            section_value(&event, Section::ComplianceInformation, "standard", NOT_AVAILABLE),
            NOT_AVAILABLE
        );
    }

    #[test]
    fn top_level_keeps_falsy_non_null_values() {
        let event = json!({"property_number": "", "media_source": null});
        assert_eq!(top_level(&event, "property_number"), Some(json!("")));
        assert_eq!(top_level(&event, "media_source"), None);
        assert_eq!(top_level(&event, "missing"), None);
    }

    #[test]
    fn truthiness() {
        assert!(!is_present(&json!(false)));
        assert!(!is_present(&json!(0.0)));
        assert!(!is_present(&json!({})));
        assert!(is_present(&json!(true)));
        assert!(is_present(&json!(-1)));
        assert!(is_present(&json!([0])));
    }
}
