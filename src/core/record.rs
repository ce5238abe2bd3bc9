use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One structured security log event.
///
/// Every field is optional. Values of the wrong JSON type decode as absent, so
/// deserializing any JSON object into a `LogRecord` succeeds. The accessor
/// methods apply the documented defaults: empty string for text fields, zero
/// for integer fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub destination_ip: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, deserialize_with = "lenient_integer", skip_serializing_if = "Option::is_none")]
    pub destination_port: Option<i64>,
    #[serde(default, deserialize_with = "lenient_integer", skip_serializing_if = "Option::is_none")]
    pub bytes_received: Option<i64>,
}

/// The three event types the rules reason about. Anything else is opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Login,
    FileDownload,
    LateralMovement,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Login => "login",
            EventKind::FileDownload => "file_download",
            EventKind::LateralMovement => "lateral_movement",
        }
    }
}

impl LogRecord {
    pub fn event_type(&self) -> &str {
        self.event_type.as_deref().unwrap_or("")
    }

    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or("")
    }

    pub fn location(&self) -> &str {
        self.location.as_deref().unwrap_or("")
    }

    pub fn process_name(&self) -> &str {
        self.process_name.as_deref().unwrap_or("")
    }

    pub fn filename(&self) -> &str {
        self.filename.as_deref().unwrap_or("")
    }

    pub fn source_ip(&self) -> &str {
        self.source_ip.as_deref().unwrap_or("")
    }

    pub fn destination_ip(&self) -> &str {
        self.destination_ip.as_deref().unwrap_or("")
    }

    pub fn protocol(&self) -> &str {
        self.protocol.as_deref().unwrap_or("")
    }

    pub fn destination_port(&self) -> i64 {
        self.destination_port.unwrap_or(0)
    }

    pub fn bytes_received(&self) -> i64 {
        self.bytes_received.unwrap_or(0)
    }

    /// Whether the event type is exactly `kind` (case-sensitive).
    pub fn is(&self, kind: EventKind) -> bool {
        self.event_type() == kind.as_str()
    }

    /// Case-insensitive `status == "failed"`.
    pub fn is_failed(&self) -> bool {
        self.status().eq_ignore_ascii_case("failed")
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Integers, or floats with no fractional part. Everything else is absent.
fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Number(n) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Some(v) = n.as_i64() {
        return Ok(Some(v));
    }
    if let Some(v) = n.as_u64() {
        return Ok(Some(i64::try_from(v).unwrap_or(i64::MAX)));
    }
    Ok(n
        .as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> LogRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn full_record_decodes() {
        let record = decode(json!({
            "event_type": "login",
            "status": "failed",
            "location": "Russia",
            "process_name": "sshd",
            "filename": "a.txt",
            "source_ip": "1.2.3.4",
            "destination_ip": "10.0.0.5",
            "protocol": "SSH",
            "destination_port": 22,
            "bytes_received": 512,
        }));
        assert!(record.is(EventKind::Login));
        assert!(record.is_failed());
        assert_eq!(record.location(), "Russia");
        assert_eq!(record.protocol(), "SSH");
        assert_eq!(record.destination_port(), 22);
        assert_eq!(record.bytes_received(), 512);
    }

    #[test]
    fn empty_object_uses_defaults() {
        let record = decode(json!({}));
        assert_eq!(record, LogRecord::default());
        assert_eq!(record.event_type(), "");
        assert_eq!(record.status(), "");
        assert_eq!(record.destination_port(), 0);
        assert_eq!(record.bytes_received(), 0);
        assert!(!record.is_failed());
    }

    #[test]
    fn wrong_types_decode_as_absent() {
        let record = decode(json!({
            "event_type": 7,
            "status": null,
            "location": ["Russia"],
            "destination_port": "445",
            "bytes_received": {"value": 2_000_000},
        }));
        assert_eq!(record.event_type, None);
        assert_eq!(record.status, None);
        assert_eq!(record.location, None);
        assert_eq!(record.destination_port, None);
        assert_eq!(record.bytes_received, None);
    }

    #[test]
    fn integral_floats_are_accepted() {
        let record = decode(json!({"destination_port": 445.0, "bytes_received": 1.5}));
        assert_eq!(record.destination_port, Some(445));
        assert_eq!(record.bytes_received, None);
    }

    #[test]
    fn huge_unsigned_saturates() {
        let record = decode(json!({"bytes_received": u64::MAX}));
        assert_eq!(record.bytes_received, Some(i64::MAX));
    }

    #[test]
    fn unknown_fields_ignored() {
        let record = decode(json!({"timestamp": "2024-01-01T00:00:00Z", "event_type": "login"}));
        assert_eq!(record.event_type(), "login");
    }

    #[test]
    fn failed_status_is_case_insensitive() {
        let record = LogRecord {
            status: Some("FAILED".into()),
            ..Default::default()
        };
        assert!(record.is_failed());
    }

    #[test]
    fn event_kind_is_case_sensitive() {
        let record = LogRecord {
            event_type: Some("Login".into()),
            ..Default::default()
        };
        assert!(!record.is(EventKind::Login));
    }
}
