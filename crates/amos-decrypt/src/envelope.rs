//! JSON output envelope
//!
//! With `--format json` a script prints one object carrying job metadata
//! and the (possibly encrypted) lines in `data`.

use crate::error::DecryptResult;
use serde::Deserialize;
use serde_json::Value;

/// Parsed JSON output of a script
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Envelope {
    pub timestamp: Value,
    pub command: Value,
    #[serde(rename = "jobId")]
    pub job_id: Value,
    pub procedure: Value,
    pub encoding: Value,
    pub encryption: Value,
    pub steganography: Value,
    data: Value,
}

impl Envelope {
    /// Parse script JSON output
    ///
    /// # Errors
    /// Returns `DecryptError::Envelope` on malformed JSON
    pub fn parse(json: &str) -> DecryptResult<Self> {
        Ok(serde_json::from_str(json.trim())?)
    }

    /// Payload to decrypt: array items joined by newlines, or the value
    /// itself
    #[must_use]
    pub fn payload(&self) -> String {
        match &self.data {
            Value::Array(items) => items.iter().map(plain).collect::<Vec<_>>().join("\n"),
            Value::Null => String::new(),
            other => plain(other),
        }
    }

    /// Metadata fields in display order
    #[must_use]
    pub fn metadata(&self) -> [(&'static str, &Value); 7] {
        [
            ("timestamp", &self.timestamp),
            ("command", &self.command),
            ("jobId", &self.job_id),
            ("procedure", &self.procedure),
            ("encoding", &self.encoding),
            ("encryption", &self.encryption),
            ("steganography", &self.steganography),
        ]
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const OUTPUT: &str = r#"{"timestamp": "2025-06-01 10:00:00", "jobId": "a1b2", "procedure": "system_info", "command": "./system_info.sh --users", "encoding": {"enabled": false, "method": "none"}, "encryption": {"enabled": true, "method": "xor"}, "data": ["XOR-ENCRYPTED:MDMwMjpr", 7]}"#;

    #[test]
    fn array_payload_is_joined() {
        let envelope = Envelope::parse(OUTPUT).unwrap();
        assert_eq!(envelope.payload(), "XOR-ENCRYPTED:MDMwMjpr\n7");
        assert_eq!(envelope.job_id, Value::from("a1b2"));
        assert_eq!(envelope.metadata()[5].1["method"], Value::from("xor"));
        assert!(envelope.steganography.is_null());
    }

    #[test]
    fn string_and_missing_payloads() {
        assert_eq!(Envelope::parse(r#"{"data": "abc"}"#).unwrap().payload(), "abc");
        assert_eq!(Envelope::parse("{}").unwrap().payload(), "");
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Envelope::parse("{\"data\": [").is_err());
    }
}
