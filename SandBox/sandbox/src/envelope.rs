//! Host-side decoding of the guest's result envelope.

use std::borrow::Cow;

use serde::Deserialize;

use crate::error::SandboxError;

/// The JSON object a guest publishes: `{"output": [<value>]}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Envelope {
    pub output: Vec<i64>,
}

/// Raw output bytes plus the decoded envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeOutput {
    raw: Vec<u8>,
    envelope: Envelope,
}

impl ComputeOutput {
    /// Decode output bytes read from guest memory.
    ///
    /// The envelope must hold exactly one value.
    pub fn decode(raw: Vec<u8>) -> Result<Self, SandboxError> {
        let envelope: Envelope = serde_json::from_slice(&raw)?;
        if envelope.output.len() != 1 {
            return Err(SandboxError::ResponseError(format!(
                "expected exactly one output value, got {}",
                envelope.output.len()
            )));
        }
        Ok(Self { raw, envelope })
    }

    /// The bytes exactly as the guest wrote them.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// The single reported value.
    pub fn value(&self) -> i64 {
        self.envelope.output[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_envelope() {
        let out = ComputeOutput::decode(br#"{"output": [10]}"#.to_vec()).unwrap();
        assert_eq!(out.value(), 10);
        assert_eq!(out.text(), r#"{"output": [10]}"#);
        assert_eq!(out.envelope().output, vec![10]);
    }

    #[test]
    fn test_decode_negative() {
        let out = ComputeOutput::decode(br#"{"output": [-2147483648]}"#.to_vec()).unwrap();
        assert_eq!(out.value(), i64::from(i32::MIN));
    }

    #[test]
    fn test_reject_multiple_values() {
        let err = ComputeOutput::decode(br#"{"output": [1, 2]}"#.to_vec()).unwrap_err();
        assert!(matches!(err, SandboxError::ResponseError(_)));
    }

    #[test]
    fn test_reject_unknown_field() {
        let err = ComputeOutput::decode(br#"{"output": [1], "extra": 0}"#.to_vec()).unwrap_err();
        assert!(matches!(err, SandboxError::ResponseError(_)));
    }

    #[test]
    fn test_reject_non_json() {
        assert!(ComputeOutput::decode(b"\x00\x01garbage".to_vec()).is_err());
    }
}
