//! Opaque byte payloads owned by the host.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Serialized object record owned by the host.
///
/// The relay never looks inside it. On the JSON wire it is a standard base64
/// string, which decodes back to exactly the bytes the host sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpaquePayload(Vec<u8>);

impl OpaquePayload {
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub const fn len(&self) -> usize {
        self.0.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for OpaquePayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for OpaquePayload {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl Serialize for OpaquePayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for OpaquePayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_base64_string() {
        let payload = OpaquePayload::from(vec![0x7b, 0x7d]);
        assert_eq!(serde_json::to_string(&payload).unwrap(), r#""e30=""#);
    }

    #[test]
    fn non_utf8_bytes_survive_unchanged() {
        let bytes: Vec<u8> = (0..=255).collect();
        let json = serde_json::to_string(&OpaquePayload::from(bytes.clone())).unwrap();
        let back: OpaquePayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_bytes(), bytes.as_slice());
    }

    #[test]
    fn empty_payload_is_empty_string() {
        let payload = OpaquePayload::default();
        assert!(payload.is_empty());
        assert_eq!(serde_json::to_string(&payload).unwrap(), r#""""#);
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let result: Result<OpaquePayload, _> = serde_json::from_str(r#""not base64!""#);
        assert!(result.is_err());
    }
}
