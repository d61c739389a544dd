//! Binary payloads carried inside the model (images, source documents)
//!
//! A payload is either raw bytes (a JSON number array) or a string holding
//! bare base64 or a `data:<mime>;base64,` URI.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ModelError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BinarySource {
    Bytes(Vec<u8>),
    Text(String),
}

impl BinarySource {
    pub fn is_empty(&self) -> bool {
        match self {
            BinarySource::Bytes(b) => b.is_empty(),
            BinarySource::Text(s) => s.trim().is_empty(),
        }
    }

    /// Resolve the payload to raw bytes
    pub fn decode(&self) -> Result<Vec<u8>, ModelError> {
        match self {
            BinarySource::Bytes(b) => Ok(b.clone()),
            BinarySource::Text(s) => {
                let payload = match s.find(";base64,") {
                    Some(idx) if s.starts_with("data:") => &s[idx + ";base64,".len()..],
                    _ => s.as_str(),
                };
                let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
                STANDARD
                    .decode(compact.as_bytes())
                    .map_err(|e| ModelError::InvalidBase64(e.to_string()))
            }
        }
    }

    /// Mime type announced by a data URI, if any
    pub fn data_uri_mime(&self) -> Option<&str> {
        match self {
            BinarySource::Text(s) => s
                .strip_prefix("data:")
                .and_then(|rest| rest.split(';').next())
                .filter(|m| !m.is_empty()),
            BinarySource::Bytes(_) => None,
        }
    }

    /// Content-derived identifier (SHA-256 hex of the decoded bytes)
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        match self.decode() {
            Ok(bytes) => hasher.update(&bytes),
            Err(_) => {
                if let BinarySource::Text(s) = self {
                    hasher.update(s.as_bytes());
                }
            }
        }
        hex::encode(hasher.finalize())
    }
}

impl From<Vec<u8>> for BinarySource {
    fn from(bytes: Vec<u8>) -> Self {
        BinarySource::Bytes(bytes)
    }
}

impl From<&[u8]> for BinarySource {
    fn from(bytes: &[u8]) -> Self {
        BinarySource::Bytes(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_data_uri() {
        let src = BinarySource::Text("data:image/png;base64,AQID".to_string());
        assert_eq!(src.decode().unwrap(), vec![1, 2, 3]);
        assert_eq!(src.data_uri_mime(), Some("image/png"));
    }

    #[test]
    fn test_decode_bare_base64() {
        let src = BinarySource::Text("AQID".to_string());
        assert_eq!(src.decode().unwrap(), vec![1, 2, 3]);
        assert_eq!(src.data_uri_mime(), None);
    }

    #[test]
    fn test_fingerprint_is_content_derived() {
        let a = BinarySource::Bytes(vec![1, 2, 3]);
        let b = BinarySource::Text("AQID".to_string());
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
        assert_ne!(a.fingerprint(), BinarySource::Bytes(vec![3, 2, 1]).fingerprint());
    }

    #[test]
    fn test_empty_sources() {
        assert!(BinarySource::Bytes(vec![]).is_empty());
        assert!(BinarySource::Text("  ".to_string()).is_empty());
        assert!(!BinarySource::Bytes(vec![0]).is_empty());
    }

    #[test]
    fn test_json_shapes() {
        let bytes: BinarySource = serde_json::from_str("[1,2,3]").unwrap();
        assert_eq!(bytes, BinarySource::Bytes(vec![1, 2, 3]));
        let text: BinarySource = serde_json::from_str("\"AQID\"").unwrap();
        assert_eq!(text, BinarySource::Text("AQID".to_string()));
    }
}
