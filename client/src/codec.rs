//! Value encoding for the ledger: JSON text, one string argument per value.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::ClientError;

/// Encode `value` as the string payload of a `Set`.
pub fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String, ClientError> {
    serde_json::to_string(value).map_err(|source| ClientError::Serialization {
        key: key.to_string(),
        source,
    })
}

/// Decode a `Get` payload. An empty payload means the key is absent.
pub fn decode<T: DeserializeOwned>(key: &str, payload: &[u8]) -> Result<Option<T>, ClientError> {
    if payload.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(payload)
        .map(Some)
        .map_err(|source| ClientError::Deserialization {
            key: key.to_string(),
            source,
        })
}
