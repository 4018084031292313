use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Decode failure carrying the offending value and the expected type,
/// mirrored into the logs before it is returned.
#[derive(Debug, Clone, thiserror::Error)]
#[error("failed to decode value as {target_type}: {detail}")]
pub struct DecodeError {
    pub value: Value,
    pub target_type: &'static str,
    pub detail: String,
}

pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, DecodeError> {
    serde_json::from_value(value.clone()).map_err(|err| {
        let error = DecodeError {
            value,
            target_type: std::any::type_name::<T>(),
            detail: err.to_string(),
        };
        tracing::error!(
            target_type = error.target_type,
            value = %error.value,
            detail = %error.detail,
            "stored value failed to decode"
        );
        error
    })
}

/// Domain aggregates are plain data; encoding them cannot fail.
pub fn encode<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).expect("domain aggregates always encode to JSON")
}
