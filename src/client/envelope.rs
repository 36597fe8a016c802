//! The `{data, metadata, error}` wrapper returned by every non-health endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Error reported by the service in the envelope's `error` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct ServiceError {
    /// Machine-readable code (`EMPTY_TEXT`, `INVALID_ENGINE`, ...).
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Structured details (supported engines, traceback, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Envelope metadata. Only the processing time is interpreted; everything
/// else is kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    /// A value that is not a number is treated as absent.
    #[serde(
        default,
        deserialize_with = "number_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub processing_time_ms: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResponseMetadata {
    /// Processing time reported by the service, `None` when unmeasured.
    pub fn processing_time(&self) -> Option<Duration> {
        self.processing_time_ms
            .filter(|ms| ms.is_finite() && *ms >= 0.0)
            .map(|ms| Duration::from_secs_f64(ms / 1000.0))
    }
}

/// Raw envelope as it comes off the wire.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, deserialize_with = "metadata_or_default")]
    pub metadata: ResponseMetadata,
    #[serde(default)]
    pub error: Option<ServiceError>,
}

fn number_or_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_f64())
}

fn metadata_or_default<'de, D>(deserializer: D) -> Result<ResponseMetadata, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<ResponseMetadata>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_error_envelope_keeps_code_and_message() {
        let env: Envelope = serde_json::from_value(json!({
            "data": null,
            "metadata": {},
            "error": {"code": "E1", "message": "bad input"}
        }))
        .unwrap();

        let err = env.error.unwrap();
        assert_eq!(err.code, "E1");
        assert_eq!(err.message, "bad input");
        assert_eq!(err.to_string(), "E1: bad input");
        assert!(env.data.is_none());
    }

    #[test]
    fn test_processing_time_extracted() {
        let env: Envelope = serde_json::from_value(json!({
            "data": {"tokens": []},
            "metadata": {"engine": "newmm", "processing_time_ms": 12.5},
            "error": null
        }))
        .unwrap();

        assert_eq!(
            env.metadata.processing_time(),
            Some(Duration::from_micros(12_500))
        );
        assert_eq!(env.metadata.extra["engine"], json!("newmm"));
    }

    #[test]
    fn test_missing_or_null_metadata_is_unmeasured() {
        let env: Envelope = serde_json::from_value(json!({"data": {}})).unwrap();
        assert_eq!(env.metadata.processing_time(), None);

        let env: Envelope =
            serde_json::from_value(json!({"data": {}, "metadata": null})).unwrap();
        assert_eq!(env.metadata.processing_time(), None);
    }

    #[test]
    fn test_non_numeric_processing_time_is_unmeasured() {
        let env: Envelope = serde_json::from_value(json!({
            "data": {"tokens": ["ผม"]},
            "metadata": {"processing_time_ms": "12.5", "engine": "newmm"},
            "error": null
        }))
        .unwrap();

        assert_eq!(env.metadata.processing_time_ms, None);
        assert_eq!(env.metadata.processing_time(), None);
        assert_eq!(env.metadata.extra["engine"], "newmm");
    }
}
