//! Wire types for the service endpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::envelope::ResponseMetadata;

/// `GET /health` reply. Not wrapped in an envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub engines: BTreeMap<String, Vec<String>>,
}

impl HealthResponse {
    /// The service answers `ready` once its modules are loaded.
    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TokenizeRequest {
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub engine: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_dict: Vec<String>,
    /// `None` leaves the engine default in place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_whitespace: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_broken_num: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RomanizeRequest {
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub engine: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub tokenize: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub fallback_engine: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransliterateRequest {
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub engine: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyllableTokenizeRequest {
    pub text: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub engine: String,
    pub keep_whitespace: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyzeRequest {
    pub text: String,
    pub features: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tokenize_engine: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub romanize_engine: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub transliterate_engine: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub syllable_engine: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub(crate) struct TokenizeData {
    #[serde(default)]
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub(crate) struct RomanizeData {
    #[serde(default)]
    pub romanized: String,
    #[serde(default)]
    pub tokens: Vec<String>,
    #[serde(default)]
    pub romanized_tokens: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub(crate) struct TransliterateData {
    #[serde(default)]
    pub phonetic: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub(crate) struct SyllableTokenizeData {
    #[serde(default)]
    pub syllables: Vec<String>,
}

/// Payload of `POST /analyze`; each field is present only when its feature
/// was requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeData {
    #[serde(default)]
    pub tokens: Vec<String>,
    #[serde(default)]
    pub romanized: String,
    #[serde(default)]
    pub romanized_tokens: Vec<String>,
    #[serde(default)]
    pub phonetic: String,
    #[serde(default)]
    pub syllables: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenizeResponse {
    pub tokens: Vec<String>,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RomanizeResponse {
    pub romanized: String,
    pub tokens: Vec<String>,
    pub romanized_tokens: Vec<String>,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransliterateResponse {
    pub phonetic: String,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyllableTokenizeResponse {
    pub syllables: Vec<String>,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzeResponse {
    pub data: AnalyzeData,
    pub metadata: ResponseMetadata,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_empty_fields_are_omitted() {
        let req = TokenizeRequest {
            text: "สวัสดี".to_string(),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&req).unwrap(), json!({"text": "สวัสดี"}));
    }

    #[test]
    fn test_explicit_false_flags_are_sent() {
        let req = TokenizeRequest {
            text: "ผม กิน".to_string(),
            keep_whitespace: Some(false),
            join_broken_num: Some(false),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"text": "ผม กิน", "keep_whitespace": false, "join_broken_num": false})
        );
    }

    #[test]
    fn test_analyze_request_shape() {
        let req = AnalyzeRequest {
            text: "ภาษาไทย".to_string(),
            features: vec!["tokenize".to_string(), "romanize".to_string()],
            romanize_engine: "royin".to_string(),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "text": "ภาษาไทย",
                "features": ["tokenize", "romanize"],
                "romanize_engine": "royin"
            })
        );
    }

    #[test]
    fn test_health_without_engines() {
        let health: HealthResponse =
            serde_json::from_value(json!({"status": "starting"})).unwrap();
        assert!(!health.is_ready());
        assert!(health.engines.is_empty());
    }
}
