//! Request and response messages exchanged over the method channel.

use crate::core::blur::{BlurQuality, BlurResult};
use crate::core::feature_print::FeaturePrint;
use crate::error::{AnalysisError, BatchError, ErrorCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request naming a method and its arguments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodCall {
    /// Opaque correlation id echoed back in the response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: None,
            method: method.into(),
            arguments,
        }
    }
}

/// Outcome of one method call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodResponse {
    Success { result: Value },
    Error { code: ErrorCode, message: String },
    NotImplemented { method: String },
}

impl MethodResponse {
    /// Serialize a result record into a success response
    pub fn success<T: Serialize>(value: T) -> Self {
        match serde_json::to_value(value) {
            Ok(result) => MethodResponse::Success { result },
            Err(e) => MethodResponse::error(
                ErrorCode::VisionError,
                format!("failed to encode result: {}", e),
            ),
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        MethodResponse::Error {
            code,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MethodResponse::Success { .. })
    }

    /// Result payload of a success response
    pub fn result(&self) -> Option<&Value> {
        match self {
            MethodResponse::Success { result } => Some(result),
            _ => None,
        }
    }

    /// Code of an error response
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            MethodResponse::Error { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<&AnalysisError> for MethodResponse {
    fn from(error: &AnalysisError) -> Self {
        MethodResponse::error(error.code(), error.to_string())
    }
}

impl From<&BatchError> for MethodResponse {
    fn from(error: &BatchError) -> Self {
        MethodResponse::error(error.code(), error.to_string())
    }
}

/// Response line written by the stdio server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub response: MethodResponse,
}

/// Arguments of `analyzeBlur` and `generateFeaturePrint`
#[derive(Debug, Clone, Deserialize)]
pub struct ImageArgs {
    #[serde(rename = "imageData")]
    pub image_data: Vec<u8>,
}

/// Arguments of `analyzeBlurBatch`
#[derive(Debug, Clone, Deserialize)]
pub struct ImageListArgs {
    #[serde(rename = "imageDataList")]
    pub image_data_list: Vec<Vec<u8>>,
}

/// Wire form of a blur result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlurRecord {
    #[serde(rename = "blurScore")]
    pub blur_score: f64,
    pub quality: BlurQuality,
}

impl From<&BlurResult> for BlurRecord {
    fn from(result: &BlurResult) -> Self {
        Self {
            blur_score: result.score,
            quality: result.quality,
        }
    }
}

/// Wire form of a feature print
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePrintRecord {
    #[serde(rename = "featurePrintLength")]
    pub feature_print_length: usize,
    /// Element width tag ("uint8" or "float32")
    #[serde(rename = "featurePrintType")]
    pub feature_print_type: String,
    #[serde(rename = "featureData")]
    pub feature_data: Vec<u8>,
    /// Pinned descriptor tag; prints only compare within one tag
    #[serde(rename = "featurePrintVersion")]
    pub feature_print_version: String,
}

impl From<&FeaturePrint> for FeaturePrintRecord {
    fn from(print: &FeaturePrint) -> Self {
        Self {
            feature_print_length: print.element_count(),
            feature_print_type: print.element_type().to_string(),
            feature_data: print.data().to_vec(),
            feature_print_version: print.descriptor().version().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn call_arguments_default_to_null() {
        let call: MethodCall = serde_json::from_str(r#"{ "method": "isAvailable" }"#).unwrap();
        assert_eq!(call.method, "isAvailable");
        assert!(call.arguments.is_null());
        assert!(call.id.is_none());
    }

    #[test]
    fn blur_record_uses_wire_names() {
        let record = BlurRecord {
            blur_score: 0.75,
            quality: BlurQuality::Blurry,
        };
        let value = serde_json::to_value(record).unwrap();
        assert_eq!(value, json!({ "blurScore": 0.75, "quality": "blurry" }));
    }

    #[test]
    fn error_response_is_tagged() {
        let response = MethodResponse::error(ErrorCode::InvalidArgs, "missing imageData");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({ "status": "error", "code": "INVALID_ARGS", "message": "missing imageData" })
        );
    }

    #[test]
    fn envelope_flattens_response() {
        let envelope = ResponseEnvelope {
            id: Some(json!(7)),
            response: MethodResponse::success(true),
        };
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value, json!({ "id": 7, "status": "success", "result": true }));
    }

    #[test]
    fn not_implemented_names_method() {
        let response = MethodResponse::NotImplemented {
            method: "getMediaMetadata".to_string(),
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "notImplemented");
        assert_eq!(value["method"], "getMediaMetadata");
    }
}
