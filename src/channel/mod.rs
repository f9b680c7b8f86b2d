//! # Channel Module
//!
//! Request/response front door for hosts that talk to the engine through
//! messages instead of Rust calls (a mobile method channel, a sidecar
//! process reading stdin).
//!
//! ## Methods
//! - `isAvailable` - whether feature prints can be computed
//! - `getVisionVersion` - engine and descriptor version string
//! - `analyzeBlur` - `{ imageData }` -> `{ blurScore, quality }`
//! - `analyzeBlurBatch` - `{ imageDataList }` -> list, index aligned
//! - `generateFeaturePrint` - `{ imageData }` ->
//!   `{ featurePrintLength, featurePrintType, featureData }`
//!
//! Anything else answers `notImplemented`.

mod serve;
mod types;

pub use serve::serve;
pub use types::{
    BlurRecord, FeaturePrintRecord, ImageArgs, ImageListArgs, MethodCall, MethodResponse,
    ResponseEnvelope,
};

use crate::config::EngineConfig;
use crate::core::batch::BatchCoordinator;
use crate::core::blur::BlurScorer;
use crate::core::capability;
use crate::core::feature_print::FeaturePrintGenerator;
use crate::error::{AnalysisError, ChannelError, ErrorCode, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const IS_AVAILABLE: &str = "isAvailable";
pub const GET_VISION_VERSION: &str = "getVisionVersion";
pub const ANALYZE_BLUR: &str = "analyzeBlur";
pub const ANALYZE_BLUR_BATCH: &str = "analyzeBlurBatch";
pub const GENERATE_FEATURE_PRINT: &str = "generateFeaturePrint";

/// Dispatches method calls onto the engine components
pub struct VisionChannel {
    scorer: BlurScorer,
    coordinator: BatchCoordinator,
    /// Build failure is kept and reported per call, so blur methods keep
    /// working on builds without descriptors.
    generator: std::result::Result<FeaturePrintGenerator, AnalysisError>,
}

impl VisionChannel {
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;

        let generator = config.feature_print.build();
        if let Err(e) = &generator {
            tracing::warn!(error = %e, "feature prints disabled");
        }

        Ok(Self {
            scorer: config.scorer()?,
            coordinator: config.coordinator()?,
            generator,
        })
    }

    /// Handle one call. Never fails; errors become error responses.
    pub fn handle(&self, call: &MethodCall) -> MethodResponse {
        tracing::debug!(method = %call.method, "method call");

        match call.method.as_str() {
            IS_AVAILABLE => MethodResponse::success(capability::is_available()),
            GET_VISION_VERSION => MethodResponse::success(capability::vision_version()),
            ANALYZE_BLUR => self.analyze_blur(&call.arguments),
            ANALYZE_BLUR_BATCH => self.analyze_blur_batch(&call.arguments),
            GENERATE_FEATURE_PRINT => self.generate_feature_print(&call.arguments),
            other => MethodResponse::NotImplemented {
                method: other.to_string(),
            },
        }
    }

    fn analyze_blur(&self, arguments: &Value) -> MethodResponse {
        let args: ImageArgs = match parse_args(ANALYZE_BLUR, arguments) {
            Ok(args) => args,
            Err(response) => return response,
        };

        match self.scorer.score(&args.image_data) {
            Ok(result) => MethodResponse::success(BlurRecord::from(&result)),
            Err(e) => MethodResponse::from(&e),
        }
    }

    fn analyze_blur_batch(&self, arguments: &Value) -> MethodResponse {
        let args: ImageListArgs = match parse_args(ANALYZE_BLUR_BATCH, arguments) {
            Ok(args) => args,
            Err(response) => return response,
        };

        match self.coordinator.score_all(&args.image_data_list) {
            Ok(results) => {
                MethodResponse::success(results.iter().map(BlurRecord::from).collect::<Vec<_>>())
            }
            Err(e) => MethodResponse::from(&e),
        }
    }

    fn generate_feature_print(&self, arguments: &Value) -> MethodResponse {
        let args: ImageArgs = match parse_args(GENERATE_FEATURE_PRINT, arguments) {
            Ok(args) => args,
            Err(response) => return response,
        };

        let generator = match &self.generator {
            Ok(generator) => generator,
            Err(e) => return MethodResponse::from(e),
        };

        match generator.generate(&args.image_data) {
            Ok(print) => MethodResponse::success(FeaturePrintRecord::from(&print)),
            Err(e) => MethodResponse::from(&e),
        }
    }
}

fn parse_args<T: DeserializeOwned>(
    method: &str,
    arguments: &Value,
) -> std::result::Result<T, MethodResponse> {
    serde_json::from_value(arguments.clone()).map_err(|e| {
        let error = ChannelError::InvalidArguments {
            method: method.to_string(),
            reason: e.to_string(),
        };
        MethodResponse::error(ErrorCode::InvalidArgs, error.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, ImageFormat, Luma};
    use serde_json::json;
    use std::io::Cursor;

    fn channel() -> VisionChannel {
        VisionChannel::new(&EngineConfig::default()).unwrap()
    }

    fn png(size: u32, f: impl Fn(u32, u32) -> u8) -> Vec<u8> {
        let gray = GrayImage::from_fn(size, size, |x, y| Luma([f(x, y)]));
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(gray)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn checkerboard() -> Vec<u8> {
        png(64, |x, y| if (x + y) % 2 == 0 { 0 } else { 255 })
    }

    fn flat() -> Vec<u8> {
        png(64, |_, _| 128)
    }

    #[test]
    fn analyze_blur_returns_wire_record() {
        let call = MethodCall::new(ANALYZE_BLUR, json!({ "imageData": checkerboard() }));
        let response = channel().handle(&call);

        assert_eq!(
            response.result(),
            Some(&json!({ "blurScore": 0.0, "quality": "sharp" }))
        );
    }

    #[test]
    fn analyze_blur_rejects_missing_arguments() {
        let response = channel().handle(&MethodCall::new(ANALYZE_BLUR, Value::Null));
        assert_eq!(response.code(), Some(ErrorCode::InvalidArgs));
    }

    #[test]
    fn analyze_blur_reports_invalid_image() {
        let call = MethodCall::new(ANALYZE_BLUR, json!({ "imageData": [1, 2, 3] }));
        let response = channel().handle(&call);
        assert_eq!(response.code(), Some(ErrorCode::InvalidImage));
    }

    #[test]
    fn batch_results_are_index_aligned() {
        let call = MethodCall::new(
            ANALYZE_BLUR_BATCH,
            json!({ "imageDataList": [flat(), checkerboard(), flat()] }),
        );
        let response = channel().handle(&call);

        let qualities: Vec<&str> = response
            .result()
            .and_then(Value::as_array)
            .unwrap()
            .iter()
            .map(|record| record["quality"].as_str().unwrap())
            .collect();
        assert_eq!(qualities, vec!["blurry", "sharp", "blurry"]);
    }

    #[test]
    fn batch_with_bad_image_is_single_error() {
        let call = MethodCall::new(
            ANALYZE_BLUR_BATCH,
            json!({ "imageDataList": [flat(), [0, 0, 0], checkerboard()] }),
        );
        let response = channel().handle(&call);

        match response {
            MethodResponse::Error { code, message } => {
                assert_eq!(code, ErrorCode::InvalidImage);
                assert!(message.contains("Image 1"));
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[test]
    fn unknown_methods_are_not_implemented() {
        let response = channel().handle(&MethodCall::new("getFreeDiskSpace", Value::Null));
        assert_eq!(
            response,
            MethodResponse::NotImplemented {
                method: "getFreeDiskSpace".to_string()
            }
        );
    }

    #[test]
    fn version_is_a_string() {
        let response = channel().handle(&MethodCall::new(GET_VISION_VERSION, Value::Null));
        assert!(response.result().unwrap().as_str().unwrap().starts_with("photo-vision"));
    }

    #[cfg(feature = "descriptors")]
    #[test]
    fn feature_print_record_is_consistent() {
        let call = MethodCall::new(GENERATE_FEATURE_PRINT, json!({ "imageData": checkerboard() }));
        let response = channel().handle(&call);
        let result = response.result().unwrap();

        let length = result["featurePrintLength"].as_u64().unwrap() as usize;
        let data = result["featureData"].as_array().unwrap();
        assert_eq!(result["featurePrintType"], "uint8");
        assert_eq!(data.len(), length);
        assert!(channel()
            .handle(&MethodCall::new(IS_AVAILABLE, Value::Null))
            .result()
            .unwrap()
            .as_bool()
            .unwrap());
    }

    #[cfg(not(feature = "descriptors"))]
    #[test]
    fn feature_print_reports_unsupported_platform() {
        let call = MethodCall::new(GENERATE_FEATURE_PRINT, json!({ "imageData": checkerboard() }));
        let response = channel().handle(&call);
        assert_eq!(response.code(), Some(ErrorCode::UnsupportedPlatform));
    }
}
