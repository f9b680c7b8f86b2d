//! # Core Module
//!
//! The platform-agnostic analysis engine.
//!
//! ## Modules
//! - `decode` - Turns encoded bytes into rasters and grayscale buffers
//! - `blur` - Laplacian-variance sharpness scoring
//! - `feature_print` - Versioned descriptor vectors
//! - `batch` - Parallel, index-aligned batch scoring
//! - `capability` - One-time probe of what this build can compute

pub mod batch;
pub mod blur;
pub mod capability;
pub mod decode;
pub mod feature_print;

// Re-export commonly used types
pub use batch::{BatchConfig, BatchCoordinator};
pub use blur::{BlurConfig, BlurQuality, BlurResult, BlurScorer};
pub use capability::Capabilities;
pub use decode::PixelBuffer;
pub use feature_print::{DescriptorKind, FeaturePrint, FeaturePrintConfig, FeaturePrintGenerator};
