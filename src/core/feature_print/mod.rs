//! # Feature Print Module
//!
//! Computes fixed-layout descriptor vectors for later similarity search.
//!
//! ## Supported Descriptors
//! - **Gradient Hash** - 32 bytes of packed brightness-gradient bits (default)
//! - **Gray Thumbnail** - 256 little-endian `f32` values
//!
//! Prints from different descriptors, or different descriptor versions,
//! are not comparable. [`DescriptorKind::version`] names the pinned
//! algorithm behind each kind.
//!
//! Backends are compiled in with the `descriptors` cargo feature. Without
//! it every request fails with [`AnalysisError::CapabilityUnavailable`].
//!
//! ## Example
//! ```rust,ignore
//! use photo_vision::core::feature_print::{DescriptorKind, FeaturePrintConfig};
//!
//! let generator = FeaturePrintConfig::new()
//!     .descriptor(DescriptorKind::GrayThumbnail)
//!     .build()?;
//!
//! let print = generator.generate(&bytes)?;
//! ```

#[cfg(feature = "descriptors")]
mod algorithms;
mod traits;

#[cfg(feature = "descriptors")]
pub use algorithms::{GradientHashExtractor, GrayThumbnailExtractor};
pub use traits::{DescriptorExtractor, DescriptorKind, ElementType, FeaturePrint};

use crate::core::decode::FastDecoder;
use crate::error::AnalysisError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Configuration builder for feature print generators
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturePrintConfig {
    pub descriptor: DescriptorKind,
}

impl FeaturePrintConfig {
    /// Create a new configuration with the default descriptor
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the descriptor backend
    pub fn descriptor(mut self, descriptor: DescriptorKind) -> Self {
        self.descriptor = descriptor;
        self
    }

    /// Build the generator
    pub fn build(self) -> Result<FeaturePrintGenerator, AnalysisError> {
        Ok(FeaturePrintGenerator::with_extractor(extractor_for(
            self.descriptor,
        )?))
    }
}

#[cfg(feature = "descriptors")]
fn extractor_for(kind: DescriptorKind) -> Result<Box<dyn DescriptorExtractor>, AnalysisError> {
    match kind {
        DescriptorKind::GradientHash => Ok(Box::new(GradientHashExtractor::new())),
        DescriptorKind::GrayThumbnail => Ok(Box::new(GrayThumbnailExtractor::new())),
    }
}

#[cfg(not(feature = "descriptors"))]
fn extractor_for(kind: DescriptorKind) -> Result<Box<dyn DescriptorExtractor>, AnalysisError> {
    Err(AnalysisError::CapabilityUnavailable(format!(
        "{} descriptor is not compiled in (enable the `descriptors` feature)",
        kind
    )))
}

/// Whether a descriptor backend can be built in this binary
pub fn is_supported(kind: DescriptorKind) -> bool {
    extractor_for(kind).is_ok()
}

/// Produces feature prints through a pluggable descriptor backend
pub struct FeaturePrintGenerator {
    extractor: Box<dyn DescriptorExtractor>,
}

impl FeaturePrintGenerator {
    /// Create a generator for the default descriptor
    pub fn new() -> Result<Self, AnalysisError> {
        FeaturePrintConfig::new().build()
    }

    /// Use a custom backend
    pub fn with_extractor(extractor: Box<dyn DescriptorExtractor>) -> Self {
        Self { extractor }
    }

    pub fn descriptor(&self) -> DescriptorKind {
        self.extractor.kind()
    }

    /// Decode encoded bytes and compute their print
    pub fn generate(&self, bytes: &[u8]) -> Result<FeaturePrint, AnalysisError> {
        let image = FastDecoder::decode(bytes)?;
        self.generate_image(&image)
    }

    /// Compute the print of an already-decoded image
    pub fn generate_image(&self, image: &DynamicImage) -> Result<FeaturePrint, AnalysisError> {
        let print = self.extractor.extract(image)?.ok_or(AnalysisError::NoResult)?;

        tracing::debug!(
            descriptor = %print.descriptor(),
            elements = print.element_count(),
            element_type = %print.element_type(),
            "generated feature print"
        );

        Ok(print)
    }
}
