//! Gradient hash descriptor.
//!
//! Resizes to 17x16, converts to grayscale and records whether each pixel
//! is brighter than its right-hand neighbour: 256 bits packed into 32
//! bytes. Backed by image_hasher's `HashAlg::Gradient`; the crate's major
//! version is part of the descriptor tag because its resize filter decides
//! the exact bits.

use super::super::traits::{DescriptorExtractor, DescriptorKind, ElementType, FeaturePrint};
use crate::error::AnalysisError;
use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig};

/// Hash grid side
const HASH_SIZE: u32 = 16;

pub struct GradientHashExtractor {
    hasher: image_hasher::Hasher,
}

impl GradientHashExtractor {
    pub fn new() -> Self {
        let hasher = HasherConfig::new()
            .hash_size(HASH_SIZE, HASH_SIZE)
            .hash_alg(HashAlg::Gradient)
            .to_hasher();

        Self { hasher }
    }
}

impl Default for GradientHashExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorExtractor for GradientHashExtractor {
    fn extract(&self, image: &DynamicImage) -> Result<Option<FeaturePrint>, AnalysisError> {
        let hash = self.hasher.hash_image(image);
        let bytes = hash.as_bytes().to_vec();

        if bytes.is_empty() {
            return Ok(None);
        }

        FeaturePrint::new(bytes.len(), ElementType::UInt8, bytes, self.kind()).map(Some)
    }

    fn kind(&self) -> DescriptorKind {
        DescriptorKind::GradientHash
    }
}
