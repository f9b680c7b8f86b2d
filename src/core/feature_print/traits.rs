//! Descriptor contract shared by every feature print backend.

use crate::error::AnalysisError;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Width and format of one descriptor element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// One byte per element
    UInt8,
    /// IEEE-754 single precision, little-endian
    Float32,
}

impl ElementType {
    /// Bytes occupied by one element
    pub fn byte_width(&self) -> usize {
        match self {
            ElementType::UInt8 => 1,
            ElementType::Float32 => 4,
        }
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementType::UInt8 => write!(f, "uint8"),
            ElementType::Float32 => write!(f, "float32"),
        }
    }
}

/// Available descriptor backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DescriptorKind {
    /// Gradient hash from image_hasher - compact, robust to re-encoding
    GradientHash,
    /// Normalised 16x16 grayscale thumbnail - float embedding
    GrayThumbnail,
}

impl DescriptorKind {
    /// Pinned algorithm tag. Prints are only comparable when tags match.
    pub fn version(&self) -> &'static str {
        match self {
            DescriptorKind::GradientHash => "gradient-hash-16x16/image_hasher-3",
            DescriptorKind::GrayThumbnail => "gray-thumbnail-16x16/v1",
        }
    }

    /// Get a human-readable description of the descriptor
    pub fn description(&self) -> &'static str {
        match self {
            DescriptorKind::GradientHash => {
                "Gradient Hash - 256 bits comparing neighbouring brightness on a 17x16 grid"
            }
            DescriptorKind::GrayThumbnail => {
                "Gray Thumbnail - 256 mean-centred, unit-length floats from a 16x16 downscale"
            }
        }
    }

    /// Every backend known to this build, available or not
    pub fn all() -> [DescriptorKind; 2] {
        [DescriptorKind::GradientHash, DescriptorKind::GrayThumbnail]
    }
}

impl Default for DescriptorKind {
    fn default() -> Self {
        DescriptorKind::GradientHash
    }
}

impl std::fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DescriptorKind::GradientHash => write!(f, "gradient-hash"),
            DescriptorKind::GrayThumbnail => write!(f, "gray-thumbnail"),
        }
    }
}

/// A fixed-layout descriptor vector for one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePrint {
    element_count: usize,
    element_type: ElementType,
    data: Vec<u8>,
    descriptor: DescriptorKind,
}

impl FeaturePrint {
    /// Wrap raw descriptor bytes.
    ///
    /// Fails when `data` does not hold exactly `element_count` elements.
    pub fn new(
        element_count: usize,
        element_type: ElementType,
        data: Vec<u8>,
        descriptor: DescriptorKind,
    ) -> Result<Self, AnalysisError> {
        if data.len() != element_count * element_type.byte_width() {
            return Err(AnalysisError::ComputationFailed(format!(
                "{} descriptor produced {} bytes for {} {} elements",
                descriptor,
                data.len(),
                element_count,
                element_type
            )));
        }

        Ok(Self {
            element_count,
            element_type,
            data,
            descriptor,
        })
    }

    /// Build a float print, storing each value little-endian
    pub fn from_f32(values: &[f32], descriptor: DescriptorKind) -> Self {
        let data = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        Self {
            element_count: values.len(),
            element_type: ElementType::Float32,
            data,
            descriptor,
        }
    }

    pub fn element_count(&self) -> usize {
        self.element_count
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Get the raw descriptor bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn descriptor(&self) -> DescriptorKind {
        self.descriptor
    }

    /// Decode the elements of a float print
    pub fn to_f32(&self) -> Option<Vec<f32>> {
        if self.element_type != ElementType::Float32 {
            return None;
        }
        Some(
            self.data
                .chunks_exact(4)
                .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect(),
        )
    }
}

/// Trait for descriptor backends
pub trait DescriptorExtractor: Send + Sync {
    /// Compute a print from a decoded image.
    ///
    /// `Ok(None)` means the backend ran but produced no observation.
    fn extract(&self, image: &DynamicImage) -> Result<Option<FeaturePrint>, AnalysisError>;

    /// Get the descriptor kind
    fn kind(&self) -> DescriptorKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_checks_length() {
        let ok = FeaturePrint::new(4, ElementType::UInt8, vec![1, 2, 3, 4], DescriptorKind::GradientHash);
        assert!(ok.is_ok());

        let err = FeaturePrint::new(2, ElementType::Float32, vec![0; 4], DescriptorKind::GrayThumbnail)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::ComputationFailed(_)));
    }

    #[test]
    fn float_prints_roundtrip_through_bytes() {
        let print = FeaturePrint::from_f32(&[0.5, -1.25, 3.0], DescriptorKind::GrayThumbnail);
        assert_eq!(print.element_count(), 3);
        assert_eq!(print.data().len(), 12);
        assert_eq!(print.to_f32().unwrap(), vec![0.5, -1.25, 3.0]);
    }

    #[test]
    fn byte_prints_have_no_float_view() {
        let print =
            FeaturePrint::new(1, ElementType::UInt8, vec![9], DescriptorKind::GradientHash).unwrap();
        assert!(print.to_f32().is_none());
    }

    #[test]
    fn kind_display_matches_serde() {
        for kind in DescriptorKind::all() {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }

    #[test]
    fn versions_are_distinct() {
        assert_ne!(
            DescriptorKind::GradientHash.version(),
            DescriptorKind::GrayThumbnail.version()
        );
    }

    #[test]
    fn element_type_display() {
        assert_eq!(ElementType::UInt8.to_string(), "uint8");
        assert_eq!(ElementType::Float32.to_string(), "float32");
    }
}
