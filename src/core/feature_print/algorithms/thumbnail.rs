//! Grayscale thumbnail embedding.
//!
//! 1. Downscale to 16x16 grayscale (bilinear, fast_image_resize)
//! 2. Subtract the mean intensity
//! 3. Scale to unit L2 length
//!
//! Euclidean distance between two prints is then a brightness- and
//! contrast-invariant measure of layout similarity. A constant image has
//! no layout and maps to the zero vector.

use super::super::traits::{DescriptorExtractor, DescriptorKind, FeaturePrint};
use super::fast_resize::resize_to_grayscale;
use crate::error::AnalysisError;
use image::DynamicImage;

/// Thumbnail side
const THUMBNAIL_SIZE: u32 = 16;

/// Norms below this are treated as a constant image
const MIN_NORM: f32 = 1e-6;

#[derive(Debug, Default)]
pub struct GrayThumbnailExtractor;

impl GrayThumbnailExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl DescriptorExtractor for GrayThumbnailExtractor {
    fn extract(&self, image: &DynamicImage) -> Result<Option<FeaturePrint>, AnalysisError> {
        let thumbnail = resize_to_grayscale(image, THUMBNAIL_SIZE, THUMBNAIL_SIZE)?;

        let mut values: Vec<f32> = thumbnail.as_raw().iter().map(|&p| p as f32).collect();
        if values.is_empty() {
            return Ok(None);
        }

        let mean = values.iter().sum::<f32>() / values.len() as f32;
        for value in &mut values {
            *value -= mean;
        }

        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm < MIN_NORM {
            values.iter_mut().for_each(|v| *v = 0.0);
        } else {
            values.iter_mut().for_each(|v| *v /= norm);
        }

        Ok(Some(FeaturePrint::from_f32(&values, self.kind())))
    }

    fn kind(&self) -> DescriptorKind {
        DescriptorKind::GrayThumbnail
    }
}
