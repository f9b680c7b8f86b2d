//! Owned grayscale sample grid consumed by the blur scorer.

use crate::error::AnalysisError;
use image::{DynamicImage, GrayImage};

use super::FastDecoder;

/// An immutable width x height grid of 8-bit intensity samples, row-major.
///
/// Construction guarantees `width > 0`, `height > 0` and
/// `samples.len() == width * height`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    samples: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw row-major samples, checking the grid invariant
    pub fn new(width: usize, height: usize, samples: Vec<u8>) -> Result<Self, AnalysisError> {
        if width == 0 || height == 0 {
            return Err(AnalysisError::invalid_image(format!(
                "pixel buffer has zero dimension ({}x{})",
                width, height
            )));
        }

        let expected = width.checked_mul(height).ok_or_else(|| {
            AnalysisError::invalid_image(format!("pixel buffer too large ({}x{})", width, height))
        })?;

        if samples.len() != expected {
            return Err(AnalysisError::invalid_image(format!(
                "pixel buffer holds {} samples, expected {}",
                samples.len(),
                expected
            )));
        }

        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Decode encoded bytes and convert them to grayscale
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AnalysisError> {
        let image = FastDecoder::decode(bytes)?;
        Self::from_image(&image)
    }

    /// Convert a decoded image to single-channel 8-bit luma, dropping alpha
    pub fn from_image(image: &DynamicImage) -> Result<Self, AnalysisError> {
        Self::from_gray(image.to_luma8())
    }

    pub fn from_gray(gray: GrayImage) -> Result<Self, AnalysisError> {
        let (width, height) = gray.dimensions();
        Self::new(width as usize, height as usize, gray.into_raw())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Sample at column `x`, row `y`. Caller keeps coordinates in bounds.
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> u8 {
        self.samples[y * self.width + x]
    }
}
