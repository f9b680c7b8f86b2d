//! # Blur Module
//!
//! Scores image sharpness from the variance of a strided Laplacian.
//!
//! ## How It Works
//! 1. Decode and convert to 8-bit grayscale
//! 2. Pick a stride so roughly 100x100 points are sampled
//! 3. Apply the 4-neighbour Laplacian at every sample point
//! 4. Average the squared responses
//! 5. Map the mean onto [0, 1] between two empirical thresholds
//!
//! ## Example
//! ```rust,ignore
//! use photo_vision::core::blur::BlurConfig;
//!
//! let scorer = BlurConfig::new().sharp_threshold(200.0).build()?;
//! let result = scorer.score(&bytes)?;
//! println!("{} ({})", result.score, result.quality);
//! ```

mod laplacian;
mod types;

pub use laplacian::{sampling_step, strided_laplacian, LaplacianStats};
pub use types::{BlurQuality, BlurResult, MODERATE_SCORE_LIMIT, SHARP_SCORE_LIMIT};

use crate::core::decode::PixelBuffer;
use crate::error::{AnalysisError, PhotoVisionError};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Mean variance at or above which an image scores 0.0
pub const SHARP_THRESHOLD: f64 = 150.0;

/// Mean variance at or below which an image scores 1.0
pub const BLURRY_THRESHOLD: f64 = 50.0;

/// Stride divisor: `step = max(1, min(width, height) / STRIDE_DIVISOR)`
pub const STRIDE_DIVISOR: usize = 100;

/// Tunable parameters of the blur scorer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurConfig {
    pub sharp_threshold: f64,
    pub blurry_threshold: f64,
    pub stride_divisor: usize,
    pub sharp_below: f64,
    pub moderate_below: f64,
}

impl BlurConfig {
    /// Create a configuration with the empirical defaults
    pub fn new() -> Self {
        Self {
            sharp_threshold: SHARP_THRESHOLD,
            blurry_threshold: BLURRY_THRESHOLD,
            stride_divisor: STRIDE_DIVISOR,
            sharp_below: SHARP_SCORE_LIMIT,
            moderate_below: MODERATE_SCORE_LIMIT,
        }
    }

    /// Mean variance treated as fully sharp
    pub fn sharp_threshold(mut self, value: f64) -> Self {
        self.sharp_threshold = value;
        self
    }

    /// Mean variance treated as fully blurred
    pub fn blurry_threshold(mut self, value: f64) -> Self {
        self.blurry_threshold = value;
        self
    }

    /// Larger divisors sample more densely.
    pub fn stride_divisor(mut self, value: usize) -> Self {
        self.stride_divisor = value;
        self
    }

    /// Score cut-offs for the sharp and moderate labels
    pub fn quality_limits(mut self, sharp_below: f64, moderate_below: f64) -> Self {
        self.sharp_below = sharp_below;
        self.moderate_below = moderate_below;
        self
    }

    /// Check that the thresholds describe a usable mapping
    pub fn validate(&self) -> Result<(), PhotoVisionError> {
        if !self.sharp_threshold.is_finite() || !self.blurry_threshold.is_finite() {
            return Err(PhotoVisionError::Config(
                "blur thresholds must be finite".to_string(),
            ));
        }
        if self.sharp_threshold <= self.blurry_threshold {
            return Err(PhotoVisionError::Config(format!(
                "sharp threshold ({}) must exceed blurry threshold ({})",
                self.sharp_threshold, self.blurry_threshold
            )));
        }
        if self.stride_divisor == 0 {
            return Err(PhotoVisionError::Config(
                "stride divisor must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.sharp_below)
            || !(0.0..=1.0).contains(&self.moderate_below)
            || self.sharp_below > self.moderate_below
        {
            return Err(PhotoVisionError::Config(format!(
                "quality limits must satisfy 0 <= sharp ({}) <= moderate ({}) <= 1",
                self.sharp_below, self.moderate_below
            )));
        }
        Ok(())
    }

    /// Build the scorer
    pub fn build(self) -> Result<BlurScorer, PhotoVisionError> {
        self.validate()?;
        Ok(BlurScorer { config: self })
    }
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a mean variance onto a blur score.
///
/// `>= sharp` gives 0.0, `<= blurry` gives 1.0, linear in between,
/// clamped to [0, 1].
pub fn score_from_variance(mean_variance: f64, sharp: f64, blurry: f64) -> f64 {
    let score = if mean_variance >= sharp {
        0.0
    } else if mean_variance <= blurry {
        1.0
    } else {
        1.0 - (mean_variance - blurry) / (sharp - blurry)
    };

    score.clamp(0.0, 1.0)
}

/// Stateless blur scorer; cheap to copy and safe to share across threads
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurScorer {
    config: BlurConfig,
}

impl Default for BlurScorer {
    fn default() -> Self {
        Self {
            config: BlurConfig::default(),
        }
    }
}

impl BlurScorer {
    /// Create a scorer with the default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &BlurConfig {
        &self.config
    }

    /// Score encoded image bytes
    pub fn score(&self, bytes: &[u8]) -> Result<BlurResult, AnalysisError> {
        let pixels = PixelBuffer::from_bytes(bytes)?;
        Ok(self.score_pixels(&pixels))
    }

    /// Score an already-decoded image
    pub fn score_image(&self, image: &DynamicImage) -> Result<BlurResult, AnalysisError> {
        let pixels = PixelBuffer::from_image(image)?;
        Ok(self.score_pixels(&pixels))
    }

    /// Score a grayscale buffer
    pub fn score_pixels(&self, pixels: &PixelBuffer) -> BlurResult {
        let stats = strided_laplacian(pixels, self.config.stride_divisor);
        let score = score_from_variance(
            stats.mean_variance,
            self.config.sharp_threshold,
            self.config.blurry_threshold,
        );
        let quality =
            BlurQuality::classify(score, self.config.sharp_below, self.config.moderate_below);

        tracing::debug!(
            width = pixels.width(),
            height = pixels.height(),
            step = stats.step,
            samples = stats.samples,
            mean_variance = stats.mean_variance,
            score,
            %quality,
            "scored image"
        );

        BlurResult {
            score,
            quality,
            mean_variance: stats.mean_variance,
            step: stats.step,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::imageops::FilterType;
    use image::{GrayImage, ImageBuffer, ImageFormat, Luma};
    use std::io::Cursor;

    fn gray_image(size: u32, f: impl Fn(u32, u32) -> u8) -> DynamicImage {
        let buffer: GrayImage = ImageBuffer::from_fn(size, size, |x, y| Luma([f(x, y)]));
        DynamicImage::ImageLuma8(buffer)
    }

    fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    /// 3x3 buffer with the given center and neighbours; corners are ignored.
    fn cross(center: u8, top: u8, bottom: u8, left: u8, right: u8) -> PixelBuffer {
        #[rustfmt::skip]
        let samples = vec![
            0,    top,    0,
            left, center, right,
            0,    bottom, 0,
        ];
        PixelBuffer::new(3, 3, samples).unwrap()
    }

    #[test]
    fn variance_mapping_boundaries() {
        assert_eq!(score_from_variance(150.0, 150.0, 50.0), 0.0);
        assert_eq!(score_from_variance(10_000.0, 150.0, 50.0), 0.0);
        assert_eq!(score_from_variance(50.0, 150.0, 50.0), 1.0);
        assert_eq!(score_from_variance(0.0, 150.0, 50.0), 1.0);
        assert!((score_from_variance(100.0, 150.0, 50.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn variance_mapping_is_monotonic() {
        let mut previous = f64::INFINITY;
        for tenth in 0..2000 {
            let score = score_from_variance(tenth as f64 / 10.0, 150.0, 50.0);
            assert!((0.0..=1.0).contains(&score));
            assert!(score <= previous);
            previous = score;
        }
    }

    #[test]
    fn flat_image_is_fully_blurred() {
        let scorer = BlurScorer::new();
        let result = scorer.score_image(&gray_image(200, |_, _| 128)).unwrap();

        assert_eq!(result.mean_variance, 0.0);
        assert_eq!(result.score, 1.0);
        assert_eq!(result.quality, BlurQuality::Blurry);
    }

    #[test]
    fn checkerboard_is_fully_sharp() {
        let scorer = BlurScorer::new();
        let image = gray_image(64, |x, y| if (x + y) % 2 == 0 { 0 } else { 255 });
        let result = scorer.score_image(&image).unwrap();

        assert!(result.mean_variance >= SHARP_THRESHOLD);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.quality, BlurQuality::Sharp);
    }

    #[test]
    fn interpolated_scores_get_each_label() {
        let scorer = BlurScorer::new();

        // L = 10 => variance 100 => score 0.5
        let moderate = scorer.score_pixels(&cross(100, 110, 100, 100, 100));
        assert!((moderate.score - 0.5).abs() < 1e-9);
        assert_eq!(moderate.quality, BlurQuality::Moderate);

        // L = 12 => variance 144 => score 0.06
        let sharp = scorer.score_pixels(&cross(100, 103, 103, 103, 103));
        assert!((sharp.score - 0.06).abs() < 1e-9);
        assert_eq!(sharp.quality, BlurQuality::Sharp);

        // L = 8 => variance 64 => score 0.86
        let blurry = scorer.score_pixels(&cross(100, 102, 102, 102, 102));
        assert!((blurry.score - 0.86).abs() < 1e-9);
        assert_eq!(blurry.quality, BlurQuality::Blurry);
    }

    #[test]
    fn degenerate_images_score_as_blurred() {
        let scorer = BlurScorer::new();
        for size in [1, 2] {
            let image = gray_image(size, |x, y| ((x + y) * 200) as u8);
            let result = scorer.score_image(&image).unwrap();
            assert_eq!(result.score, 1.0, "size {}", size);
        }

        let three = scorer.score_image(&gray_image(3, |_, _| 40)).unwrap();
        assert_eq!(three.score, 1.0);
    }

    #[test]
    fn smoothing_never_lowers_the_score() {
        let scorer = BlurScorer::new();
        let sharp = gray_image(128, |x, y| if (x / 4 + y / 4) % 2 == 0 { 20 } else { 235 });
        let smoothed = sharp.blur(3.0);

        let sharp_result = scorer.score_image(&sharp).unwrap();
        let smoothed_result = scorer.score_image(&smoothed).unwrap();

        assert!(sharp_result.mean_variance > smoothed_result.mean_variance);
        assert!(sharp_result.score <= smoothed_result.score);
    }

    #[test]
    fn downscaled_detail_stays_in_range() {
        let scorer = BlurScorer::new();
        let image = gray_image(300, |x, y| ((x * 7 + y * 13) % 256) as u8)
            .resize(150, 150, FilterType::Triangle);
        let result = scorer.score_image(&image).unwrap();
        assert!((0.0..=1.0).contains(&result.score));
    }

    #[test]
    fn scoring_bytes_is_idempotent() {
        let scorer = BlurScorer::new();
        let bytes = png_bytes(&gray_image(120, |x, y| ((x * 3) ^ (y * 5)) as u8));

        let first = scorer.score(&bytes).unwrap();
        let second = scorer.score(&bytes).unwrap();

        assert!((first.score - second.score).abs() < 1e-9);
        assert_eq!(first.quality, second.quality);
    }

    #[test]
    fn bytes_and_decoded_image_agree() {
        let scorer = BlurScorer::new();
        let image = gray_image(90, |x, y| ((x * 7) ^ (y * 11)) as u8);

        let from_bytes = scorer.score(&png_bytes(&image)).unwrap();
        let from_image = scorer.score_image(&image).unwrap();

        assert_eq!(from_bytes, from_image);
    }

    #[test]
    fn undecodable_bytes_are_invalid() {
        let scorer = BlurScorer::new();
        for bytes in [&b""[..], &b"not an image"[..], &[0x89, 0x50, 0x4E, 0x47][..]] {
            let err = scorer.score(bytes).unwrap_err();
            assert!(matches!(err, AnalysisError::InvalidImage { .. }));
        }
    }

    #[test]
    fn thresholds_are_overridable() {
        let scorer = BlurConfig::new()
            .sharp_threshold(1000.0)
            .blurry_threshold(200.0)
            .build()
            .unwrap();
        // variance 144 is now below the blurry threshold
        let result = scorer.score_pixels(&cross(100, 103, 103, 103, 103));
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn stride_divisor_is_overridable() {
        let scorer = BlurConfig::new().stride_divisor(10).build().unwrap();
        let result = scorer.score_image(&gray_image(200, |_, _| 0)).unwrap();
        assert_eq!(result.step, 20);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        assert!(BlurConfig::new().sharp_threshold(50.0).build().is_err());
        assert!(BlurConfig::new().blurry_threshold(f64::NAN).build().is_err());
        assert!(BlurConfig::new().stride_divisor(0).build().is_err());
        assert!(BlurConfig::new().quality_limits(0.7, 0.6).build().is_err());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: BlurConfig = serde_json::from_str(r#"{ "sharp_threshold": 180.0 }"#).unwrap();
        assert_eq!(config.sharp_threshold, 180.0);
        assert_eq!(config.blurry_threshold, BLURRY_THRESHOLD);
        assert_eq!(config.stride_divisor, STRIDE_DIVISOR);
    }
}
