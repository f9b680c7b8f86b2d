//! Fast image decoding with format-specific optimizations.
//!
//! Uses zune-jpeg for JPEG buffers (1.5-2x faster than image crate),
//! falls back to image crate for other formats.

use crate::error::AnalysisError;
use image::{DynamicImage, ImageBuffer, Luma, Rgb, Rgba};
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// Image container detected from leading magic bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
    Bmp,
    Tiff,
    Heic,
    Unknown,
}

impl ImageFormat {
    /// Detect the container from the first bytes of a buffer
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }
        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Self::Png;
        }
        if bytes.starts_with(b"GIF8") {
            return Self::Gif;
        }
        if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
            return Self::WebP;
        }
        if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
            let brand = &bytes[8..12];
            if brand == b"heic" || brand == b"heix" || brand == b"mif1" || brand == b"hevc" {
                return Self::Heic;
            }
        }
        if bytes.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || bytes.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            return Self::Tiff;
        }
        if bytes.starts_with(b"BM") {
            return Self::Bmp;
        }
        Self::Unknown
    }

    /// Matching image crate codec, if it has one
    fn codec(self) -> Option<image::ImageFormat> {
        match self {
            Self::Jpeg => Some(image::ImageFormat::Jpeg),
            Self::Png => Some(image::ImageFormat::Png),
            Self::Gif => Some(image::ImageFormat::Gif),
            Self::WebP => Some(image::ImageFormat::WebP),
            Self::Bmp => Some(image::ImageFormat::Bmp),
            Self::Tiff => Some(image::ImageFormat::Tiff),
            Self::Heic | Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jpeg => write!(f, "JPEG"),
            Self::Png => write!(f, "PNG"),
            Self::Gif => write!(f, "GIF"),
            Self::WebP => write!(f, "WebP"),
            Self::Bmp => write!(f, "BMP"),
            Self::Tiff => write!(f, "TIFF"),
            Self::Heic => write!(f, "HEIC"),
            Self::Unknown => write!(f, "unrecognised format"),
        }
    }
}

/// Fast image decoder that uses optimized decoders per format
pub struct FastDecoder;

impl FastDecoder {
    /// Decode an encoded buffer using the fastest available decoder.
    ///
    /// - JPEG: Uses zune-jpeg, retrying with the image crate on failure
    /// - Other formats: image crate
    ///
    /// Any failure, including an image with a zero dimension, is
    /// reported as [`AnalysisError::InvalidImage`].
    pub fn decode(bytes: &[u8]) -> Result<DynamicImage, AnalysisError> {
        if bytes.is_empty() {
            return Err(AnalysisError::invalid_image("empty buffer"));
        }

        let format = ImageFormat::sniff(bytes);
        let image = match format {
            ImageFormat::Jpeg => {
                Self::decode_jpeg(bytes).or_else(|_| Self::decode_with(bytes, format))
            }
            ImageFormat::Heic => Err(AnalysisError::invalid_image(
                "HEIC images are not supported; convert to JPEG first",
            )),
            _ => Self::decode_with(bytes, format),
        }?;

        if image.width() == 0 || image.height() == 0 {
            return Err(AnalysisError::invalid_image(format!(
                "image has zero dimension ({}x{})",
                image.width(),
                image.height()
            )));
        }

        Ok(image)
    }

    /// Fast JPEG decoding using zune-jpeg
    fn decode_jpeg(bytes: &[u8]) -> Result<DynamicImage, AnalysisError> {
        // Configure decoder to output RGB
        let options = DecoderOptions::new_fast().jpeg_set_out_colorspace(ColorSpace::RGB);
        let mut decoder = JpegDecoder::new_with_options(bytes, options);

        let pixels = decoder
            .decode()
            .map_err(|e| AnalysisError::invalid_image(format!("zune-jpeg decode failed: {:?}", e)))?;

        let info = decoder
            .info()
            .ok_or_else(|| AnalysisError::invalid_image("failed to get JPEG info"))?;

        let width = info.width as u32;
        let height = info.height as u32;

        // Get actual output colorspace after decoding
        let out_colorspace = decoder.get_output_colorspace().unwrap_or(ColorSpace::RGB);

        let image = match out_colorspace {
            ColorSpace::RGB => {
                let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels)
                        .ok_or_else(|| AnalysisError::invalid_image("failed to create RGB buffer"))?;
                DynamicImage::ImageRgb8(buffer)
            }
            ColorSpace::RGBA => {
                let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels)
                        .ok_or_else(|| AnalysisError::invalid_image("failed to create RGBA buffer"))?;
                DynamicImage::ImageRgba8(buffer)
            }
            ColorSpace::Luma => {
                let buffer: ImageBuffer<Luma<u8>, Vec<u8>> =
                    ImageBuffer::from_raw(width, height, pixels)
                        .ok_or_else(|| AnalysisError::invalid_image("failed to create Luma buffer"))?;
                DynamicImage::ImageLuma8(buffer)
            }
            _ => {
                // Unsupported colorspace, fall back to image crate
                return Self::decode_with(bytes, ImageFormat::Jpeg);
            }
        };

        Ok(image)
    }

    /// Decode through the image crate, pinned to the sniffed container
    fn decode_with(bytes: &[u8], format: ImageFormat) -> Result<DynamicImage, AnalysisError> {
        let decoded = match format.codec() {
            Some(codec) => image::load_from_memory_with_format(bytes, codec),
            None => image::load_from_memory(bytes),
        };
        decoded.map_err(|e| AnalysisError::invalid_image(format!("{}: {}", format, e)))
    }
}
