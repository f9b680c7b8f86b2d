//! # Error Module
//!
//! Error types for the photo vision engine.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Coarse codes** - every analysis failure maps onto one [`ErrorCode`]
//!   so channel callers can branch without parsing messages
//! - **Keep the backend message** - lower-level failures are wrapped, not lost

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum PhotoVisionError {
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Batch error: {0}")]
    Batch(#[from] BatchError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors produced while scoring or describing a single image
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The bytes could not be decoded into a raster, or the raster could
    /// not be turned into an addressable grayscale buffer.
    #[error("Invalid image data: {reason}")]
    InvalidImage { reason: String },

    /// The descriptor backends are not available in this build.
    #[error("Vision capability not available: {0}")]
    CapabilityUnavailable(String),

    /// The descriptor backend completed without producing an observation.
    #[error("No results from descriptor backend")]
    NoResult,

    #[error("Computation failed: {0}")]
    ComputationFailed(String),
}

impl AnalysisError {
    /// Shorthand for an [`AnalysisError::InvalidImage`] with a reason.
    pub fn invalid_image(reason: impl Into<String>) -> Self {
        AnalysisError::InvalidImage {
            reason: reason.into(),
        }
    }

    /// Coarse error class reported across the method channel
    pub fn code(&self) -> ErrorCode {
        match self {
            AnalysisError::InvalidImage { .. } => ErrorCode::InvalidImage,
            AnalysisError::CapabilityUnavailable(_) => ErrorCode::UnsupportedPlatform,
            AnalysisError::NoResult | AnalysisError::ComputationFailed(_) => ErrorCode::VisionError,
        }
    }
}

/// A batch terminated by one of its inputs.
///
/// Only one failure is reported even when several inputs fail; which one
/// wins among concurrent failures is unspecified.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Image {index} failed: {source}")]
pub struct BatchError {
    /// Position of the failing input in the submitted list
    pub index: usize,
    #[source]
    pub source: AnalysisError,
}

impl BatchError {
    pub fn code(&self) -> ErrorCode {
        self.source.code()
    }
}

/// Errors raised by the method channel before any analysis runs
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Invalid arguments for {method}: {reason}")]
    InvalidArguments { method: String, reason: String },

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Failed to read request: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to write response: {0}")]
    Write(#[from] std::io::Error),
}

/// Coarse error codes exchanged with channel callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request arguments were missing or of the wrong shape
    InvalidArgs,
    /// Image bytes could not be decoded
    InvalidImage,
    /// Descriptor capability missing on this host
    UnsupportedPlatform,
    /// Backend produced nothing or failed internally
    VisionError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::InvalidArgs => write!(f, "INVALID_ARGS"),
            ErrorCode::InvalidImage => write!(f, "INVALID_IMAGE"),
            ErrorCode::UnsupportedPlatform => write!(f, "UNSUPPORTED_PLATFORM"),
            ErrorCode::VisionError => write!(f, "VISION_ERROR"),
        }
    }
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, PhotoVisionError>;
