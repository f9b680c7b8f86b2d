//! Event type definitions for progress reporting.

use crate::core::blur::BlurQuality;
use serde::{Deserialize, Serialize};

/// All events emitted by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Batch scoring events
    Batch(BatchEvent),
}

/// Events while a batch of images is scored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BatchEvent {
    /// Scoring has started
    Started { total_images: usize },
    /// An image finished scoring
    Scored(ScoreProgress),
    /// An image failed; the batch outcome will be this (or another) error
    Failed { index: usize, message: String },
    /// Every dispatched image has settled
    Completed { summary: BatchSummary },
}

/// Progress information after one image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreProgress {
    /// Position of the image in the submitted list
    pub index: usize,
    /// Number of images settled so far (in completion order)
    pub completed: usize,
    /// Total number of images in the batch
    pub total: usize,
    pub score: f64,
    pub quality: BlurQuality,
}

/// Summary of a settled batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_images: usize,
    /// Whether every image scored
    pub succeeded: bool,
    /// Duration in milliseconds
    pub duration_ms: u64,
}
