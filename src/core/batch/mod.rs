//! # Batch Module
//!
//! Scores many images at once on a CPU worker pool.
//!
//! ## Outcome
//! - Every image scored: results in **input order**, `results[i]` belongs
//!   to `images[i]` whatever order the workers finished in
//! - Any image failed: exactly one [`BatchError`], partial results are
//!   discarded
//!
//! ## Parallelism
//! Uses rayon. Without a thread count the global pool is used; with one,
//! the coordinator owns a dedicated pool.

use crate::core::blur::{BlurResult, BlurScorer};
use crate::error::{BatchError, PhotoVisionError};
use crate::events::{
    null_sender, BatchEvent, BatchSummary, Event, EventSender, ScoreProgress,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Worker pool configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Dedicated pool size; `None` shares rayon's global pool
    pub threads: Option<usize>,
}

/// Builder for batch coordinators
pub struct BatchCoordinatorBuilder {
    config: BatchConfig,
    scorer: BlurScorer,
}

impl BatchCoordinatorBuilder {
    pub fn new() -> Self {
        Self {
            config: BatchConfig::default(),
            scorer: BlurScorer::default(),
        }
    }

    /// Set the scorer applied to every image
    pub fn scorer(mut self, scorer: BlurScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Run on a dedicated pool of `threads` workers
    pub fn threads(mut self, threads: usize) -> Self {
        self.config.threads = Some(threads);
        self
    }

    pub fn config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the coordinator, spawning its pool if one was requested
    pub fn build(self) -> Result<BatchCoordinator, PhotoVisionError> {
        let pool = match self.config.threads {
            None => None,
            Some(0) => {
                return Err(PhotoVisionError::Config(
                    "batch thread count must be at least 1".to_string(),
                ))
            }
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("photo-vision-{}", i))
                    .build()
                    .map_err(|e| {
                        PhotoVisionError::Config(format!("failed to start worker pool: {}", e))
                    })?,
            ),
        };

        Ok(BatchCoordinator {
            scorer: self.scorer,
            pool,
        })
    }
}

impl Default for BatchCoordinatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Fans images out to a [`BlurScorer`] and joins the results
pub struct BatchCoordinator {
    scorer: BlurScorer,
    pool: Option<rayon::ThreadPool>,
}

impl Default for BatchCoordinator {
    fn default() -> Self {
        Self {
            scorer: BlurScorer::default(),
            pool: None,
        }
    }
}

impl BatchCoordinator {
    /// Create a new coordinator builder
    pub fn builder() -> BatchCoordinatorBuilder {
        BatchCoordinatorBuilder::new()
    }

    /// Number of workers scoring in parallel
    pub fn worker_count(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Score every image without progress events
    pub fn score_all<B>(&self, images: &[B]) -> Result<Vec<BlurResult>, BatchError>
    where
        B: AsRef<[u8]> + Sync,
    {
        self.score_all_with_events(images, &null_sender())
    }

    /// Score every image, reporting progress through `events`
    pub fn score_all_with_events<B>(
        &self,
        images: &[B],
        events: &EventSender,
    ) -> Result<Vec<BlurResult>, BatchError>
    where
        B: AsRef<[u8]> + Sync,
    {
        let start_time = Instant::now();
        let total = images.len();
        let completed = AtomicUsize::new(0);

        events.send(Event::Batch(BatchEvent::Started {
            total_images: total,
        }));

        let run = || {
            images
                .par_iter()
                .enumerate()
                .map(|(index, bytes)| {
                    let outcome = self.scorer.score(bytes.as_ref());
                    let current_completed = completed.fetch_add(1, Ordering::SeqCst) + 1;

                    match &outcome {
                        Ok(result) => {
                            events.send(Event::Batch(BatchEvent::Scored(ScoreProgress {
                                index,
                                completed: current_completed,
                                total,
                                score: result.score,
                                quality: result.quality,
                            })));
                        }
                        Err(e) => {
                            tracing::warn!(index, error = %e, "image failed to score");
                            events.send(Event::Batch(BatchEvent::Failed {
                                index,
                                message: e.to_string(),
                            }));
                        }
                    }

                    outcome.map_err(|source| BatchError { index, source })
                })
                // Indexed collect keeps input order; the first error
                // short-circuits and discards successes.
                .collect::<Result<Vec<_>, _>>()
        };

        let outcome = match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        };

        let duration_ms = start_time.elapsed().as_millis() as u64;
        tracing::debug!(total, succeeded = outcome.is_ok(), duration_ms, "batch settled");

        events.send(Event::Batch(BatchEvent::Completed {
            summary: BatchSummary {
                total_images: total,
                succeeded: outcome.is_ok(),
                duration_ms,
            },
        }));

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::events::EventChannel;
    use image::{DynamicImage, GrayImage, ImageFormat};
    use std::io::Cursor;

    /// 3x3 PNG whose single Laplacian sample is `response`, so the mean
    /// variance is `response^2`.
    fn png_with_response(response: u8) -> Vec<u8> {
        let mut gray = GrayImage::from_pixel(3, 3, image::Luma([100]));
        gray.put_pixel(1, 0, image::Luma([100 + response]));

        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(gray)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn results_follow_input_order() {
        let images: Vec<Vec<u8>> = (0..32).map(png_with_response).collect();
        let coordinator = BatchCoordinator::builder().threads(4).build().unwrap();

        let results = coordinator.score_all(&images).unwrap();

        assert_eq!(results.len(), images.len());
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.mean_variance, (i * i) as f64, "slot {}", i);
        }
    }

    #[test]
    fn one_bad_input_fails_the_batch() {
        let images = vec![png_with_response(1), b"corrupt".to_vec(), png_with_response(2)];

        let err = BatchCoordinator::default().score_all(&images).unwrap_err();

        assert_eq!(err.index, 1);
        assert!(matches!(err.source, AnalysisError::InvalidImage { .. }));
    }

    #[test]
    fn several_bad_inputs_still_give_one_error() {
        let images = vec![Vec::new(), png_with_response(5), b"nope".to_vec()];

        let err = BatchCoordinator::default().score_all(&images).unwrap_err();

        assert!(err.index == 0 || err.index == 2);
    }

    #[test]
    fn empty_batch_is_empty_success() {
        let images: Vec<Vec<u8>> = Vec::new();
        let results = BatchCoordinator::default().score_all(&images).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn events_bracket_the_batch() {
        let images: Vec<Vec<u8>> = (0..6).map(png_with_response).collect();
        let (sender, receiver) = EventChannel::new();

        BatchCoordinator::default()
            .score_all_with_events(&images, &sender)
            .unwrap();
        drop(sender);

        let events: Vec<Event> = receiver.iter().collect();
        assert!(matches!(
            events.first(),
            Some(Event::Batch(BatchEvent::Started { total_images: 6 }))
        ));
        match events.last() {
            Some(Event::Batch(BatchEvent::Completed { summary })) => assert!(summary.succeeded),
            other => panic!("unexpected last event {:?}", other),
        }

        let scored = events
            .iter()
            .filter(|e| matches!(e, Event::Batch(BatchEvent::Scored(_))))
            .count();
        assert_eq!(scored, 6);
    }

    #[test]
    fn zero_threads_is_rejected() {
        assert!(BatchCoordinator::builder().threads(0).build().is_err());
    }

    #[test]
    fn dedicated_pool_has_requested_size() {
        let coordinator = BatchCoordinator::builder().threads(3).build().unwrap();
        assert_eq!(coordinator.worker_count(), 3);
    }
}
