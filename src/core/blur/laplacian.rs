//! Strided discrete Laplacian over a grayscale buffer.
//!
//! Kernel, applied with neighbours `step` pixels away:
//! ```text
//! [ 0  1  0 ]
//! [ 1 -4  1 ]
//! [ 0  1  0 ]
//! ```

use crate::core::decode::PixelBuffer;

/// Aggregate of the squared Laplacian responses over the sampling grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaplacianStats {
    /// Mean of L^2 over all sample points, 0.0 when no point was sampled
    pub mean_variance: f64,
    /// Number of sample points visited
    pub samples: usize,
    /// Pixel distance between sample points and to each neighbour
    pub step: usize,
}

/// Sampling stride: `max(1, min(width, height) / divisor)`.
///
/// Keeps the grid near `divisor x divisor` points whatever the resolution.
/// A zero divisor is treated as one.
pub fn sampling_step(width: usize, height: usize, divisor: usize) -> usize {
    (width.min(height) / divisor.max(1)).max(1)
}

/// Walk `x` over `[step, width - step)` and `y` over `[step, height - step)`
/// in increments of `step`, accumulating the squared Laplacian.
pub fn strided_laplacian(buffer: &PixelBuffer, divisor: usize) -> LaplacianStats {
    let width = buffer.width();
    let height = buffer.height();
    let step = sampling_step(width, height, divisor);

    let mut sum = 0.0_f64;
    let mut samples = 0_usize;

    for y in (step..height.saturating_sub(step)).step_by(step) {
        for x in (step..width.saturating_sub(step)).step_by(step) {
            let center = buffer.at(x, y) as f64;
            let top = buffer.at(x, y - step) as f64;
            let bottom = buffer.at(x, y + step) as f64;
            let left = buffer.at(x - step, y) as f64;
            let right = buffer.at(x + step, y) as f64;

            let laplacian = -4.0 * center + top + bottom + left + right;
            sum += laplacian * laplacian;
            samples += 1;
        }
    }

    let mean_variance = if samples > 0 {
        sum / samples as f64
    } else {
        0.0
    };

    LaplacianStats {
        mean_variance,
        samples,
        step,
    }
}
