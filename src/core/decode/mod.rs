//! # Decode Module
//!
//! Turns encoded image bytes into rasters and grayscale sample grids.
//!
//! ## Performance Optimizations
//! - Uses `zune-jpeg` for 1.5-2x faster JPEG decoding
//! - Uses memory-mapped reads for large files handed in by the CLI
//!
//! Formats are detected from magic bytes, never from file names, since
//! the engine only ever sees in-memory buffers.

mod fast_decode;
pub mod mmap;
mod pixel_buffer;

pub use fast_decode::{FastDecoder, ImageFormat};
pub use mmap::{read_file_bytes, FileBytes};
pub use pixel_buffer::PixelBuffer;
