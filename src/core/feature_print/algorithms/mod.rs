//! Descriptor backend implementations.

mod fast_resize;
mod gradient;
mod thumbnail;

pub use gradient::GradientHashExtractor;
pub use thumbnail::GrayThumbnailExtractor;
