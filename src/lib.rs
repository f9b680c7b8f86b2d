//! # Photo Vision
//!
//! Sharpness scoring and perceptual feature prints for photo cleanup tools.
//!
//! ## Core Philosophy
//! - **Bytes in, numbers out** - the engine never touches a photo library
//! - **Fail loudly** - an image that cannot be measured is an error, never a
//!   made-up neutral score
//! - **Stable order** - batch results line up with their inputs
//!
//! ## Architecture
//! - `core` - Blur scoring, feature prints, batch coordination
//! - `channel` - Method-channel front door (JSON requests and responses)
//! - `config` - Serializable engine configuration
//! - `events` - Event-driven progress reporting
//! - `error` - Error types and coarse error codes

pub mod channel;
pub mod config;
pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use config::EngineConfig;
pub use error::{PhotoVisionError, Result};

/// Initialize tracing for the library
///
/// Logs go to stderr so stdout stays free for the channel server.
/// Calling it twice keeps the first subscriber.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
