//! # photo-vision CLI
//!
//! Command-line interface for the photo vision engine.
//!
//! ## Usage
//! ```bash
//! photo-vision score ~/Photos/*.jpg --output json
//! photo-vision feature-print IMG_0001.jpg --descriptor gray-thumbnail
//! photo-vision serve < requests.jsonl
//! ```

mod cli;

use photo_vision::Result;

fn main() -> Result<()> {
    photo_vision::init_tracing();
    cli::run()
}
