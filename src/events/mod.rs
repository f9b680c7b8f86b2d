//! # Events Module
//!
//! Progress reporting for batch scoring.
//!
//! ## Design
//! The engine emits events through channels, so any caller (CLI, GUI,
//! method channel host) can subscribe and display progress without the
//! engine knowing about it.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Batch(BatchEvent::Scored(p)) = event {
//!             println!("Scored {}/{}", p.completed, p.total);
//!         }
//!     }
//! });
//!
//! coordinator.score_all_with_events(&images, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
