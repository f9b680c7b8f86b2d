//! Progress channel between batch workers and a listener.
//!
//! Batch workers run on rayon threads and report each settled image;
//! the listener (usually the CLI's progress bar thread) drains the
//! receiver until every sender is dropped.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Cloneable handle that rayon workers report through.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Report an event. Never blocks.
    ///
    /// Events are dropped once the receiver is gone, so scoring carries
    /// on without a listener.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Listening end of a progress channel.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Wait for the next event; `None` once all senders are dropped
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Drain events until all senders are dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Creates connected sender/receiver pairs.
pub struct EventChannel;

impl EventChannel {
    /// Unbounded, so workers never wait on a slow listener
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// Sender whose receiver is already gone; for batches nobody watches.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}
