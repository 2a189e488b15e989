//! Progress reporting over a channel.

use std::sync::mpsc;
use tuner_spi::SearchProgress;

/// Sending half of a progress channel.
///
/// Sends are fire-and-forget: a dropped receiver never stalls or fails the
/// search that reports through it.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::Sender<SearchProgress>,
}

impl ProgressSender {
    pub fn send(&self, event: SearchProgress) {
        let _ = self.tx.send(event);
    }
}

/// Create a progress channel. The receiver can be drained from another
/// thread while a search runs, or after it finishes.
pub fn channel() -> (ProgressSender, mpsc::Receiver<SearchProgress>) {
    let (tx, rx) = mpsc::channel();
    (ProgressSender { tx }, rx)
}
