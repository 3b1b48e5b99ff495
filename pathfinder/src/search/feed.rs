use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{trace, warn};

/// Outcome of asking the feed for the next candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
    Candidate(PathBuf),
    /// Nothing arrived before the wait ran out
    Pending,
    Exhausted,
}

/// Candidate paths produced on a dedicated thread.
///
/// Traversal runs ahead of the coordinator by at most `capacity` paths. The
/// coordinator never blocks inside traversal itself, so a walk that stalls on a slow
/// directory still lets the idle timeout fire. The producer stops once the stop flag
/// is set or the feed is dropped.
pub struct CandidateFeed {
    rx: Receiver<PathBuf>,
}

impl CandidateFeed {
    pub fn spawn<I>(candidates: I, capacity: usize, stop: Arc<AtomicBool>) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
        I::IntoIter: Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::bounded(capacity.max(1));
        let candidates = candidates.into_iter();

        let spawned = thread::Builder::new()
            .name("pathfinder-walker".to_string())
            .spawn(move || {
                for path in candidates {
                    if stop.load(Ordering::Acquire) || tx.send(path).is_err() {
                        trace!("Candidate feed closed early");
                        break;
                    }
                }
            });

        // The sender went down with the failed closure, so the feed reads as exhausted
        if let Err(e) = spawned {
            warn!("Cannot start traversal thread: {}", e);
        }

        Self { rx }
    }

    /// Waits up to `wait` for a candidate, or indefinitely when `wait` is `None`
    pub fn next_within(&self, wait: Option<Duration>) -> Next {
        let received = match wait {
            Some(wait) => self.rx.recv_timeout(wait),
            None => self.rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match received {
            Ok(path) => Next::Candidate(path),
            Err(RecvTimeoutError::Timeout) => Next::Pending,
            Err(RecvTimeoutError::Disconnected) => Next::Exhausted,
        }
    }

    pub(crate) fn receiver(&self) -> &Receiver<PathBuf> {
        &self.rx
    }
}
