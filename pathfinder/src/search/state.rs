use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use super::identity::FileIdentity;
use crate::metrics::ScanMetrics;
use crate::results::{MatchResult, MatchSink, SearchStats, StopReason};

/// Per-call coordinator state.
///
/// Created when a search starts and dropped when it returns. Only the coordinating
/// thread touches it; the one piece workers can see is the stop flag, handed out as
/// an `Arc<AtomicBool>` through [`SearchState::stop_flag`].
#[derive(Debug)]
pub struct SearchState {
    start: Instant,
    stop: Arc<AtomicBool>,
    stopped_reason: StopReason,
    seen: HashSet<FileIdentity>,
    emitted: usize,
    limit: usize,
    idle_timeout: Option<Duration>,
    idle_deadline: Option<Instant>,
    last_emit: Option<Instant>,
    metrics: ScanMetrics,
}

impl SearchState {
    pub fn new(limit: usize, idle_timeout: Option<Duration>, metrics: ScanMetrics) -> Self {
        let start = Instant::now();
        Self {
            start,
            stop: Arc::new(AtomicBool::new(false)),
            stopped_reason: StopReason::Complete,
            seen: HashSet::new(),
            emitted: 0,
            limit: limit.max(1),
            idle_timeout,
            idle_deadline: idle_timeout.and_then(|t| start.checked_add(t)),
            last_emit: None,
            metrics,
        }
    }

    /// Shared handle to the stop flag, for workers that should bail out early
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    pub fn emitted(&self) -> usize {
        self.emitted
    }

    fn stop(&mut self, reason: StopReason) {
        if !self.stop.swap(true, Ordering::AcqRel) {
            debug!("Stopping search: {}", reason);
            self.stopped_reason = reason;
        }
    }

    /// Fires the idle timeout if its deadline has passed. Returns whether the search is stopped.
    pub fn check_idle(&mut self) -> bool {
        if self.is_stopped() {
            return true;
        }
        if self
            .idle_deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            self.stop(StopReason::IdleTimeout);
        }
        self.is_stopped()
    }

    /// Time left before the idle timeout fires, if one is configured
    pub fn time_until_idle(&self) -> Option<Duration> {
        self.idle_deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Routes one accepted match through deduplication and out to the sink.
    ///
    /// Matches arriving after the search stopped are discarded, and so are repeats of
    /// an identity already emitted.
    pub fn emit(&mut self, result: MatchResult, sink: &mut dyn MatchSink) {
        if self.is_stopped() {
            trace!("Discarding late match: {}", result.path.display());
            return;
        }

        let identity = FileIdentity::of(&result.path);
        if !self.seen.insert(identity) {
            trace!("Discarding duplicate match: {}", result.path.display());
            self.metrics.record_duplicate();
            return;
        }

        sink.accept(result);
        self.emitted += 1;

        let now = Instant::now();
        self.last_emit = Some(now);
        if let Some(timeout) = self.idle_timeout {
            // a deadline past the clock's range is no deadline
            self.idle_deadline = now.checked_add(timeout);
        }

        if self.emitted >= self.limit {
            self.stop(StopReason::Limit);
        }
    }

    /// Closes out the call and computes its statistics
    pub fn finish(self) -> SearchStats {
        let end = Instant::now();
        let idle_time = if self.stopped_reason == StopReason::IdleTimeout {
            end.saturating_duration_since(self.last_emit.unwrap_or(self.start))
        } else {
            Duration::ZERO
        };

        SearchStats {
            emitted: self.emitted,
            wall_time: end.duration_since(self.start),
            idle_time,
            stopped_reason: self.stopped_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::BufferSink;
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn test_limit_stops_after_emission() {
        let dir = tempdir().unwrap();
        let mut sink = BufferSink::default();
        let mut state = SearchState::new(2, None, ScanMetrics::new());

        for name in ["a.txt", "b.txt", "c.txt"] {
            let path = dir.path().join(name);
            std::fs::write(&path, name).unwrap();
            state.emit(MatchResult::new(path), &mut sink);
        }

        assert!(state.is_stopped());
        assert_eq!(sink.results.len(), 2);
        let stats = state.finish();
        assert_eq!(stats.emitted, 2);
        assert_eq!(stats.stopped_reason, StopReason::Limit);
        assert_eq!(stats.idle_time, Duration::ZERO);
    }

    #[test]
    fn test_duplicates_are_not_counted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("same.txt");
        std::fs::write(&path, "x").unwrap();

        let metrics = ScanMetrics::new();
        let mut sink = BufferSink::default();
        let mut state = SearchState::new(10, None, metrics.clone());
        state.emit(MatchResult::new(&path), &mut sink);
        state.emit(MatchResult::new(&path), &mut sink);

        assert_eq!(state.emitted(), 1);
        assert_eq!(sink.results.len(), 1);
        assert_eq!(metrics.get_stats().duplicates_discarded, 1);
    }

    #[test]
    fn test_idle_deadline_fires_and_resets() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hit.txt");
        std::fs::write(&path, "x").unwrap();

        let mut sink = BufferSink::default();
        let mut state =
            SearchState::new(10, Some(Duration::from_millis(200)), ScanMetrics::new());
        assert!(!state.check_idle());

        thread::sleep(Duration::from_millis(120));
        state.emit(MatchResult::new(&path), &mut sink);
        thread::sleep(Duration::from_millis(100));
        // 220ms since start but only 100ms since the last emission
        assert!(!state.check_idle());

        thread::sleep(Duration::from_millis(150));
        assert!(state.check_idle());

        let stats = state.finish();
        assert_eq!(stats.stopped_reason, StopReason::IdleTimeout);
        assert!(stats.idle_time >= Duration::from_millis(200));
        assert!(stats.wall_time >= stats.idle_time);
    }

    #[test]
    fn test_unrepresentable_deadline_means_no_deadline() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("far.txt");
        std::fs::write(&path, "x").unwrap();

        let mut sink = BufferSink::default();
        let mut state = SearchState::new(10, Some(Duration::MAX), ScanMetrics::new());
        assert_eq!(state.time_until_idle(), None);
        assert!(!state.check_idle());

        state.emit(MatchResult::new(&path), &mut sink);
        assert_eq!(state.time_until_idle(), None);
        assert!(!state.check_idle());
        assert_eq!(state.finish().stopped_reason, StopReason::Complete);
    }

    #[test]
    fn test_no_emission_after_stop() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.txt");
        let late = dir.path().join("late.txt");
        std::fs::write(&first, "1").unwrap();
        std::fs::write(&late, "2").unwrap();

        let mut sink = BufferSink::default();
        let mut state = SearchState::new(1, None, ScanMetrics::new());
        state.emit(MatchResult::new(&first), &mut sink);
        state.emit(MatchResult::new(&late), &mut sink);

        assert_eq!(sink.results, vec![MatchResult::new(&first)]);
        assert!(state.stop_flag().load(Ordering::Acquire));
    }
}
