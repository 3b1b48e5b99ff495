/// Search result types: what a search emits, how it reports on itself, and where
/// emitted matches can be pushed while the search is still running.
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A file accepted by the query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MatchResult {
    /// The path as produced by traversal
    pub path: PathBuf,
}

impl MatchResult {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Why a search stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The result cap was reached
    Limit,
    /// No new match arrived within the idle timeout
    IdleTimeout,
    /// Traversal ran out of candidates
    Complete,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::Limit => "limit",
            StopReason::IdleTimeout => "idle_timeout",
            StopReason::Complete => "complete",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics for one search call
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchStats {
    /// Number of distinct matches emitted
    pub emitted: usize,
    /// Wall-clock time of the whole call
    pub wall_time: Duration,
    /// Time since the last emission when the search stopped.
    /// Zero unless `stopped_reason` is [`StopReason::IdleTimeout`].
    pub idle_time: Duration,
    pub stopped_reason: StopReason,
}

impl SearchStats {
    /// Wall time minus the trailing idle gap
    pub fn active_time(&self) -> Duration {
        self.wall_time.saturating_sub(self.idle_time)
    }
}

/// Receives matches as soon as the coordinator accepts them.
///
/// Each call delivers one accepted, deduplicated match. When a sink is supplied to a
/// search the buffered result list comes back empty.
pub trait MatchSink {
    fn accept(&mut self, result: MatchResult);
}

impl<F> MatchSink for F
where
    F: FnMut(MatchResult),
{
    fn accept(&mut self, result: MatchResult) {
        self(result)
    }
}

/// Collects matches into a vector; what a search uses when no sink is given
#[derive(Debug, Default)]
pub struct BufferSink {
    pub results: Vec<MatchResult>,
}

impl MatchSink for BufferSink {
    fn accept(&mut self, result: MatchResult) {
        self.results.push(result);
    }
}
