use crossbeam_channel::Select;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

use super::feed::{CandidateFeed, Next};
use super::matcher::Matcher;
use super::state::SearchState;
use crate::errors::{SearchError, SearchResult};
use crate::results::{MatchResult, MatchSink};

/// Most tasks the pooled strategy keeps in flight before it waits on completions
pub const BATCH_SIZE: usize = 2048;

/// One way of turning a stream of candidates into emitted matches.
///
/// Chosen once per search call. Implementations pull candidates until the state
/// reports a stop or the stream runs dry, and route every accepted match through
/// [`SearchState::emit`].
pub trait ExecutionStrategy {
    fn run(
        &self,
        feed: &CandidateFeed,
        matcher: &Matcher<'_>,
        state: &mut SearchState,
        sink: &mut dyn MatchSink,
    );

    fn name(&self) -> &'static str;
}

/// Picks the pooled strategy when file contents are read, the inline one otherwise
pub fn select_strategy(scan_content: bool, workers: NonZeroUsize) -> Box<dyn ExecutionStrategy> {
    if !scan_content {
        return Box::new(InlineStrategy);
    }
    match PooledStrategy::new(workers, BATCH_SIZE) {
        Ok(pooled) => Box::new(pooled),
        Err(e) => {
            warn!("{}; evaluating candidates inline", e);
            Box::new(InlineStrategy)
        }
    }
}

/// Evaluates each candidate on the calling thread, in traversal order
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineStrategy;

impl ExecutionStrategy for InlineStrategy {
    fn run(
        &self,
        feed: &CandidateFeed,
        matcher: &Matcher<'_>,
        state: &mut SearchState,
        sink: &mut dyn MatchSink,
    ) {
        while !state.check_idle() {
            match feed.next_within(state.time_until_idle()) {
                Next::Candidate(path) => {
                    if let Some(result) = matcher.evaluate(&path) {
                        state.emit(result, sink);
                    }
                }
                Next::Pending => continue,
                Next::Exhausted => break,
            }
        }
    }

    fn name(&self) -> &'static str {
        "inline"
    }
}

/// Evaluates candidates on a bounded rayon pool.
///
/// The coordinating thread keeps walking while workers read files; results come back
/// over a channel and are emitted in completion order.
pub struct PooledStrategy {
    pool: ThreadPool,
    batch_size: usize,
}

impl PooledStrategy {
    pub fn new(workers: NonZeroUsize, batch_size: usize) -> SearchResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.get())
            .thread_name(|i| format!("pathfinder-worker-{}", i))
            .build()
            .map_err(|e| SearchError::config_error(format!("cannot start worker pool: {}", e)))?;
        Ok(Self {
            pool,
            batch_size: batch_size.max(1),
        })
    }
}

impl ExecutionStrategy for PooledStrategy {
    fn run(
        &self,
        feed: &CandidateFeed,
        matcher: &Matcher<'_>,
        state: &mut SearchState,
        sink: &mut dyn MatchSink,
    ) {
        let (tx, rx) = crossbeam_channel::unbounded::<Option<MatchResult>>();
        let stop_flag = state.stop_flag();
        let stop: &AtomicBool = &stop_flag;

        // The scope does not return until every spawned task has finished
        self.pool.in_place_scope(|scope| {
            let mut in_flight = 0usize;
            let mut feeding = true;

            while !state.check_idle() {
                if !feeding && in_flight == 0 {
                    break;
                }

                // Wait for whichever comes first: a finished task, a new candidate
                // while there is room for it, or the idle deadline
                let mut select = Select::new();
                select.recv(&rx);
                let feed_op = (feeding && in_flight < self.batch_size)
                    .then(|| select.recv(feed.receiver()));
                let selected = match state.time_until_idle() {
                    Some(wait) => match select.select_timeout(wait) {
                        Ok(selected) => selected,
                        Err(_) => continue,
                    },
                    None => select.select(),
                };

                if Some(selected.index()) == feed_op {
                    match selected.recv(feed.receiver()) {
                        Ok(path) => {
                            let tx = tx.clone();
                            scope.spawn(move |_| {
                                let result = if stop.load(Ordering::Acquire) {
                                    None
                                } else {
                                    matcher.evaluate(&path)
                                };
                                let _ = tx.send(result);
                            });
                            in_flight += 1;
                        }
                        Err(_) => feeding = false,
                    }
                } else if let Ok(result) = selected.recv(&rx) {
                    in_flight -= 1;
                    if let Some(result) = result {
                        state.emit(result, sink);
                    }
                }
            }
        });
    }

    fn name(&self) -> &'static str {
        "pooled"
    }
}
