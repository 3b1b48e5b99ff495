use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::feed::CandidateFeed;
use super::matcher::{MatchOptions, Matcher};
use super::state::SearchState;
use super::strategy::{select_strategy, BATCH_SIZE};
use super::walker::{CandidateWalker, WalkOptions};
use crate::config::SearchOptions;
use crate::metrics::ScanMetrics;
use crate::query::ParsedQuery;
use crate::results::{BufferSink, MatchResult, MatchSink, SearchStats};

/// Searches the given roots for files matching `query`.
///
/// Matches go to `sink` as they are accepted; when no sink is supplied they are
/// buffered and returned instead, so with a sink the returned vector is empty.
/// Problems with individual roots, directories or files only ever shrink the result
/// set; this call does not fail.
pub fn search<R: AsRef<Path>>(
    roots: &[R],
    query: &ParsedQuery,
    options: &SearchOptions,
    sink: Option<&mut dyn MatchSink>,
) -> (Vec<MatchResult>, SearchStats) {
    let walker = CandidateWalker::new(roots, WalkOptions::from(options));
    search_candidates(walker, query, options, sink)
}

/// Runs the coordinator over any stream of candidate paths.
///
/// [`search`] feeds it from the directory walker; anything else that yields paths works
/// the same way. The stream is drained on its own thread, so one that stalls between
/// items, or forever, still ends at the idle timeout.
pub fn search_candidates<I>(
    candidates: I,
    query: &ParsedQuery,
    options: &SearchOptions,
    sink: Option<&mut dyn MatchSink>,
) -> (Vec<MatchResult>, SearchStats)
where
    I: IntoIterator<Item = PathBuf>,
    I::IntoIter: Send + 'static,
{
    let metrics = ScanMetrics::new();
    let mut state = SearchState::new(options.limit.get(), options.idle_timeout(), metrics.clone());

    if query.is_empty() {
        debug!("Empty query, nothing to search for");
        return (Vec::new(), state.finish());
    }

    info!("Starting search with query: {:?}", query);

    let matcher = Matcher::new(query, MatchOptions::from(options), metrics.clone());
    let strategy = select_strategy(options.scan_content, options.workers);
    debug!(
        "Using {} strategy with {} workers",
        strategy.name(),
        options.workers
    );

    let mut buffer = BufferSink::default();
    let sink: &mut dyn MatchSink = match sink {
        Some(sink) => sink,
        None => &mut buffer,
    };

    let feed = CandidateFeed::spawn(candidates, BATCH_SIZE, state.stop_flag());
    strategy.run(&feed, &matcher, &mut state, sink);

    let stats = state.finish();
    metrics.log_stats();
    info!(
        "Search finished: {} results in {:?} ({})",
        stats.emitted, stats.wall_time, stats.stopped_reason
    );

    (buffer.results, stats)
}
