//! Local file search by name and content.
//!
//! ```rust,no_run
//! use pathfinder::{parse_query, search, SearchOptions};
//!
//! let query = parse_query(&["invoice", "type:doc"], false);
//! let (results, stats) = search(&["/home/me/Documents"], &query, &SearchOptions::default(), None);
//! for result in &results {
//!     println!("{}", result.path.display());
//! }
//! println!("{} results ({})", stats.emitted, stats.stopped_reason);
//! ```

pub mod config;
pub mod errors;
pub mod filters;
pub mod metrics;
pub mod query;
pub mod results;
pub mod search;

pub use config::{CliOverrides, SearchOptions, DEFAULT_EXCLUDES};
pub use errors::{SearchError, SearchResult};
pub use metrics::{ScanMetrics, ScanStats};
pub use query::{parse_query, ParsedQuery};
pub use results::{BufferSink, MatchResult, MatchSink, SearchStats, StopReason};
pub use search::{search, search_candidates};
