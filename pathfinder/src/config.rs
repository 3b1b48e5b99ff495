use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{SearchError, SearchResult};

/// Directory names skipped by default: VCS metadata, dependency caches and build output
pub const DEFAULT_EXCLUDES: &[&str] = &[
    ".git",
    "node_modules",
    "__pycache__",
    ".venv",
    ".mypy_cache",
    ".gradle",
    "target",
    "build",
];

/// Options for one search call.
///
/// # Configuration Locations
///
/// Options can be loaded from several files, later ones overriding earlier ones:
/// 1. Global `$CONFIG_DIR/pathfinder/config.yaml`
/// 2. Local `.pathfinder.yaml` in the current directory
/// 3. Custom config file given with `--config`
///
/// Command-line flags are applied last through [`SearchOptions::merge_with_cli`].
///
/// # Configuration Format
///
/// ```yaml
/// # Read file contents as well as names
/// scan_content: true
///
/// # Stop after this many results
/// limit: 50
///
/// # Stop after 5 seconds without a new match
/// idle_timeout_sec: 5.0
///
/// # Directory names never descended into
/// exclude_dirs:
///   - ".git"
///   - "node_modules"
///
/// # Worker threads used for content scanning
/// workers: 4
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Match tokens against file contents, not only names
    pub scan_content: bool,

    /// Ignore name matches entirely; only content (or the extension override) can match
    pub content_only: bool,

    /// Follow symbolic links during traversal and yield symlinked files
    pub follow_symlinks: bool,

    /// Files larger than this are never read for content
    pub max_content_size_mb: u64,

    /// Worker threads used when content scanning is enabled
    pub workers: NonZeroUsize,

    /// Stop once this many distinct matches were emitted
    pub limit: NonZeroUsize,

    /// Maximum directory depth below each root; the root itself is depth 0
    pub max_depth: Option<usize>,

    /// Directory names whose whole subtree is skipped
    pub exclude_dirs: Vec<String>,

    /// A file whose extension is in the filter matches regardless of anything else
    pub ext_match_or: bool,

    /// Stop when this many seconds pass without a new match
    pub idle_timeout_sec: Option<f64>,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

fn default_workers() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get().clamp(1, 8)).unwrap_or(NonZeroUsize::MIN)
}

fn default_limit() -> NonZeroUsize {
    NonZeroUsize::new(20).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            scan_content: true,
            content_only: false,
            follow_symlinks: false,
            max_content_size_mb: 10,
            workers: default_workers(),
            limit: default_limit(),
            max_depth: None,
            exclude_dirs: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            ext_match_or: false,
            idle_timeout_sec: None,
            log_level: default_log_level(),
        }
    }
}

/// Values given on the command line; `None` leaves the file value untouched
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub scan_content: Option<bool>,
    pub content_only: Option<bool>,
    pub follow_symlinks: Option<bool>,
    pub max_content_size_mb: Option<u64>,
    pub workers: Option<NonZeroUsize>,
    pub limit: Option<NonZeroUsize>,
    pub max_depth: Option<usize>,
    pub exclude_dirs: Option<Vec<String>>,
    pub ext_match_or: Option<bool>,
    pub idle_timeout_sec: Option<f64>,
    pub log_level: Option<String>,
}

impl SearchOptions {
    /// Loads options from the default locations
    pub fn load() -> SearchResult<Self> {
        Self::load_from(None)
    }

    /// Loads options from the default locations plus an explicit file
    pub fn load_from(config_path: Option<&Path>) -> SearchResult<Self> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(SearchError::config_error(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
        }

        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("pathfinder/config.yaml")),
            Some(PathBuf::from(".pathfinder.yaml")),
            config_path.map(PathBuf::from),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| SearchError::config_error(e.to_string()))
    }

    /// Applies command-line values on top of file values
    pub fn merge_with_cli(mut self, cli: CliOverrides) -> Self {
        if let Some(v) = cli.scan_content {
            self.scan_content = v;
        }
        if let Some(v) = cli.content_only {
            self.content_only = v;
        }
        if let Some(v) = cli.follow_symlinks {
            self.follow_symlinks = v;
        }
        if let Some(v) = cli.max_content_size_mb {
            self.max_content_size_mb = v;
        }
        if let Some(v) = cli.workers {
            self.workers = v;
        }
        if let Some(v) = cli.limit {
            self.limit = v;
        }
        if cli.max_depth.is_some() {
            self.max_depth = cli.max_depth;
        }
        if let Some(v) = cli.exclude_dirs {
            self.exclude_dirs = v;
        }
        if let Some(v) = cli.ext_match_or {
            self.ext_match_or = v;
        }
        if cli.idle_timeout_sec.is_some() {
            self.idle_timeout_sec = cli.idle_timeout_sec;
        }
        if let Some(v) = cli.log_level {
            self.log_level = v;
        }
        self
    }

    /// Content byte budget derived from `max_content_size_mb`
    pub fn max_content_bytes(&self) -> u64 {
        self.max_content_size_mb.saturating_mul(1024 * 1024)
    }

    /// The idle timeout, if one is configured with a positive value that fits a `Duration`
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_sec
            .filter(|secs| *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}
