mod output;
mod roots;

use anyhow::Result;
use clap::Parser;
use pathfinder::{
    parse_query, search, CliOverrides, MatchResult, ParsedQuery, SearchError, SearchOptions,
    SearchStats,
};
use std::{num::NonZeroUsize, path::PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use output::{print_hint, print_status, Printer};

const ABOUT: &str = "Search files by name and/or text content across common locations \
such as Desktop, Documents, Downloads, Pictures, etc.";

const LONG_ABOUT: &str = "Search files by name and/or text content across common locations \
such as Desktop, Documents, Downloads, Pictures, etc.

Search terms support:
  ext:<extension>   Match by extension (e.g. ext:.jpg)
  type:<category>   Match by type category (image, video, audio, doc, code, data, ...)
  \"name.ext\"        Exact filename match (quoted)
  tokens            Substring match on filenames or file contents

Matching is case-insensitive unless --case-sensitive is given.";

#[derive(Parser, Debug)]
#[command(name = "pathfinder", author, version, about = ABOUT, long_about = LONG_ABOUT)]
struct Cli {
    /// Search terms. Combine ext:/type: filters with text or exact matches.
    #[arg(required = true)]
    terms: Vec<String>,

    /// Override search roots (default: common locations in your home folder)
    #[arg(long, num_args = 1..)]
    paths: Vec<String>,

    /// Follow symbolic links when traversing directories
    #[arg(long)]
    follow_symlinks: bool,

    /// Limit directory traversal depth from each root (0 searches only the root itself)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Directory names to skip
    /// (default: .git node_modules __pycache__ .venv .mypy_cache .gradle target build)
    #[arg(long, num_args = 0..)]
    exclude: Option<Vec<String>>,

    /// Disable content scanning (only search filenames)
    #[arg(long)]
    no_content: bool,

    /// Alias for --no-content
    #[arg(long)]
    filename_only: bool,

    /// Search only within file content (ignore filename matches)
    #[arg(long)]
    content_only: bool,

    /// Case-sensitive matching for filenames and content
    #[arg(long)]
    case_sensitive: bool,

    /// Maximum file size for content scan in MB [default: 10]
    #[arg(long)]
    max_size_mb: Option<u64>,

    /// Stop after finding this many results [default: 20]
    #[arg(long)]
    limit: Option<NonZeroUsize>,

    /// Output each result as a JSON object
    #[arg(long)]
    json: bool,

    /// Only print results after the search completes
    #[arg(long)]
    no_stream: bool,

    /// Number of worker threads for content scanning [default: CPU count, at most 8]
    #[arg(long)]
    workers: Option<NonZeroUsize>,

    /// ext:/type: filters act as OR instead of AND: any file with a listed extension matches
    #[arg(long)]
    ext_match_or: bool,

    /// Stop after N seconds with no new match (resets on each match)
    #[arg(long, value_name = "SECONDS")]
    idle_timeout: Option<f64>,

    /// Show modified/created times with each result
    #[arg(long)]
    f_info: bool,

    /// If the first pass finds nothing, search the full drive(s) as well
    #[arg(short = 'x', long)]
    expanded_search: bool,

    /// Configuration file layered over the default locations
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            scan_content: (self.no_content || self.filename_only).then_some(false),
            content_only: self.content_only.then_some(true),
            follow_symlinks: self.follow_symlinks.then_some(true),
            max_content_size_mb: self.max_size_mb,
            workers: self.workers,
            limit: self.limit,
            max_depth: self.max_depth,
            exclude_dirs: self.exclude.clone(),
            ext_match_or: self.ext_match_or.then_some(true),
            idle_timeout_sec: self.idle_timeout,
            log_level: None,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let options = SearchOptions::load_from(cli.config.as_deref())?.merge_with_cli(cli.overrides());
    init_tracing(&options.log_level);
    debug!("Resolved options: {:?}", options);

    let home = dirs::home_dir();
    let (roots, label) = if cli.paths.is_empty() {
        let roots = home
            .as_deref()
            .map(roots::default_search_paths)
            .unwrap_or_default();
        (roots, "pass 1: common dirs")
    } else {
        (roots::resolve_paths(&cli.paths, home.as_deref()), "pass 1: given paths")
    };
    if roots.is_empty() {
        return Err(SearchError::NoValidRoots.into());
    }

    let query = parse_query(&cli.terms, cli.case_sensitive);
    let printer = Printer::new(cli.json, cli.f_info);
    let stream = !cli.no_stream;

    let first = run_pass(&roots, &query, &options, printer, stream);
    print_status(label, &first);
    if first.emitted > 0 {
        return Ok(());
    }

    if !cli.expanded_search {
        print_hint("No matches in pass 1. Rerun with -x/--expanded-search to scan full drive(s).");
        return Ok(());
    }

    print_hint("Expanding to full drive(s)...");
    let drives = roots::drive_roots();
    let second = run_pass(&drives, &query, &options, printer, stream);
    print_status("pass 2: full drives", &second);
    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// One search over `roots`, printing as results arrive or once at the end
fn run_pass(
    roots: &[PathBuf],
    query: &ParsedQuery,
    options: &SearchOptions,
    printer: Printer,
    stream: bool,
) -> SearchStats {
    if stream {
        let mut emit = |result: MatchResult| printer.print(&result.path);
        let (_, stats) = search(roots, query, options, Some(&mut emit));
        stats
    } else {
        let (results, stats) = search(roots, query, options, None);
        for result in &results {
            printer.print(&result.path);
        }
        stats
    }
}
