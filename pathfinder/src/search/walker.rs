use ignore::{DirEntry, Walk, WalkBuilder};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::vec;
use tracing::{debug, trace};

use crate::config::SearchOptions;
use crate::errors::SearchError;

/// Traversal settings taken from [`SearchOptions`]
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    pub follow_symlinks: bool,
    /// Deepest directory descended into; roots are depth 0
    pub max_depth: Option<usize>,
    pub exclude_dirs: Arc<HashSet<String>>,
}

impl From<&SearchOptions> for WalkOptions {
    fn from(options: &SearchOptions) -> Self {
        Self {
            follow_symlinks: options.follow_symlinks,
            max_depth: options.max_depth,
            exclude_dirs: Arc::new(options.exclude_dirs.iter().cloned().collect()),
        }
    }
}

/// Lazily yields candidate files under a list of roots, one root after another.
///
/// Descent is iterative, so deep trees never grow the call stack. Missing roots and
/// directories that cannot be listed are skipped; neither ends the walk. No
/// deduplication happens here: a file reachable twice is yielded twice.
pub struct CandidateWalker {
    roots: vec::IntoIter<PathBuf>,
    current: Option<Walk>,
    options: WalkOptions,
}

impl CandidateWalker {
    pub fn new<P: AsRef<Path>>(roots: &[P], options: WalkOptions) -> Self {
        let roots: Vec<PathBuf> = roots.iter().map(|r| r.as_ref().to_path_buf()).collect();
        Self {
            roots: roots.into_iter(),
            current: None,
            options,
        }
    }

    fn walk_root(&self, root: &Path) -> Walk {
        let mut builder = WalkBuilder::new(root);
        builder
            .standard_filters(false)
            .follow_links(self.options.follow_symlinks)
            // Files inside a directory at depth d sit at entry depth d + 1
            .max_depth(self.options.max_depth.map(|d| d.saturating_add(1)));

        let excluded = Arc::clone(&self.options.exclude_dirs);
        builder.filter_entry(move |entry| !is_excluded_dir(entry, &excluded));
        builder.build()
    }
}

/// Regular files always; with `follow_symlinks`, any symlink that is not a directory
fn is_candidate(entry: &DirEntry, follow_symlinks: bool) -> bool {
    match entry.file_type() {
        Some(ft) if ft.is_file() => true,
        Some(ft) if ft.is_dir() => false,
        _ => follow_symlinks && entry.path_is_symlink(),
    }
}

/// The path a walk error is about, if it names one
fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithDepth { err, .. } => error_path(err),
        ignore::Error::WithPath { path, .. } => Some(path),
        _ => None,
    }
}

/// A symlink whose target cannot be followed, or resolves to something other than a
/// directory. `ignore` reports these as errors when following links.
fn dangling_symlink(err: &ignore::Error) -> Option<PathBuf> {
    let path = error_path(err)?;
    let is_link = path
        .symlink_metadata()
        .is_ok_and(|m| m.file_type().is_symlink());
    (is_link && !path.is_dir()).then(|| path.to_path_buf())
}

fn log_walk_error(err: ignore::Error) {
    match err {
        ignore::Error::WithDepth { err, .. } => log_walk_error(*err),
        ignore::Error::WithPath { path, err } if path.is_dir() => match err.io_error() {
            Some(e) => debug!(
                "{}",
                SearchError::directory_unreadable(path, io::Error::new(e.kind(), e.to_string()))
            ),
            None => trace!("Skipping {}: {}", path.display(), err),
        },
        other => trace!("Skipping unreadable entry: {}", other),
    }
}

fn is_excluded_dir(entry: &DirEntry, excluded: &HashSet<String>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_some_and(|ft| ft.is_dir())
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excluded.contains(name))
}

impl Iterator for CandidateWalker {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let follow_symlinks = self.options.follow_symlinks;
            if let Some(walk) = self.current.as_mut() {
                for entry in walk.by_ref() {
                    match entry {
                        Ok(entry) if entry.depth() > 0 && is_candidate(&entry, follow_symlinks) => {
                            return Some(entry.into_path());
                        }
                        Ok(_) => {}
                        Err(err) => match dangling_symlink(&err).filter(|_| follow_symlinks) {
                            Some(path) => {
                                trace!("Yielding unresolved symlink: {}", path.display());
                                return Some(path);
                            }
                            None => log_walk_error(err),
                        },
                    }
                }
                self.current = None;
            }

            let root = self.roots.next()?;
            if !root.exists() {
                debug!("{}", SearchError::root_unavailable(&root));
                continue;
            }
            debug!("Walking root: {}", root.display());
            self.current = Some(self.walk_root(&root));
        }
    }
}
