/// Error types for pathfinder.
///
/// Almost nothing that goes wrong during a search is fatal. A root that vanished, a
/// directory we may not list, or a file that cannot be opened all degrade to "skip" or
/// "no match" inside the engine. The variants below still exist so those failures can be
/// carried through internal `SearchResult` returns and logged with context before they
/// are discarded.
///
/// The only errors that reach a caller are the ones raised before a search starts:
/// an unusable configuration, or a root list with nothing valid in it.
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur around a search
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Root not available: {0}")]
    RootUnavailable(PathBuf),
    #[error("Cannot read directory {path}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cannot read file {path}: {source}")]
    FileUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("No valid search roots provided")]
    NoValidRoots,
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Canonicalize the path and strip UNC prefixes so that
/// comparisons on Windows are consistent.
pub fn unify_path(original: &Path) -> PathBuf {
    let canonical = original
        .canonicalize()
        .unwrap_or_else(|_| original.to_path_buf());
    strip_unc_prefix(&canonical)
}

/// Strips the Windows UNC prefix (\\?\) from a path if present
pub(crate) fn strip_unc_prefix(p: &Path) -> PathBuf {
    let s = p.display().to_string();
    if let Some(stripped) = s.strip_prefix(r"\\?\") {
        PathBuf::from(stripped)
    } else {
        p.to_path_buf()
    }
}

impl SearchError {
    pub fn root_unavailable(path: impl Into<PathBuf>) -> Self {
        Self::RootUnavailable(path.into())
    }

    pub fn directory_unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryUnreadable {
            path: path.into(),
            source,
        }
    }

    pub fn file_unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileUnreadable {
            path: path.into(),
            source,
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
