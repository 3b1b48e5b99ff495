//! Where a search starts when the user names no roots, and where it goes next.
use colored::Colorize;
use pathfinder::errors::unify_path;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const COMMON_DIR_NAMES: &[&str] = &[
    "Desktop",
    "Documents",
    "Downloads",
    "Pictures",
    "Music",
    "Videos",
    "Screenshots",
];

const CLOUD_VARIANTS: &[&str] = &[
    "OneDrive/Desktop",
    "OneDrive/Documents",
    "OneDrive/Pictures",
    "iCloud Drive/Desktop",
    "iCloud Drive/Documents",
];

/// Existing common folders under `home`, synced variants included, then `home` itself
pub fn default_search_paths(home: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = COMMON_DIR_NAMES
        .iter()
        .chain(CLOUD_VARIANTS)
        .map(|name| home.join(name))
        .filter(|p| p.exists())
        .collect();
    paths.push(home.to_path_buf());
    dedup_resolved(paths)
}

/// Whole-drive roots for the expanded pass
#[cfg(windows)]
pub fn drive_roots() -> Vec<PathBuf> {
    let roots = (b'A'..=b'Z')
        .map(|letter| PathBuf::from(format!("{}:\\", letter as char)))
        .filter(|p| p.exists())
        .collect();
    dedup_resolved(roots)
}

/// Whole-drive roots for the expanded pass
#[cfg(not(windows))]
pub fn drive_roots() -> Vec<PathBuf> {
    let mut roots = vec![PathBuf::from("/")];
    for base in ["/Volumes", "/mnt", "/media"] {
        let Ok(entries) = std::fs::read_dir(base) else {
            continue;
        };
        roots.extend(
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_dir()),
        );
    }
    dedup_resolved(roots)
}

/// Expands `~` and drops paths that do not exist, warning about each one
pub fn resolve_paths(raw: &[String], home: Option<&Path>) -> Vec<PathBuf> {
    let mut roots = Vec::with_capacity(raw.len());
    for s in raw {
        let path = expand_tilde(s, home);
        if path.exists() {
            roots.push(path);
        } else {
            eprintln!(
                "{}",
                format!("[warn] path does not exist: {}", path.display()).yellow()
            );
        }
    }
    roots
}

fn expand_tilde(raw: &str, home: Option<&Path>) -> PathBuf {
    match (raw, home) {
        ("~", Some(home)) => home.to_path_buf(),
        (s, Some(home)) if s.starts_with("~/") || s.starts_with("~\\") => home.join(&s[2..]),
        (s, _) => PathBuf::from(s),
    }
}

/// Keeps the first of several paths that resolve to the same place
fn dedup_resolved(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter(|p| seen.insert(unify_path(p)))
        .collect()
}
