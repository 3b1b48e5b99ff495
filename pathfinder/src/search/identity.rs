use std::fs;
use std::path::Path;

use crate::errors::strip_unc_prefix;

/// A stable key for deduplicating matches.
///
/// Preference order: device and inode, then the resolved case-folded path, then the
/// path exactly as given. Two hard links to one file share an identity, and so do a
/// file and a symlink pointing at it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileIdentity {
    Inode { device: u64, inode: u64 },
    Resolved(String),
    Raw(String),
}

impl FileIdentity {
    /// Computes the identity of `path`. Never fails; the last resort is the raw path.
    pub fn of(path: &Path) -> Self {
        if let Some(identity) = fs::metadata(path).ok().and_then(|m| inode_identity(&m)) {
            return identity;
        }

        match path.canonicalize() {
            Ok(resolved) => FileIdentity::Resolved(
                strip_unc_prefix(&resolved)
                    .to_string_lossy()
                    .to_lowercase(),
            ),
            Err(_) => FileIdentity::Raw(path.to_string_lossy().into_owned()),
        }
    }
}

#[cfg(unix)]
fn inode_identity(meta: &fs::Metadata) -> Option<FileIdentity> {
    use std::os::unix::fs::MetadataExt;
    Some(FileIdentity::Inode {
        device: meta.dev(),
        inode: meta.ino(),
    })
}

#[cfg(not(unix))]
fn inode_identity(_meta: &fs::Metadata) -> Option<FileIdentity> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_hard_links_share_identity() {
        let dir = tempdir().unwrap();
        let original = dir.path().join("report.txt");
        let link = dir.path().join("report-link.txt");
        std::fs::write(&original, "quarterly").unwrap();
        std::fs::hard_link(&original, &link).unwrap();

        assert_eq!(FileIdentity::of(&original), FileIdentity::of(&link));
    }

    #[test]
    fn test_distinct_files_differ() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        std::fs::write(&a, "same").unwrap();
        std::fs::write(&b, "same").unwrap();

        assert_ne!(FileIdentity::of(&a), FileIdentity::of(&b));
    }

    #[test]
    fn test_missing_file_uses_raw_path() {
        let identity = FileIdentity::of(Path::new("no/such/File.TXT"));
        assert_eq!(identity, FileIdentity::Raw("no/such/File.TXT".to_string()));
    }
}
