use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

use super::processor::ContentReader;
use crate::config::SearchOptions;
use crate::errors::{SearchError, SearchResult};
use crate::filters::{extension_of, is_probably_text};
use crate::metrics::ScanMetrics;
use crate::query::ParsedQuery;
use crate::results::MatchResult;

/// A file from traversal with the name parts the query is checked against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
    pub path: PathBuf,
    pub name: String,
    pub stem: String,
    /// Lowercase, dot-prefixed; empty when the file has none
    pub extension: String,
}

impl MatchCandidate {
    /// Splits a path into its name parts. Paths without a final component yield `None`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().into_owned();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.clone());
        Some(Self {
            path: path.to_path_buf(),
            name,
            stem,
            extension: extension_of(path),
        })
    }

    /// Size on disk, following symlinks
    pub fn size(&self) -> SearchResult<u64> {
        fs::metadata(&self.path)
            .map(|m| m.len())
            .map_err(|e| SearchError::file_unreadable(&self.path, e))
    }
}

/// The subset of [`SearchOptions`] that affects a single file's verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    pub scan_content: bool,
    pub content_only: bool,
    pub ext_match_or: bool,
    pub max_content_bytes: u64,
}

impl From<&SearchOptions> for MatchOptions {
    fn from(options: &SearchOptions) -> Self {
        Self {
            scan_content: options.scan_content,
            content_only: options.content_only,
            ext_match_or: options.ext_match_or,
            max_content_bytes: options.max_content_bytes(),
        }
    }
}

/// Decides whether one file matches a query.
///
/// Stateless with respect to the query; shared by reference across worker threads.
#[derive(Debug, Clone)]
pub struct Matcher<'q> {
    query: &'q ParsedQuery,
    options: MatchOptions,
    reader: ContentReader,
    metrics: ScanMetrics,
}

impl<'q> Matcher<'q> {
    pub fn new(query: &'q ParsedQuery, options: MatchOptions, metrics: ScanMetrics) -> Self {
        Self {
            query,
            options,
            reader: ContentReader::new(metrics.clone()),
            metrics,
        }
    }

    pub fn query(&self) -> &ParsedQuery {
        self.query
    }

    /// Evaluates one path. Any I/O failure counts as "no match".
    pub fn evaluate(&self, path: &Path) -> Option<MatchResult> {
        self.metrics.record_candidate();
        let candidate = MatchCandidate::from_path(path)?;

        if self.options.ext_match_or
            && !self.query.and_extensions.is_empty()
            && self.query.and_extensions.contains(&candidate.extension)
        {
            self.metrics.record_name_match();
            return Some(MatchResult::new(candidate.path));
        }

        if !self.options.content_only && self.name_matches(&candidate) {
            self.metrics.record_name_match();
            return Some(MatchResult::new(candidate.path));
        }

        if self.options.scan_content {
            match self.content_matches(&candidate) {
                Ok(true) => {
                    self.metrics.record_content_match();
                    return Some(MatchResult::new(candidate.path));
                }
                Ok(false) => {}
                Err(e) => {
                    trace!("{}", e);
                    self.metrics.record_unreadable();
                }
            }
        }

        None
    }

    /// Exact name and exact stem hits ignore the extension filter; token hits do not.
    pub fn name_matches(&self, candidate: &MatchCandidate) -> bool {
        let name = self.query.normalize(&candidate.name);

        if self.query.exact_filenames.iter().any(|f| *f == name) {
            return true;
        }

        let stem = self.query.normalize(&candidate.stem);
        if self.query.exact_stems.iter().any(|s| *s == stem) {
            return true;
        }

        self.query.extension_allowed(&candidate.extension)
            && self
                .query
                .tokens
                .iter()
                .any(|t| !t.is_empty() && name.contains(t.as_str()))
    }

    fn content_matches(&self, candidate: &MatchCandidate) -> SearchResult<bool> {
        // Nothing read could change the verdict
        if self.query.tokens.is_empty() || !self.query.extension_allowed(&candidate.extension) {
            return Ok(false);
        }

        let size = candidate.size()?;
        if size > self.options.max_content_bytes {
            trace!("Skipping oversize file: {}", candidate.path.display());
            self.metrics.record_skipped_oversize();
            return Ok(false);
        }
        if !is_probably_text(&candidate.path) {
            trace!("Skipping binary file: {}", candidate.path.display());
            self.metrics.record_skipped_binary();
            return Ok(false);
        }

        let text = self
            .reader
            .read_text(&candidate.path, size, self.options.max_content_bytes)?;
        let haystack = self.query.normalize(&text);

        Ok(self
            .query
            .tokens
            .iter()
            .any(|t| !t.is_empty() && haystack.contains(t.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parse_query;
    use tempfile::tempdir;

    fn options() -> MatchOptions {
        MatchOptions {
            scan_content: true,
            content_only: false,
            ext_match_or: false,
            max_content_bytes: 1024 * 1024,
        }
    }

    fn matches(query: &ParsedQuery, options: MatchOptions, path: &Path) -> bool {
        Matcher::new(query, options, ScanMetrics::new())
            .evaluate(path)
            .is_some()
    }

    #[test]
    fn test_candidate_parts() {
        let c = MatchCandidate::from_path(Path::new("/tmp/My Invoice.PDF")).unwrap();
        assert_eq!(c.name, "My Invoice.PDF");
        assert_eq!(c.stem, "My Invoice");
        assert_eq!(c.extension, ".pdf");

        assert!(MatchCandidate::from_path(Path::new("/")).is_none());
    }

    #[test]
    fn test_token_name_match() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("My Invoice.pdf");
        std::fs::write(&path, [0u8; 8]).unwrap();

        let query = parse_query(&["invoice"], false);
        assert!(matches(&query, options(), &path));

        let sensitive = parse_query(&["invoice"], true);
        assert!(!matches(&sensitive, options(), &path));
    }

    #[test]
    fn test_extension_and_filter_gates_tokens() {
        let dir = tempdir().unwrap();
        let md = dir.path().join("budget.md");
        let txt = dir.path().join("budget.txt");
        std::fs::write(&md, "nothing here").unwrap();
        std::fs::write(&txt, "nothing here").unwrap();

        let query = parse_query(&["budget", "ext:.txt"], false);
        assert!(!matches(&query, options(), &md));
        assert!(matches(&query, options(), &txt));
    }

    #[test]
    fn test_exact_names_bypass_extension_filter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "x").unwrap();

        let by_name = parse_query(&["\"notes.md\"", "ext:.txt"], false);
        assert!(matches(&by_name, options(), &path));

        let by_stem = parse_query(&["\"NOTES\"", "ext:.txt"], false);
        assert!(matches(&by_stem, options(), &path));
    }

    #[test]
    fn test_ext_match_or_overrides_everything() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("IMG_0001.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0x00]).unwrap();

        let query = parse_query(&["pfp", "ext:.jpg"], false);
        assert!(!matches(&query, options(), &path));

        let or_options = MatchOptions {
            ext_match_or: true,
            content_only: true,
            ..options()
        };
        assert!(matches(&query, or_options, &path));
    }

    #[test]
    fn test_content_match() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Please pay the INVOICE by Friday").unwrap();

        let query = parse_query(&["invoice"], false);
        assert!(matches(&query, options(), &path));

        let no_content = MatchOptions {
            scan_content: false,
            ..options()
        };
        assert!(!matches(&query, no_content, &path));
    }

    #[test]
    fn test_content_only_ignores_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invoice.txt");
        std::fs::write(&path, "grocery list").unwrap();

        let query = parse_query(&["invoice"], false);
        let content_only = MatchOptions {
            content_only: true,
            ..options()
        };
        assert!(!matches(&query, content_only, &path));
    }

    #[test]
    fn test_content_respects_extension_filter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.md");
        std::fs::write(&path, "invoice 42").unwrap();

        let query = parse_query(&["invoice", "ext:.txt"], false);
        assert!(!matches(&query, options(), &path));
    }

    #[test]
    fn test_binary_content_is_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.jpg");
        let mut bytes = vec![0xFF, 0xD8, 0x00, 0x00];
        bytes.extend_from_slice(b"invoice");
        std::fs::write(&path, bytes).unwrap();

        let metrics = ScanMetrics::new();
        let query = parse_query(&["invoice"], false);
        let matcher = Matcher::new(&query, options(), metrics.clone());
        assert!(matcher.evaluate(&path).is_none());
        assert_eq!(metrics.get_stats().skipped_binary, 1);
    }

    #[test]
    fn test_content_size_cap() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("huge_log.txt");
        let content = "invoice ".repeat(200);
        std::fs::write(&path, &content).unwrap();

        let capped = MatchOptions {
            max_content_bytes: 100,
            ..options()
        };
        let query = parse_query(&["invoice"], false);
        assert!(!matches(&query, capped, &path));

        // the name still matches even though the content is never read
        let by_name = parse_query(&["huge"], false);
        assert!(matches(&by_name, capped, &path));
    }

    #[test]
    fn test_vanished_file_is_no_match() {
        let dir = tempdir().unwrap();
        let metrics = ScanMetrics::new();
        let query = parse_query(&["anything"], false);
        let matcher = Matcher::new(&query, options(), metrics.clone());

        assert!(matcher.evaluate(&dir.path().join("gone.txt")).is_none());
        assert_eq!(metrics.get_stats().unreadable_files, 1);
    }
}
