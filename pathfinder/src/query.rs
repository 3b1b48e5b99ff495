//! Query parsing.
//!
//! Raw command-line terms are turned into a [`ParsedQuery`] once per invocation. The
//! grammar is deliberately forgiving: there is no malformed input, anything that is not
//! recognised as a filter or a quoted exact name simply becomes a fuzzy token.
//!
//! | Term              | Meaning                                     |
//! |-------------------|---------------------------------------------|
//! | `ext:.jpg`        | extension filter (AND unless `ext_match_or`) |
//! | `type:image`      | every extension of a category               |
//! | `"report.pdf"`    | exact filename                              |
//! | `"docs/a/b.txt"`  | exact filename `b.txt`                      |
//! | `"report"`        | exact stem                                  |
//! | `invoice`         | fuzzy token for names and content           |
use std::collections::{BTreeSet, HashSet};

use crate::filters::{extensions_for_type, normalize_extension};

/// A structured search predicate.
///
/// Exact names and tokens are stored already normalized for `case_sensitive`, so the
/// matcher only has to normalize the file side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    pub exact_filenames: Vec<String>,
    pub exact_stems: Vec<String>,
    /// Lowercase, dot-prefixed extensions. Acts as an AND filter unless overridden.
    pub and_extensions: BTreeSet<String>,
    pub tokens: Vec<String>,
    pub case_sensitive: bool,
}

impl ParsedQuery {
    /// Normalizes a file-side string the same way the query side was normalized
    pub fn normalize(&self, s: &str) -> String {
        normalize(s, self.case_sensitive)
    }

    /// True when the extension passes the AND filter (or there is no filter)
    pub fn extension_allowed(&self, ext: &str) -> bool {
        self.and_extensions.is_empty() || self.and_extensions.contains(ext)
    }

    /// True when the query can never match anything by name or content
    pub fn is_empty(&self) -> bool {
        self.exact_filenames.is_empty()
            && self.exact_stems.is_empty()
            && self.and_extensions.is_empty()
            && self.tokens.is_empty()
    }
}

fn normalize(s: &str, case_sensitive: bool) -> String {
    if case_sensitive {
        s.to_string()
    } else {
        s.to_lowercase()
    }
}

const PATH_SEPARATORS: &[char] = &['/', '\\'];

/// A filter term recognised in either quoted or unquoted position
enum FilterTerm<'a> {
    Ext(&'a str),
    Type(&'a str),
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

fn parse_filter(s: &str) -> Option<FilterTerm<'_>> {
    if let Some(ext) = strip_prefix_ignore_case(s, "ext:") {
        let bare = ext.strip_prefix('.').unwrap_or(ext);
        if !bare.is_empty() && bare.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Some(FilterTerm::Ext(ext));
        }
        return None;
    }
    if let Some(category) = strip_prefix_ignore_case(s, "type:") {
        if !category.is_empty()
            && category
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Some(FilterTerm::Type(category));
        }
    }
    None
}

/// Splits the joined term text into quoted segments and the unquoted remainder.
///
/// An unmatched `"` is left in the unquoted text and ends up inside a token.
fn split_quoted(joined: &str) -> (Vec<&str>, String) {
    let mut quoted = Vec::new();
    let mut rest = String::with_capacity(joined.len());
    let mut remaining = joined;

    while let Some(open) = remaining.find('"') {
        let after = &remaining[open + 1..];
        match after.find('"') {
            Some(close) if close > 0 => {
                rest.push_str(&remaining[..open]);
                rest.push(' ');
                quoted.push(&after[..close]);
                remaining = &after[close + 1..];
            }
            Some(_) => {
                // `""` is not a quoted segment; keep the first quote and carry on
                rest.push_str(&remaining[..open + 1]);
                remaining = after;
            }
            None => break,
        }
    }
    rest.push_str(remaining);
    (quoted, rest)
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

fn apply_filter(filter: FilterTerm<'_>, extensions: &mut BTreeSet<String>) {
    match filter {
        FilterTerm::Ext(ext) => {
            extensions.insert(normalize_extension(ext));
        }
        FilterTerm::Type(category) => {
            extensions.extend(
                extensions_for_type(category)
                    .iter()
                    .map(|e| normalize_extension(e)),
            );
        }
    }
}

/// Parses raw query terms into a [`ParsedQuery`]. Pure, no I/O, never fails.
pub fn parse_query<S: AsRef<str>>(terms: &[S], case_sensitive: bool) -> ParsedQuery {
    let joined = terms
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join(" ");
    let (quoted, unquoted) = split_quoted(&joined);

    let mut exact_filenames = Vec::new();
    let mut exact_stems = Vec::new();
    let mut and_extensions = BTreeSet::new();
    let mut tokens = Vec::new();

    for raw in quoted {
        let s = raw.trim();
        if s.is_empty() {
            continue;
        }
        if let Some(filter) = parse_filter(s) {
            apply_filter(filter, &mut and_extensions);
            continue;
        }

        if s.contains(PATH_SEPARATORS) {
            let name = s
                .rsplit(PATH_SEPARATORS)
                .find(|segment| !segment.is_empty())
                .unwrap_or(s);
            exact_filenames.push(normalize(name, case_sensitive));
        } else if s.contains('.') && !s.starts_with('.') {
            exact_filenames.push(normalize(s, case_sensitive));
        } else {
            exact_stems.push(normalize(s, case_sensitive));
        }
    }

    for s in unquoted.split_whitespace() {
        if let Some(filter) = parse_filter(s) {
            apply_filter(filter, &mut and_extensions);
            continue;
        }
        tokens.push(normalize(s, case_sensitive));
    }

    ParsedQuery {
        exact_filenames: dedup(exact_filenames),
        exact_stems: dedup(exact_stems),
        and_extensions,
        tokens: dedup(tokens),
        case_sensitive,
    }
}
