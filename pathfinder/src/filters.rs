/// Static extension tables and the cheap, metadata-only file checks built on them.
///
/// `type:<category>` query terms expand through [`extensions_for_type`], and the
/// content scanner asks [`is_probably_text`] before reading a file so that images,
/// archives and other binary blobs never get decoded.
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Number of leading bytes sniffed for a NUL when the extension is not a known text type
pub const TEXT_SNIFF_BYTES: usize = 1024;

static TYPE_GROUPS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut groups: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    groups.insert(
        "image",
        &[
            ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".tiff", ".tif", ".webp", ".heic", ".svg",
        ],
    );
    groups.insert(
        "video",
        &[".mp4", ".mkv", ".mov", ".avi", ".webm", ".wmv", ".m4v"],
    );
    groups.insert("audio", &[".mp3", ".wav", ".flac", ".aac", ".ogg", ".m4a"]);
    groups.insert(
        "doc",
        &[".pdf", ".doc", ".docx", ".rtf", ".txt", ".md", ".rst"],
    );
    groups.insert(
        "code",
        &[
            ".py", ".js", ".ts", ".tsx", ".jsx", ".java", ".c", ".cpp", ".cs", ".go", ".rb",
            ".rs", ".php", ".sh", ".ps1",
        ],
    );
    groups.insert(
        "archive",
        &[".zip", ".tar", ".gz", ".tgz", ".bz2", ".7z", ".rar"],
    );
    groups.insert(
        "data",
        &[
            ".csv", ".tsv", ".json", ".jsonl", ".ndjson", ".parquet", ".feather", ".arrow",
            ".orc", ".h5", ".hdf5", ".db", ".sqlite", ".sqlite3", ".db3", ".dta", ".sav",
        ],
    );
    groups.insert("sheet", &[".xlsx", ".xls", ".ods", ".csv", ".tsv"]);
    groups.insert("notebook", &[".ipynb"]);
    groups.insert("pdf", &[".pdf"]);
    groups
});

/// Extensions that are always treated as text without sniffing the file
const TEXT_EXTENSIONS: &[&str] = &[
    ".txt", ".md", ".rst", ".log", ".py", ".js", ".ts", ".tsx", ".jsx", ".json", ".yml",
    ".yaml", ".ini", ".cfg", ".conf", ".html", ".htm", ".css", ".xml", ".csv", ".tsv",
    ".ipynb", ".tex",
];

/// Looks up a `type:` category, case-insensitively. Unknown categories yield an empty slice.
pub fn extensions_for_type(category: &str) -> &'static [&'static str] {
    TYPE_GROUPS
        .get(category.to_lowercase().as_str())
        .copied()
        .unwrap_or(&[])
}

/// Lowercases an extension and makes sure it carries a leading dot
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

/// Returns the lowercase, dot-prefixed extension of a path, or an empty string.
///
/// Follows `Path::extension`, so dotfiles such as `.bashrc` have no extension.
pub fn extension_of(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => format!(".{}", ext.to_lowercase()),
        _ => String::new(),
    }
}

/// Checks whether an extension (already normalized) is on the text allowlist
pub fn is_text_extension(ext: &str) -> bool {
    TEXT_EXTENSIONS.contains(&ext)
}

/// Checks if a file is likely to hold text.
///
/// Known text extensions pass immediately; anything else passes only when its first
/// [`TEXT_SNIFF_BYTES`] bytes contain no NUL. Unreadable files are not text.
pub fn is_probably_text(path: &Path) -> bool {
    if is_text_extension(&extension_of(path)) {
        return true;
    }

    let mut sample = Vec::with_capacity(TEXT_SNIFF_BYTES);
    match File::open(path) {
        Ok(file) => match file.take(TEXT_SNIFF_BYTES as u64).read_to_end(&mut sample) {
            Ok(_) => !sample.contains(&0),
            Err(_) => false,
        },
        Err(_) => false,
    }
}
