use memmap2::Mmap;
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::trace;

use crate::errors::{SearchError, SearchResult};
use crate::metrics::ScanMetrics;

// Constants for file processing
const BUFFER_CAPACITY: usize = 65536;
pub(crate) const SMALL_FILE_THRESHOLD: u64 = 32 * 1024; // 32KB
pub(crate) const LARGE_FILE_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB

/// Decodes file bytes as permissively as possible.
///
/// Valid UTF-8 is borrowed as-is. Otherwise invalid sequences are dropped; if nothing
/// valid survives, the bytes are read as Latin-1 instead. The flag is `true` whenever
/// a permissive path was taken.
pub fn decode_bytes(bytes: &[u8]) -> (Cow<'_, str>, bool) {
    match std::str::from_utf8(bytes) {
        Ok(text) => (Cow::Borrowed(text), false),
        Err(_) => {
            let lenient = decode_utf8_skipping_invalid(bytes);
            if lenient.is_empty() {
                (Cow::Owned(decode_latin1(bytes)), true)
            } else {
                (Cow::Owned(lenient), true)
            }
        }
    }
}

fn decode_utf8_skipping_invalid(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                out.push_str(valid);
                break;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                match e.error_len() {
                    Some(len) => bytes = &rest[len..],
                    // Sequence cut off by the read budget
                    None => break,
                }
            }
        }
    }
    out
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn unreadable(path: &Path) -> impl FnOnce(std::io::Error) -> SearchError + '_ {
    move |e| SearchError::file_unreadable(path, e)
}

/// Reads the leading part of a file for content matching.
///
/// The read strategy follows the file size: small files are read whole, medium files
/// through a buffered reader, and large ones are memory-mapped. Every path stops at
/// the byte budget.
#[derive(Debug, Clone)]
pub struct ContentReader {
    metrics: ScanMetrics,
}

impl ContentReader {
    pub fn new(metrics: ScanMetrics) -> Self {
        Self { metrics }
    }

    /// Reads at most `budget` bytes of `path` and decodes them to text
    pub fn read_text(&self, path: &Path, file_size: u64, budget: u64) -> SearchResult<String> {
        let to_read = file_size.min(budget);

        let text = if file_size < SMALL_FILE_THRESHOLD {
            trace!("Reading small file: {}", path.display());
            let mut bytes = fs::read(path).map_err(unreadable(path))?;
            bytes.truncate(to_read as usize);
            self.decode(&bytes, file_size)
        } else if file_size >= LARGE_FILE_THRESHOLD {
            trace!("Memory mapping large file: {}", path.display());
            let file = File::open(path).map_err(unreadable(path))?;
            let mmap = unsafe { Mmap::map(&file) }.map_err(unreadable(path))?;
            let end = (to_read as usize).min(mmap.len());
            self.decode(&mmap[..end], file_size)
        } else {
            trace!("Buffered read of file: {}", path.display());
            let file = File::open(path).map_err(unreadable(path))?;
            let mut reader = BufReader::with_capacity(BUFFER_CAPACITY, file).take(to_read);
            let mut bytes = Vec::with_capacity(to_read as usize);
            reader.read_to_end(&mut bytes).map_err(unreadable(path))?;
            self.decode(&bytes, file_size)
        };

        Ok(text)
    }

    fn decode(&self, bytes: &[u8], file_size: u64) -> String {
        self.metrics
            .record_content_read(file_size, bytes.len() as u64);
        let (text, fallback) = decode_bytes(bytes);
        if fallback {
            self.metrics.record_decode_fallback();
        }
        text.into_owned()
    }
}
