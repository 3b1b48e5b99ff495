use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::search::processor::{LARGE_FILE_THRESHOLD, SMALL_FILE_THRESHOLD};

/// Tracks what a search did with its candidates.
///
/// Cloning shares the counters, so worker threads can record into the same instance
/// the coordinator logs at the end.
#[derive(Debug, Clone)]
pub struct ScanMetrics {
    candidates_evaluated: Arc<AtomicU64>,
    name_matches: Arc<AtomicU64>,
    content_matches: Arc<AtomicU64>,
    duplicates_discarded: Arc<AtomicU64>,

    // Content reading
    files_scanned: Arc<AtomicU64>,
    bytes_read: Arc<AtomicU64>,
    skipped_binary: Arc<AtomicU64>,
    skipped_oversize: Arc<AtomicU64>,
    unreadable_files: Arc<AtomicU64>,
    decode_fallbacks: Arc<AtomicU64>,

    // Read strategy
    small_files_read: Arc<AtomicU64>,
    buffered_files_read: Arc<AtomicU64>,
    mmap_files_read: Arc<AtomicU64>,
}

impl ScanMetrics {
    /// Creates a new ScanMetrics instance
    pub fn new() -> Self {
        Self {
            candidates_evaluated: Arc::new(AtomicU64::new(0)),
            name_matches: Arc::new(AtomicU64::new(0)),
            content_matches: Arc::new(AtomicU64::new(0)),
            duplicates_discarded: Arc::new(AtomicU64::new(0)),
            files_scanned: Arc::new(AtomicU64::new(0)),
            bytes_read: Arc::new(AtomicU64::new(0)),
            skipped_binary: Arc::new(AtomicU64::new(0)),
            skipped_oversize: Arc::new(AtomicU64::new(0)),
            unreadable_files: Arc::new(AtomicU64::new(0)),
            decode_fallbacks: Arc::new(AtomicU64::new(0)),
            small_files_read: Arc::new(AtomicU64::new(0)),
            buffered_files_read: Arc::new(AtomicU64::new(0)),
            mmap_files_read: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn record_candidate(&self) {
        self.candidates_evaluated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_name_match(&self) {
        self.name_matches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_content_match(&self) {
        self.content_matches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duplicate(&self) {
        self.duplicates_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_binary(&self) {
        self.skipped_binary.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_oversize(&self) {
        self.skipped_oversize.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unreadable(&self) {
        self.unreadable_files.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_fallback(&self) {
        self.decode_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a content read and which read path its size selected
    pub fn record_content_read(&self, file_size: u64, bytes: u64) {
        self.files_scanned.fetch_add(1, Ordering::Relaxed);
        let total = self.bytes_read.fetch_add(bytes, Ordering::Relaxed) + bytes;
        if file_size < SMALL_FILE_THRESHOLD {
            self.small_files_read.fetch_add(1, Ordering::Relaxed);
        } else if file_size >= LARGE_FILE_THRESHOLD {
            self.mmap_files_read.fetch_add(1, Ordering::Relaxed);
        } else {
            self.buffered_files_read.fetch_add(1, Ordering::Relaxed);
        }
        debug!("Read {} bytes, total read: {} bytes", bytes, total);
    }

    /// Gets current statistics
    pub fn get_stats(&self) -> ScanStats {
        ScanStats {
            candidates_evaluated: self.candidates_evaluated.load(Ordering::Relaxed),
            name_matches: self.name_matches.load(Ordering::Relaxed),
            content_matches: self.content_matches.load(Ordering::Relaxed),
            duplicates_discarded: self.duplicates_discarded.load(Ordering::Relaxed),
            files_scanned: self.files_scanned.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            skipped_binary: self.skipped_binary.load(Ordering::Relaxed),
            skipped_oversize: self.skipped_oversize.load(Ordering::Relaxed),
            unreadable_files: self.unreadable_files.load(Ordering::Relaxed),
            decode_fallbacks: self.decode_fallbacks.load(Ordering::Relaxed),
            small_files: self.small_files_read.load(Ordering::Relaxed),
            buffered_files: self.buffered_files_read.load(Ordering::Relaxed),
            mmap_files: self.mmap_files_read.load(Ordering::Relaxed),
        }
    }

    /// Logs current statistics
    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Scan stats:\n\
             Candidates evaluated: {}\n\
             Matches by name/content: {}/{}\n\
             Duplicates discarded: {}\n\
             Files scanned: {} ({} bytes)\n\
             Skipped binary/oversize/unreadable: {}/{}/{}\n\
             Decode fallbacks: {}\n\
             Files read (small/buffered/mmap): {}/{}/{}",
            stats.candidates_evaluated,
            stats.name_matches,
            stats.content_matches,
            stats.duplicates_discarded,
            stats.files_scanned,
            stats.bytes_read,
            stats.skipped_binary,
            stats.skipped_oversize,
            stats.unreadable_files,
            stats.decode_fallbacks,
            stats.small_files,
            stats.buffered_files,
            stats.mmap_files
        );
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`ScanMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub candidates_evaluated: u64,
    pub name_matches: u64,
    pub content_matches: u64,
    pub duplicates_discarded: u64,
    pub files_scanned: u64,
    pub bytes_read: u64,
    pub skipped_binary: u64,
    pub skipped_oversize: u64,
    pub unreadable_files: u64,
    pub decode_fallbacks: u64,
    pub small_files: u64,
    pub buffered_files: u64,
    pub mmap_files: u64,
}
