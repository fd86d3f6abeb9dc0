use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Counters for search activity on one filesystem instance
#[derive(Debug, Clone)]
pub struct SearchMetrics {
    queries: Arc<AtomicU64>,
    files_reported: Arc<AtomicU64>,
    matches_reported: Arc<AtomicU64>,
    cancelled_searches: Arc<AtomicU64>,
    documents_opened: Arc<AtomicU64>,
}

impl SearchMetrics {
    /// Creates a new SearchMetrics instance
    pub fn new() -> Self {
        Self {
            queries: Arc::new(AtomicU64::new(0)),
            files_reported: Arc::new(AtomicU64::new(0)),
            matches_reported: Arc::new(AtomicU64::new(0)),
            cancelled_searches: Arc::new(AtomicU64::new(0)),
            documents_opened: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    /// Records that reporting started for a matching file
    pub fn record_file(&self) {
        self.files_reported.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_match(&self) {
        self.matches_reported.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cancellation(&self) {
        self.cancelled_searches.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a document cache miss
    pub fn record_document_open(&self) {
        self.documents_opened.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets current statistics
    pub fn get_stats(&self) -> SearchStats {
        SearchStats {
            queries: self.queries.load(Ordering::Relaxed),
            files_reported: self.files_reported.load(Ordering::Relaxed),
            matches_reported: self.matches_reported.load(Ordering::Relaxed),
            cancelled_searches: self.cancelled_searches.load(Ordering::Relaxed),
            documents_opened: self.documents_opened.load(Ordering::Relaxed),
        }
    }

    /// Logs current statistics
    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Search stats:\n\
             Queries: {}\n\
             Files/matches reported: {}/{}\n\
             Cancelled searches: {}\n\
             Documents opened: {}",
            stats.queries,
            stats.files_reported,
            stats.matches_reported,
            stats.cancelled_searches,
            stats.documents_opened
        );
    }
}

impl Default for SearchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of [`SearchMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    pub queries: u64,
    pub files_reported: u64,
    pub matches_reported: u64,
    pub cancelled_searches: u64,
    pub documents_opened: u64,
}
