use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Counters shared across search calls and worker threads
#[derive(Debug, Clone)]
pub struct SearchMetrics {
    // Automaton cache metrics
    automaton_builds: Arc<AtomicU64>,
    automaton_cache_hits: Arc<AtomicU64>,

    // Scan metrics
    documents_scanned: Arc<AtomicU64>,
    tokens_compared: Arc<AtomicU64>,
    searches: Arc<AtomicU64>,
}

impl SearchMetrics {
    /// Creates a new SearchMetrics instance
    pub fn new() -> Self {
        Self {
            automaton_builds: Arc::new(AtomicU64::new(0)),
            automaton_cache_hits: Arc::new(AtomicU64::new(0)),
            documents_scanned: Arc::new(AtomicU64::new(0)),
            tokens_compared: Arc::new(AtomicU64::new(0)),
            searches: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records an automaton lookup: a reuse if `hit`, otherwise a fresh build
    pub fn record_automaton(&self, hit: bool, node_count: usize) {
        if hit {
            self.automaton_cache_hits.fetch_add(1, Ordering::Relaxed);
        } else {
            let builds = self.automaton_builds.fetch_add(1, Ordering::Relaxed) + 1;
            debug!("Automaton built with {} nodes (build #{})", node_count, builds);
        }
    }

    pub fn record_document(&self) {
        self.documents_scanned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_token_comparisons(&self, count: u64) {
        self.tokens_compared.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_search(&self) {
        self.searches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn automaton_builds(&self) -> u64 {
        self.automaton_builds.load(Ordering::Relaxed)
    }

    pub fn automaton_cache_hits(&self) -> u64 {
        self.automaton_cache_hits.load(Ordering::Relaxed)
    }

    /// Gets a snapshot of all counters
    pub fn get_stats(&self) -> SearchStats {
        SearchStats {
            automaton_builds: self.automaton_builds.load(Ordering::Relaxed),
            automaton_cache_hits: self.automaton_cache_hits.load(Ordering::Relaxed),
            documents_scanned: self.documents_scanned.load(Ordering::Relaxed),
            tokens_compared: self.tokens_compared.load(Ordering::Relaxed),
            searches: self.searches.load(Ordering::Relaxed),
        }
    }

    /// Logs current counters
    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Search stats:\n\
             Searches: {}\n\
             Automaton builds/reuses: {}/{}\n\
             Documents scanned: {}\n\
             Fuzzy token comparisons: {}",
            stats.searches,
            stats.automaton_builds,
            stats.automaton_cache_hits,
            stats.documents_scanned,
            stats.tokens_compared
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
    pub automaton_builds: u64,
    pub automaton_cache_hits: u64,
    pub documents_scanned: u64,
    pub tokens_compared: u64,
    pub searches: u64,
}
