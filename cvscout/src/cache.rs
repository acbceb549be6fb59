use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, trace};

use crate::matching::{Automaton, PatternSet};
use crate::metrics::SearchMetrics;

/// Holds the automaton for the most recently used pattern set.
///
/// The lookup and the possible rebuild happen under one lock, so concurrent
/// callers asking for the same set trigger at most one build. A different
/// set replaces the cached automaton; searches still holding the old `Arc`
/// keep using it until they finish.
#[derive(Debug, Default)]
pub struct AutomatonCache {
    slot: Mutex<Option<Arc<Automaton>>>,
    metrics: SearchMetrics,
}

impl AutomatonCache {
    pub fn new() -> Self {
        Self::with_metrics(SearchMetrics::new())
    }

    pub fn with_metrics(metrics: SearchMetrics) -> Self {
        Self {
            slot: Mutex::new(None),
            metrics,
        }
    }

    pub fn metrics(&self) -> &SearchMetrics {
        &self.metrics
    }

    /// Returns the automaton for `patterns`, building it only if the cached
    /// one was built from a different set.
    pub fn get_or_build(&self, patterns: PatternSet) -> Arc<Automaton> {
        // A panic mid-build leaves the previous value intact, so a poisoned
        // lock is still safe to reuse.
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(cached) = slot.as_ref() {
            if cached.pattern_set() == &patterns {
                trace!("Reusing automaton for {} patterns", patterns.len());
                self.metrics.record_automaton(true, cached.node_count());
                return Arc::clone(cached);
            }
        }

        debug!("Building automaton for patterns: {:?}", patterns.patterns());
        let automaton = Arc::new(Automaton::new(patterns));
        self.metrics.record_automaton(false, automaton.node_count());
        *slot = Some(Arc::clone(&automaton));
        automaton
    }

    /// Drops the cached automaton
    pub fn clear(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
