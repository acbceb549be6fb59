use serde::Serialize;
use std::collections::BTreeMap;

/// Exact-phase evidence for one document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentExactResult {
    pub doc_id: String,
    /// Occurrence count per matched keyword
    pub counts: BTreeMap<String, usize>,
    pub total: usize,
}

impl DocumentExactResult {
    pub fn new(doc_id: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            ..Default::default()
        }
    }

    pub fn add(&mut self, keyword: &str, occurrences: usize) {
        if occurrences > 0 {
            *self.counts.entry(keyword.to_string()).or_default() += occurrences;
            self.total += occurrences;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Fuzzy-phase evidence for one document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentFuzzyResult {
    pub doc_id: String,
    /// Best similarity per unmatched keyword, only for scores at or above the
    /// threshold
    pub scores: BTreeMap<String, f64>,
    pub highest: f64,
}

impl DocumentFuzzyResult {
    pub fn new(doc_id: impl Into<String>) -> Self {
        Self {
            doc_id: doc_id.into(),
            ..Default::default()
        }
    }

    pub fn add(&mut self, keyword: &str, similarity: f64) {
        self.scores.insert(keyword.to_string(), similarity);
        if similarity > self.highest {
            self.highest = similarity;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// One ranked document in the final output
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DocumentMatch {
    pub doc_id: String,
    pub exact_counts: BTreeMap<String, usize>,
    pub total_exact: usize,
    pub fuzzy_scores: BTreeMap<String, f64>,
    pub highest_fuzzy: f64,
}

impl DocumentMatch {
    pub fn from_exact(exact: DocumentExactResult) -> Self {
        Self {
            doc_id: exact.doc_id,
            exact_counts: exact.counts,
            total_exact: exact.total,
            ..Default::default()
        }
    }

    pub fn from_fuzzy(fuzzy: DocumentFuzzyResult) -> Self {
        Self {
            doc_id: fuzzy.doc_id,
            fuzzy_scores: fuzzy.scores,
            highest_fuzzy: fuzzy.highest,
            ..Default::default()
        }
    }

    /// Attaches fuzzy evidence without changing the exact fields
    pub fn with_fuzzy(mut self, fuzzy: Option<DocumentFuzzyResult>) -> Self {
        if let Some(fuzzy) = fuzzy {
            self.fuzzy_scores = fuzzy.scores;
            self.highest_fuzzy = fuzzy.highest;
        }
        self
    }
}

/// Ranked results of one search plus the time spent in each phase
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SearchOutcome {
    pub results: Vec<DocumentMatch>,
    /// Time spent scanning for exact matches, in milliseconds
    pub exact_time_ms: f64,
    /// Time spent in fuzzy scoring, in milliseconds; zero if skipped
    pub fuzzy_time_ms: f64,
    /// Number of documents scanned
    pub documents_scanned: usize,
    /// Keywords with no exact occurrence anywhere in the corpus
    pub unmatched_keywords: Vec<String>,
}

impl SearchOutcome {
    /// Creates an empty outcome with zero timings
    pub fn new() -> Self {
        Default::default()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
