/// Hybrid exact/fuzzy keyword search over a corpus of CV texts.
///
/// A search runs in two phases over the same case-folded corpus:
///
/// 1. **Exact phase**: the selected [`MatchStrategy`] counts keyword
///    occurrences in every document. Documents with hits are ranked by total
///    occurrences; ties keep corpus order.
/// 2. **Fuzzy phase**: keywords with no exact occurrence anywhere are scored
///    against each document's word tokens by Levenshtein similarity. Only
///    scores at or above the threshold count.
///
/// The two rankings are concatenated, exact first, and capped at `top_n`.
///
/// ```rust,ignore
/// let corpus: Corpus = [("d1", "java spring database"), ("d2", "python react")]
///     .into_iter()
///     .collect();
/// let searcher = Searcher::new();
/// let outcome = searcher.search(&corpus, &["java", "node"], Algorithm::Kmp, top_n, Some(80.0));
/// assert_eq!(outcome.results[0].doc_id, "d1");
/// ```
///
/// # Parallel Processing
///
/// Each document is scanned independently with Rayon's parallel iterators;
/// the scans read only the corpus and the strategy, so no locking is needed.
/// Results are collected in corpus order and per-document scan times are
/// summed, so the outcome does not depend on which worker finished first.
pub mod engine;
pub mod matcher;
pub mod processor;

pub use engine::{normalize_keywords, search, validate_threshold, Searcher};
pub use matcher::{Algorithm, MatchStrategy};
pub use processor::{tokenize, DocumentProcessor};
