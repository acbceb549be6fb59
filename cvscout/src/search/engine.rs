use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::matcher::{Algorithm, MatchStrategy};
use super::processor::DocumentProcessor;
use crate::cache::AutomatonCache;
use crate::config::SearchConfig;
use crate::corpus::Corpus;
use crate::errors::{SearchError, SearchResult};
use crate::matching::PatternSet;
use crate::metrics::SearchMetrics;
use crate::results::{DocumentExactResult, DocumentFuzzyResult, DocumentMatch, SearchOutcome};

/// Lowercases, drops empties and deduplicates, keeping first-seen order
pub fn normalize_keywords<S: AsRef<str>>(keywords: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    keywords
        .iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.clone()))
        .collect()
}

/// Checks that a fuzzy threshold is a number in `[0, 100]`
pub fn validate_threshold(threshold: f64) -> SearchResult<f64> {
    if (0.0..=100.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(SearchError::InvalidThreshold(threshold))
    }
}

/// Resolves the threshold the fuzzy phase runs with: out-of-range values are
/// clamped, NaN disables the phase.
fn effective_threshold(threshold: Option<f64>) -> Option<f64> {
    let threshold = threshold?;
    match validate_threshold(threshold) {
        Ok(t) => Some(t),
        Err(err) if threshold.is_nan() => {
            warn!("{}. Fuzzy matching disabled", err);
            None
        }
        Err(err) => {
            let clamped = threshold.clamp(0.0, 100.0);
            warn!("{}. Clamping to {}", err, clamped);
            Some(clamped)
        }
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Runs hybrid exact/fuzzy keyword searches over a corpus.
///
/// A searcher owns the automaton cache, so repeated searches with the same
/// keyword set reuse one build. It is `Sync` and can be shared between
/// threads.
pub struct Searcher {
    cache: AutomatonCache,
    metrics: SearchMetrics,
    pool: Option<rayon::ThreadPool>,
}

impl Searcher {
    /// Creates a searcher that scans on rayon's global pool
    pub fn new() -> Self {
        let metrics = SearchMetrics::new();
        Self {
            cache: AutomatonCache::with_metrics(metrics.clone()),
            metrics,
            pool: None,
        }
    }

    /// Creates a searcher with a dedicated pool of `threads` workers
    pub fn with_thread_count(threads: NonZeroUsize) -> Self {
        let mut searcher = Self::new();
        match rayon::ThreadPoolBuilder::new()
            .num_threads(threads.get())
            .build()
        {
            Ok(pool) => searcher.pool = Some(pool),
            Err(err) => warn!("Could not build thread pool ({}); using global pool", err),
        }
        searcher
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::with_thread_count(config.thread_count)
    }

    pub fn metrics(&self) -> &SearchMetrics {
        &self.metrics
    }

    /// Searches with the selector given as text; an unknown selector falls
    /// back to KMP.
    pub fn search_named<S: AsRef<str> + Sync>(
        &self,
        corpus: &Corpus,
        keywords: &[S],
        algorithm: &str,
        top_n: NonZeroUsize,
        fuzzy_threshold: Option<f64>,
    ) -> SearchOutcome {
        let algorithm = Algorithm::parse_or_default(algorithm);
        self.search(corpus, keywords, algorithm, top_n, fuzzy_threshold)
    }

    /// Ranks the corpus against `keywords`.
    ///
    /// Documents with exact hits come first, by total occurrences. Keywords
    /// with no exact hit anywhere are then scored fuzzily against document
    /// tokens if a threshold is given, and documents that only have fuzzy
    /// hits follow, by best similarity. At most `top_n` records are returned.
    pub fn search<S: AsRef<str> + Sync>(
        &self,
        corpus: &Corpus,
        keywords: &[S],
        algorithm: Algorithm,
        top_n: NonZeroUsize,
        fuzzy_threshold: Option<f64>,
    ) -> SearchOutcome {
        match &self.pool {
            Some(pool) => pool.install(|| {
                self.run(corpus, keywords, algorithm, top_n, fuzzy_threshold)
            }),
            None => self.run(corpus, keywords, algorithm, top_n, fuzzy_threshold),
        }
    }

    fn run<S: AsRef<str> + Sync>(
        &self,
        corpus: &Corpus,
        keywords: &[S],
        algorithm: Algorithm,
        top_n: NonZeroUsize,
        fuzzy_threshold: Option<f64>,
    ) -> SearchOutcome {
        self.metrics.record_search();

        let keywords = normalize_keywords(keywords);
        if keywords.is_empty() {
            debug!("No keywords provided, returning empty result");
            return SearchOutcome::new();
        }

        info!(
            "Starting exact matching with {} for keywords: {:?}",
            algorithm, keywords
        );

        // Case folding happens once, outside the timed phases
        let folded: Vec<(&str, String)> = corpus
            .documents()
            .par_iter()
            .map(|doc| (doc.id.as_str(), doc.text.to_lowercase()))
            .collect();

        let strategy = self.strategy_for(algorithm, &keywords);
        let processor = DocumentProcessor::new(&strategy, &keywords, &self.metrics);

        // Exact phase. Collect keeps corpus order, so the stable sort below
        // breaks ties by it.
        let scans: Vec<(Option<DocumentExactResult>, Duration)> = folded
            .par_iter()
            .map(|(id, text)| processor.exact_scan(id, text))
            .collect();
        let exact_time: Duration = scans.iter().map(|(_, elapsed)| *elapsed).sum();
        let mut exact: Vec<DocumentExactResult> =
            scans.into_iter().filter_map(|(result, _)| result).collect();
        exact.sort_by(|a, b| b.total.cmp(&a.total));

        let matched: HashSet<&str> = exact
            .iter()
            .flat_map(|result| result.counts.keys().map(String::as_str))
            .collect();
        let unmatched: Vec<String> = keywords
            .iter()
            .filter(|k| !matched.contains(k.as_str()))
            .cloned()
            .collect();

        // Fuzzy phase
        let mut fuzzy: Vec<DocumentFuzzyResult> = Vec::new();
        let mut fuzzy_time = Duration::ZERO;
        match effective_threshold(fuzzy_threshold) {
            Some(threshold) if !unmatched.is_empty() => {
                info!(
                    "Starting fuzzy matching for unmatched keywords: {:?}",
                    unmatched
                );
                let scans: Vec<(Option<DocumentFuzzyResult>, Duration)> = folded
                    .par_iter()
                    .map(|(id, text)| processor.fuzzy_scan(id, text, &unmatched, threshold))
                    .collect();
                fuzzy_time = scans.iter().map(|(_, elapsed)| *elapsed).sum();
                fuzzy = scans.into_iter().filter_map(|(result, _)| result).collect();
                fuzzy.sort_by(|a, b| b.highest.total_cmp(&a.highest));
            }
            _ => debug!("Skipping fuzzy phase"),
        }

        let results = merge_ranked(exact, fuzzy, top_n);

        info!(
            "Search complete. {} of {} documents returned (exact {:.3} ms, fuzzy {:.3} ms)",
            results.len(),
            corpus.len(),
            millis(exact_time),
            millis(fuzzy_time)
        );

        SearchOutcome {
            results,
            exact_time_ms: millis(exact_time),
            fuzzy_time_ms: millis(fuzzy_time),
            documents_scanned: corpus.len(),
            unmatched_keywords: unmatched,
        }
    }

    fn strategy_for(&self, algorithm: Algorithm, keywords: &[String]) -> MatchStrategy {
        match algorithm {
            Algorithm::Kmp => MatchStrategy::Kmp,
            Algorithm::BoyerMoore => MatchStrategy::BoyerMoore,
            Algorithm::AhoCorasick => MatchStrategy::AhoCorasick(
                self.cache
                    .get_or_build(PatternSet::new(keywords.iter().cloned())),
            ),
        }
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Exact-ranked documents first, then fuzzy-only ones, capped at `top_n`.
///
/// A document present in both lists keeps its exact rank and carries its
/// fuzzy scores along.
fn merge_ranked(
    exact: Vec<DocumentExactResult>,
    fuzzy: Vec<DocumentFuzzyResult>,
    top_n: NonZeroUsize,
) -> Vec<DocumentMatch> {
    let exact_ids: HashSet<String> = exact.iter().map(|r| r.doc_id.clone()).collect();
    let (shared, fuzzy_only): (Vec<_>, Vec<_>) = fuzzy
        .into_iter()
        .partition(|r| exact_ids.contains(&r.doc_id));
    let mut shared: HashMap<String, DocumentFuzzyResult> = shared
        .into_iter()
        .map(|r| (r.doc_id.clone(), r))
        .collect();

    exact
        .into_iter()
        .map(|r| {
            let fuzzy = shared.remove(&r.doc_id);
            DocumentMatch::from_exact(r).with_fuzzy(fuzzy)
        })
        .chain(fuzzy_only.into_iter().map(DocumentMatch::from_fuzzy))
        .take(top_n.get())
        .collect()
}

/// Runs a one-shot search over `corpus` as described by `config`
pub fn search(corpus: &Corpus, config: &SearchConfig) -> SearchOutcome {
    let searcher = Searcher::from_config(config);
    let outcome = searcher.search_named(
        corpus,
        &config.keywords,
        &config.algorithm,
        config.top_n,
        config.fuzzy_threshold,
    );
    searcher.metrics().log_stats();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn sample_corpus() -> Corpus {
        [
            ("d1", "java spring database"),
            ("d2", "python react"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_normalize_keywords() {
        let normalized = normalize_keywords(&["Java", " SQL ", "", "  ", "java", "Node"]);
        assert_eq!(normalized, vec!["java", "sql", "node"]);
    }

    #[test]
    fn test_effective_threshold() {
        assert_eq!(effective_threshold(None), None);
        assert_eq!(effective_threshold(Some(80.0)), Some(80.0));
        assert_eq!(effective_threshold(Some(150.0)), Some(100.0));
        assert_eq!(effective_threshold(Some(-5.0)), Some(0.0));
        assert_eq!(effective_threshold(Some(f64::NAN)), None);
        assert!(validate_threshold(100.5).is_err());
    }

    #[test]
    fn test_reference_scenario() {
        for algorithm in Algorithm::ALL {
            let outcome = Searcher::new().search(
                &sample_corpus(),
                &["java", "node"],
                algorithm,
                top(10),
                Some(80.0),
            );
            assert_eq!(outcome.results.len(), 1, "{algorithm}");
            let d1 = &outcome.results[0];
            assert_eq!(d1.doc_id, "d1");
            assert_eq!(d1.exact_counts.get("java"), Some(&1));
            assert_eq!(d1.total_exact, 1);
            assert!(d1.fuzzy_scores.is_empty());
            assert_eq!(outcome.unmatched_keywords, vec!["node"]);
        }
    }

    #[test]
    fn test_empty_inputs() {
        let searcher = Searcher::new();
        let empty: [&str; 0] = [];
        let outcome = searcher.search(&sample_corpus(), &empty, Algorithm::Kmp, top(5), Some(80.0));
        assert!(outcome.is_empty());
        assert_eq!(outcome.exact_time_ms, 0.0);
        assert_eq!(outcome.fuzzy_time_ms, 0.0);

        let outcome = searcher.search(&Corpus::new(), &["java"], Algorithm::AhoCorasick, top(5), Some(80.0));
        assert!(outcome.is_empty());
        assert_eq!(outcome.fuzzy_time_ms, 0.0);
    }

    #[test]
    fn test_text_is_case_folded() {
        let corpus: Corpus = [("d1", "Senior JAVA Engineer, Java")].into_iter().collect();
        let outcome = Searcher::new().search(&corpus, &["jAvA"], Algorithm::BoyerMoore, top(5), None);
        assert_eq!(outcome.results[0].exact_counts.get("java"), Some(&2));
    }

    #[test]
    fn test_fuzzy_fallback_ranks_after_exact() {
        let corpus: Corpus = [
            ("exact", "kotlin and kotlin"),
            ("one_edit", "pythn developer"),
            ("two_edits", "pyhton developer"),
            ("none", "graphic design"),
        ]
        .into_iter()
        .collect();

        let outcome = Searcher::new().search(
            &corpus,
            &["kotlin", "python"],
            Algorithm::Kmp,
            top(10),
            Some(60.0),
        );

        let ids: Vec<&str> = outcome.results.iter().map(|r| r.doc_id.as_str()).collect();
        // "pythn" is one deletion away (83.3%), "pyhton" two substitutions (66.7%)
        assert_eq!(ids, vec!["exact", "one_edit", "two_edits"]);
        assert_eq!(outcome.results[0].total_exact, 2);
        assert_eq!(outcome.results[1].total_exact, 0);
        assert!(outcome.results[1].highest_fuzzy > outcome.results[2].highest_fuzzy);
    }

    #[test]
    fn test_exact_document_carries_fuzzy_scores() {
        let corpus: Corpus = [("d1", "java and nodejs"), ("d2", "java java")].into_iter().collect();
        let outcome =
            Searcher::new().search(&corpus, &["java", "node"], Algorithm::Kmp, top(10), Some(60.0));
        // "node" occurs inside "nodejs", so it is matched exactly
        assert!(outcome.unmatched_keywords.is_empty());

        let corpus: Corpus = [("d1", "java and nodes"), ("d2", "java java")].into_iter().collect();
        let outcome =
            Searcher::new().search(&corpus, &["java", "noda"], Algorithm::Kmp, top(10), Some(60.0));
        let ids: Vec<&str> = outcome.results.iter().map(|r| r.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["d2", "d1"]);
        assert!(outcome.results[0].fuzzy_scores.is_empty());
        assert_eq!(outcome.results[1].fuzzy_scores.get("noda"), Some(&60.0));
    }

    #[test]
    fn test_top_n_caps_across_phases() {
        let corpus: Corpus = (0..6)
            .map(|i| {
                let text = if i % 2 == 0 { "rust rust" } else { "rusty" };
                (format!("d{i}"), text.to_string())
            })
            .collect();

        for n in 1..=7 {
            let outcome =
                Searcher::new().search(&corpus, &["rust", "rustx"], Algorithm::Kmp, top(n), Some(50.0));
            assert!(outcome.results.len() <= n);
        }
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let corpus: Corpus = [("c", "sql"), ("a", "sql"), ("b", "sql sql"), ("d", "sql")]
            .into_iter()
            .collect();
        let outcome = Searcher::with_thread_count(top(4)).search(
            &corpus,
            &["sql"],
            Algorithm::AhoCorasick,
            top(10),
            None,
        );
        let ids: Vec<&str> = outcome.results.iter().map(|r| r.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_keyword_matched_outside_top_n_is_not_unmatched() {
        let corpus: Corpus = [("d1", "java java spring"), ("d2", "python scripts")]
            .into_iter()
            .collect();

        for algorithm in Algorithm::ALL {
            let outcome =
                Searcher::new().search(&corpus, &["java", "python"], algorithm, top(1), Some(80.0));
            assert_eq!(outcome.results.len(), 1, "{algorithm}");
            assert_eq!(outcome.results[0].doc_id, "d1");
            assert!(outcome.unmatched_keywords.is_empty());
            assert_eq!(outcome.fuzzy_time_ms, 0.0);
        }
    }

    #[test]
    fn test_no_threshold_skips_fuzzy() {
        let outcome = Searcher::new().search(&sample_corpus(), &["pythn"], Algorithm::Kmp, top(10), None);
        assert!(outcome.is_empty());
        assert_eq!(outcome.fuzzy_time_ms, 0.0);
        assert_eq!(outcome.unmatched_keywords, vec!["pythn"]);
    }

    #[test]
    fn test_automaton_reused_across_searches() {
        let searcher = Searcher::new();
        let corpus = sample_corpus();
        searcher.search(&corpus, &["java", "react"], Algorithm::AhoCorasick, top(10), None);
        searcher.search(&corpus, &["React", "JAVA"], Algorithm::AhoCorasick, top(10), None);
        assert_eq!(searcher.metrics().automaton_builds(), 1);

        searcher.search(&corpus, &["go"], Algorithm::AhoCorasick, top(10), None);
        assert_eq!(searcher.metrics().automaton_builds(), 2);
    }

    #[test]
    fn test_unknown_selector_defaults_to_kmp() {
        let outcome = Searcher::new().search_named(
            &sample_corpus(),
            &["python"],
            "rabin-karp",
            top(10),
            None,
        );
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].doc_id, "d2");
    }

    #[test]
    fn test_search_from_config() {
        let config = SearchConfig {
            keywords: vec!["react".to_string()],
            algorithm: "boyer-moore".to_string(),
            thread_count: top(2),
            ..SearchConfig::default()
        };
        let outcome = search(&sample_corpus(), &config);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].doc_id, "d2");
    }
}
