use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::trace;

use super::matcher::MatchStrategy;
use crate::metrics::SearchMetrics;
use crate::results::{DocumentExactResult, DocumentFuzzyResult};
use crate::similarity;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("word regex is valid"));

/// Splits `text` into word tokens on word boundaries
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    WORD.find_iter(text).map(|m| m.as_str())
}

/// Highest similarity `a` and `b` could reach given only their lengths
fn similarity_upper_bound(a_len: usize, b_len: usize) -> f64 {
    let max_len = a_len.max(b_len);
    if max_len == 0 {
        return 100.0;
    }
    (1.0 - a_len.abs_diff(b_len) as f64 / max_len as f64) * 100.0
}

/// Scans single documents for one search call.
///
/// Holds only read-only state, so one processor is shared by every worker.
#[derive(Debug)]
pub struct DocumentProcessor<'a> {
    strategy: &'a MatchStrategy,
    keywords: &'a [String],
    metrics: &'a SearchMetrics,
}

impl<'a> DocumentProcessor<'a> {
    pub fn new(
        strategy: &'a MatchStrategy,
        keywords: &'a [String],
        metrics: &'a SearchMetrics,
    ) -> Self {
        Self {
            strategy,
            keywords,
            metrics,
        }
    }

    /// Counts keyword occurrences in one case-folded document.
    ///
    /// Returns `None` when nothing matched, along with the time spent.
    pub fn exact_scan(&self, doc_id: &str, text: &str) -> (Option<DocumentExactResult>, Duration) {
        let start = Instant::now();
        let result = self.strategy.count_matches(doc_id, text, self.keywords);
        let elapsed = start.elapsed();

        self.metrics.record_document();
        trace!("{}: {} exact occurrences", doc_id, result.total);
        ((!result.is_empty()).then_some(result), elapsed)
    }

    /// Scores every unmatched keyword against the document's tokens and
    /// keeps the best score per keyword if it reaches `threshold`.
    ///
    /// Returns `None` when no keyword qualified, along with the time spent.
    pub fn fuzzy_scan(
        &self,
        doc_id: &str,
        text: &str,
        unmatched: &[String],
        threshold: f64,
    ) -> (Option<DocumentFuzzyResult>, Duration) {
        let start = Instant::now();
        let tokens: HashSet<&str> = tokenize(text).collect();
        let tokens: Vec<(&str, usize)> = tokens
            .into_iter()
            .map(|token| (token, token.chars().count()))
            .collect();

        let mut result = DocumentFuzzyResult::new(doc_id);
        let mut comparisons = 0u64;

        for keyword in unmatched {
            let keyword_len = keyword.chars().count();
            let mut best = 0.0f64;

            for &(token, token_len) in &tokens {
                let bound = similarity_upper_bound(keyword_len, token_len);
                if bound < threshold || bound <= best {
                    continue;
                }
                comparisons += 1;
                best = best.max(similarity::similarity_percentage(keyword, token));
            }

            if best > 0.0 && best >= threshold {
                result.add(keyword, best);
            }
        }

        let elapsed = start.elapsed();
        self.metrics.record_token_comparisons(comparisons);
        trace!(
            "{}: {} fuzzy keywords qualified after {} comparisons",
            doc_id,
            result.scores.len(),
            comparisons
        );
        ((!result.is_empty()).then_some(result), elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_tokenize() {
        let tokens: Vec<&str> = tokenize("c++, node.js & sql_server (2019)").collect();
        assert_eq!(tokens, vec!["c", "node", "js", "sql_server", "2019"]);
        assert_eq!(tokenize("").count(), 0);
    }

    #[test]
    fn test_upper_bound_never_underestimates() {
        for (a, b) in [("node", "nodes"), ("java", "javascript"), ("", "x"), ("abc", "abd")] {
            let bound = similarity_upper_bound(a.chars().count(), b.chars().count());
            assert!(bound >= similarity::similarity_percentage(a, b));
        }
    }

    #[test]
    fn test_exact_scan() {
        let metrics = SearchMetrics::new();
        let keywords = words(&["java", "sql"]);
        let processor = DocumentProcessor::new(&MatchStrategy::Kmp, &keywords, &metrics);

        let (hit, _) = processor.exact_scan("d1", "java and sql and java");
        let hit = hit.unwrap();
        assert_eq!(hit.total, 3);
        assert_eq!(hit.counts.get("java"), Some(&2));

        let (miss, _) = processor.exact_scan("d2", "python react");
        assert!(miss.is_none());
        assert_eq!(metrics.get_stats().documents_scanned, 2);
    }

    #[test]
    fn test_fuzzy_scan_respects_threshold() {
        let metrics = SearchMetrics::new();
        let keywords = words(&["pyhton"]);
        let processor = DocumentProcessor::new(&MatchStrategy::Kmp, &keywords, &metrics);
        let unmatched = words(&["pyhton", "node"]);

        // "pyhton" vs "python" is two substitutions out of six: 66.67%
        let (result, _) = processor.fuzzy_scan("d1", "python react", &unmatched, 60.0);
        let result = result.unwrap();
        let score = result.scores["pyhton"];
        assert!((score - 66.666).abs() < 0.01, "got {score}");
        assert!(!result.scores.contains_key("node"));
        assert_eq!(result.highest, score);

        let (result, _) = processor.fuzzy_scan("d1", "python react", &unmatched, 80.0);
        assert!(result.is_none());
    }

    #[test]
    fn test_fuzzy_scan_keeps_best_token() {
        let metrics = SearchMetrics::new();
        let processor = DocumentProcessor::new(&MatchStrategy::Kmp, &[], &metrics);
        let unmatched = words(&["postgres"]);

        let (result, _) =
            processor.fuzzy_scan("d1", "postgre mysql postgresql", &unmatched, 50.0);
        let score = result.unwrap().scores["postgres"];
        // "postgre" is one deletion away: 7/8
        assert!((score - 87.5).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn test_fuzzy_scan_empty_document() {
        let metrics = SearchMetrics::new();
        let processor = DocumentProcessor::new(&MatchStrategy::Kmp, &[], &metrics);
        let (result, _) = processor.fuzzy_scan("d1", "", &words(&["node"]), 0.0);
        assert!(result.is_none());
    }
}
