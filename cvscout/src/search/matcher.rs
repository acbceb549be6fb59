use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

use crate::errors::SearchError;
use crate::matching::{boyer_moore, kmp, Automaton};
use crate::results::DocumentExactResult;

/// Exact matching algorithm selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    #[default]
    Kmp,
    BoyerMoore,
    AhoCorasick,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Kmp, Algorithm::BoyerMoore, Algorithm::AhoCorasick];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Kmp => "kmp",
            Algorithm::BoyerMoore => "boyer-moore",
            Algorithm::AhoCorasick => "aho-corasick",
        }
    }

    /// Parses a selector, falling back to KMP with a warning if it is not
    /// recognized.
    pub fn parse_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|err: SearchError| {
            warn!("{}. Defaulting to {}", err, Algorithm::default());
            Algorithm::default()
        })
    }
}

impl FromStr for Algorithm {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kmp" => Ok(Algorithm::Kmp),
            "boyer-moore" | "bm" => Ok(Algorithm::BoyerMoore),
            "aho-corasick" | "ac" => Ok(Algorithm::AhoCorasick),
            _ => Err(SearchError::unrecognized_algorithm(s)),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact engine chosen for one search, with whatever state it needs
#[derive(Debug, Clone)]
pub enum MatchStrategy {
    Kmp,
    BoyerMoore,
    /// Built for the full keyword set of the search
    AhoCorasick(Arc<Automaton>),
}

impl MatchStrategy {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            MatchStrategy::Kmp => Algorithm::Kmp,
            MatchStrategy::BoyerMoore => Algorithm::BoyerMoore,
            MatchStrategy::AhoCorasick(_) => Algorithm::AhoCorasick,
        }
    }

    /// Start offsets of every keyword found in `text`.
    ///
    /// The single-pattern engines run once per keyword; the automaton scans
    /// the text once for its whole pattern set and ignores `keywords`.
    pub fn find_matches(&self, text: &str, keywords: &[String]) -> BTreeMap<String, Vec<usize>> {
        let single: fn(&str, &str) -> Vec<usize> = match self {
            MatchStrategy::AhoCorasick(automaton) => return automaton.search(text),
            MatchStrategy::Kmp => kmp::search,
            MatchStrategy::BoyerMoore => boyer_moore::search,
        };

        keywords
            .iter()
            .filter_map(|keyword| {
                let starts = single(text, keyword);
                (!starts.is_empty()).then(|| (keyword.clone(), starts))
            })
            .collect()
    }

    /// Occurrence counts per keyword for one document
    pub fn count_matches(&self, doc_id: &str, text: &str, keywords: &[String]) -> DocumentExactResult {
        let mut result = DocumentExactResult::new(doc_id);
        for (keyword, starts) in self.find_matches(text, keywords) {
            result.add(&keyword, starts.len());
        }
        result
    }
}
