use std::collections::{BTreeMap, VecDeque};

const ROOT: usize = 0;

/// Canonical form of a keyword set: empties dropped, deduplicated, sorted.
///
/// Two sets built from the same keywords in any order compare equal, which is
/// what the automaton cache keys on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PatternSet {
    patterns: Vec<String>,
}

impl PatternSet {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut patterns: Vec<String> = patterns
            .into_iter()
            .map(Into::into)
            .filter(|p| !p.is_empty())
            .collect();
        patterns.sort_unstable();
        patterns.dedup();
        Self { patterns }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    children: BTreeMap<u8, usize>,
    failure: usize,
    /// Pattern indices ending here, including those inherited through the
    /// failure chain.
    outputs: Vec<usize>,
}

/// Multi-pattern matcher: a trie over the pattern set with failure links and
/// merged output sets.
#[derive(Debug, Clone)]
pub struct Automaton {
    nodes: Vec<Node>,
    patterns: PatternSet,
}

impl Automaton {
    /// Builds the automaton for `patterns`
    pub fn new(patterns: PatternSet) -> Self {
        let mut automaton = Self {
            nodes: vec![Node::default()],
            patterns,
        };
        automaton.build_trie();
        automaton.build_failure_links();
        automaton
    }

    /// The pattern set this automaton was built from
    pub fn pattern_set(&self) -> &PatternSet {
        &self.patterns
    }

    /// Number of trie nodes, root included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn build_trie(&mut self) {
        for (index, pattern) in self.patterns.patterns.iter().enumerate() {
            let mut node = ROOT;
            for &byte in pattern.as_bytes() {
                node = match self.nodes[node].children.get(&byte) {
                    Some(&child) => child,
                    None => {
                        let child = self.nodes.len();
                        self.nodes.push(Node::default());
                        self.nodes[node].children.insert(byte, child);
                        child
                    }
                };
            }
            self.nodes[node].outputs.push(index);
        }
    }

    fn build_failure_links(&mut self) {
        let mut queue: VecDeque<usize> = self.nodes[ROOT].children.values().copied().collect();

        while let Some(current) = queue.pop_front() {
            let edges: Vec<(u8, usize)> = self.nodes[current]
                .children
                .iter()
                .map(|(&byte, &child)| (byte, child))
                .collect();

            for (byte, child) in edges {
                queue.push_back(child);

                let mut candidate = self.nodes[current].failure;
                while candidate != ROOT && !self.nodes[candidate].children.contains_key(&byte) {
                    candidate = self.nodes[candidate].failure;
                }
                let failure = self.nodes[candidate]
                    .children
                    .get(&byte)
                    .copied()
                    .unwrap_or(ROOT);
                self.nodes[child].failure = failure;

                // The failure target is shallower, so its outputs are already closed
                let inherited = self.nodes[failure].outputs.clone();
                let outputs = &mut self.nodes[child].outputs;
                outputs.extend(inherited);
                outputs.sort_unstable();
                outputs.dedup();
            }
        }
    }

    fn step(&self, mut state: usize, byte: u8) -> usize {
        loop {
            if let Some(&next) = self.nodes[state].children.get(&byte) {
                return next;
            }
            if state == ROOT {
                return ROOT;
            }
            state = self.nodes[state].failure;
        }
    }

    /// Scans `text` once and reports, for every pattern with at least one
    /// hit, its start offsets in ascending order.
    pub fn search(&self, text: &str) -> BTreeMap<String, Vec<usize>> {
        if self.patterns.is_empty() {
            return BTreeMap::new();
        }

        let mut hits: Vec<Vec<usize>> = vec![Vec::new(); self.patterns.len()];
        let mut state = ROOT;
        for (i, &byte) in text.as_bytes().iter().enumerate() {
            state = self.step(state, byte);
            for &index in &self.nodes[state].outputs {
                let len = self.patterns.patterns[index].len();
                hits[index].push(i + 1 - len);
            }
        }

        // Each (position, pattern) pair is reported once, so the lists are
        // already sorted and free of duplicates.
        self.patterns
            .patterns
            .iter()
            .zip(hits)
            .filter(|(_, starts)| !starts.is_empty())
            .map(|(pattern, starts)| (pattern.clone(), starts))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::kmp;

    fn automaton(patterns: &[&str]) -> Automaton {
        Automaton::new(PatternSet::new(patterns.iter().copied()))
    }

    #[test]
    fn test_pattern_set_is_canonical() {
        let a = PatternSet::new(["b", "a", "", "a"]);
        let b = PatternSet::new(["a", "b"]);
        assert_eq!(a, b);
        assert_eq!(a.patterns(), &["a".to_string(), "b".to_string()]);
        assert!(PatternSet::new([""]).is_empty());
    }

    #[test]
    fn test_classic_dictionary() {
        let ac = automaton(&["he", "she", "his", "hers"]);
        let hits = ac.search("ushers");
        assert_eq!(hits.get("she"), Some(&vec![1]));
        assert_eq!(hits.get("he"), Some(&vec![2]));
        assert_eq!(hits.get("hers"), Some(&vec![2]));
        assert_eq!(hits.get("his"), None);
    }

    #[test]
    fn test_suffix_outputs_are_inherited() {
        let ac = automaton(&["java", "ava", "va"]);
        let hits = ac.search("javascript");
        assert_eq!(hits.get("java"), Some(&vec![0]));
        assert_eq!(hits.get("ava"), Some(&vec![1]));
        assert_eq!(hits.get("va"), Some(&vec![2]));
    }

    #[test]
    fn test_overlapping_matches() {
        let ac = automaton(&["aa"]);
        assert_eq!(ac.search("aaaa").get("aa"), Some(&vec![0, 1, 2]));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(automaton(&[]).search("anything").is_empty());
        assert!(automaton(&[""]).search("anything").is_empty());
        assert!(automaton(&["a"]).search("").is_empty());
        assert_eq!(automaton(&[]).node_count(), 1);
    }

    #[test]
    fn test_agrees_with_kmp() {
        let patterns = ["sql", "python", "py", "on", "data", "database", "a", "base"];
        let text = "python developer with sql, mysql and postgres database experience; \
                    data pipelines in python. base salary negotiable";
        let hits = automaton(&patterns).search(text);
        for pattern in patterns {
            let expected = kmp::search(text, pattern);
            let actual = hits.get(pattern).cloned().unwrap_or_default();
            assert_eq!(actual, expected, "pattern={pattern:?}");
        }
    }
}
