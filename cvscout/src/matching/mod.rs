//! Exact string matching engines.
//!
//! All engines work on the UTF-8 bytes of their inputs and report byte
//! offsets. A valid UTF-8 pattern can only match a valid UTF-8 text at a
//! character boundary, so every reported offset can be used to slice the
//! text directly.
//!
//! - [`kmp`]: single pattern, prefix-function table, O(n + m)
//! - [`boyer_moore`]: single pattern, bad-character heuristic only
//! - [`aho_corasick`]: many patterns in one pass over the text
pub mod aho_corasick;
pub mod boyer_moore;
pub mod kmp;

pub use aho_corasick::{Automaton, PatternSet};
