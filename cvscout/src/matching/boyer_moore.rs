/// Bad-character table: the rightmost index of each byte in the pattern, or
/// `None` if the byte never occurs.
pub fn last_occurrence_table(pattern: &[u8]) -> [Option<usize>; 256] {
    let mut table = [None; 256];
    for (i, &byte) in pattern.iter().enumerate() {
        table[byte as usize] = Some(i);
    }
    table
}

/// Finds every start offset of `pattern` in `text` using the bad-character
/// heuristic only.
///
/// Worst case is O(n·m), but the reported occurrence set is always the same
/// as [`super::kmp::search`].
pub fn search(text: &str, pattern: &str) -> Vec<usize> {
    let text = text.as_bytes();
    let pattern = pattern.as_bytes();
    let (n, m) = (text.len(), pattern.len());
    if m == 0 || n == 0 || m > n {
        return Vec::new();
    }

    let last = last_occurrence_table(pattern);
    let last_of = |byte: u8, default: isize| -> isize {
        last[byte as usize].map_or(default, |i| i as isize)
    };

    let mut occurrences = Vec::new();
    let mut s = 0;

    while s <= n - m {
        // Compare right to left; `j` ends as the number of unmatched bytes
        let mut j = m;
        while j > 0 && pattern[j - 1] == text[s + j - 1] {
            j -= 1;
        }

        if j == 0 {
            occurrences.push(s);
            let shift = match text.get(s + m) {
                Some(&next) => m as isize - last_of(next, m as isize),
                None => 1,
            };
            s += shift.max(1) as usize;
        } else {
            let mismatch = j - 1;
            let shift = mismatch as isize - last_of(text[s + mismatch], -1);
            s += shift.max(1) as usize;
        }
    }

    occurrences
}
