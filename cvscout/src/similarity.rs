/// Levenshtein edit distance between `a` and `b`, counted in characters.
///
/// Unit cost for insertion, deletion and substitution. Uses a single rolling
/// row sized by the shorter string.
pub fn distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return long.len();
    }

    let mut row: Vec<usize> = (0..=short.len()).collect();
    for (i, &lc) in long.iter().enumerate() {
        // `diagonal` holds the previous row's value at j - 1
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, &sc) in short.iter().enumerate() {
            let above = row[j + 1];
            let substitution = diagonal + usize::from(lc != sc);
            row[j + 1] = substitution.min(above + 1).min(row[j] + 1);
            diagonal = above;
        }
    }

    row[short.len()]
}

/// Similarity of `a` and `b` as a percentage in `[0, 100]`.
///
/// Defined as `(1 - distance / max_len) * 100`; two empty strings are fully
/// similar.
pub fn similarity_percentage(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 100.0;
    }
    (1.0 - distance(a, b) as f64 / max_len as f64) * 100.0
}
