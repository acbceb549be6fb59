/// Builds the prefix function for `pattern`.
///
/// `table[i]` is the length of the longest proper prefix of `pattern[..=i]`
/// that is also a suffix of it.
pub fn prefix_table(pattern: &[u8]) -> Vec<usize> {
    let mut table = vec![0; pattern.len()];
    let mut len = 0;
    let mut i = 1;

    while i < pattern.len() {
        if pattern[i] == pattern[len] {
            len += 1;
            table[i] = len;
            i += 1;
        } else if len != 0 {
            len = table[len - 1];
        } else {
            table[i] = 0;
            i += 1;
        }
    }

    table
}

/// Finds every start offset of `pattern` in `text`, overlaps included.
///
/// Empty inputs and patterns longer than the text yield no matches.
pub fn search(text: &str, pattern: &str) -> Vec<usize> {
    let text = text.as_bytes();
    let pattern = pattern.as_bytes();
    let (n, m) = (text.len(), pattern.len());
    if m == 0 || n == 0 || m > n {
        return Vec::new();
    }

    let table = prefix_table(pattern);
    let mut occurrences = Vec::new();
    let mut j = 0;

    for (i, &byte) in text.iter().enumerate() {
        while j > 0 && byte != pattern[j] {
            j = table[j - 1];
        }
        if byte == pattern[j] {
            j += 1;
        }
        if j == m {
            occurrences.push(i + 1 - m);
            j = table[m - 1];
        }
    }

    occurrences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_table() {
        assert_eq!(prefix_table(b"aabaaab"), vec![0, 1, 0, 1, 2, 2, 3]);
        assert_eq!(prefix_table(b"abcd"), vec![0, 0, 0, 0]);
        assert_eq!(prefix_table(b"aaaa"), vec![0, 1, 2, 3]);
        assert!(prefix_table(b"").is_empty());
    }

    #[test]
    fn test_overlapping_matches() {
        assert_eq!(search("aaaa", "aa"), vec![0, 1, 2]);
        assert_eq!(search("abababa", "aba"), vec![0, 2, 4]);
    }

    #[test]
    fn test_simple_matches() {
        assert_eq!(search("java spring java", "java"), vec![0, 12]);
        assert_eq!(search("python react", "java"), Vec::<usize>::new());
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(search("", "a").is_empty());
        assert!(search("abc", "").is_empty());
        assert!(search("ab", "abc").is_empty());
        assert_eq!(search("abc", "abc"), vec![0]);
    }
}
