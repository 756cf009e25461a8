/// Simple Levenshtein distance calculation for fuzzy label matching
///
/// Computes the minimum number of single-character edits (insertions, deletions, substitutions)
/// required to change one string into another.
///
/// # Examples
///
/// ```
/// use method_pairs::utils::string_similarity::levenshtein_distance;
///
/// assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
/// assert_eq!(levenshtein_distance("hello", "hello"), 0);
/// ```
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Two rolling rows are enough; labels can be long string literals
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0; b_chars.len() + 1];

    for (i, &char_a) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, &char_b) in b_chars.iter().enumerate() {
            let cost = if char_a == char_b { 0 } else { 1 };
            current[j + 1] = std::cmp::min(
                std::cmp::min(
                    previous[j + 1] + 1, // deletion
                    current[j] + 1,      // insertion
                ),
                previous[j] + cost, // substitution
            );
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_chars.len()]
}

/// Similarity in `[0.0, 1.0]`: one minus the edit distance over the longer length
///
/// # Examples
///
/// ```
/// use method_pairs::utils::string_similarity::normalized_similarity;
///
/// assert_eq!(normalized_similarity("run", "run"), 1.0);
/// assert_eq!(normalized_similarity("abc", "xyz"), 0.0);
/// ```
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein_distance(a, b) as f64 / longest as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("hello", "hello"), 0);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("saturday", "sunday"), 3);
        assert_eq!(levenshtein_distance("", "hello"), 5);
        assert_eq!(levenshtein_distance("hello", ""), 5);
    }

    #[test]
    fn test_levenshtein_counts_chars_not_bytes() {
        assert_eq!(levenshtein_distance("größe", "grösse"), 2);
        assert_eq!(levenshtein_distance("名前", "名"), 1);
    }

    #[test]
    fn test_normalized_similarity() {
        assert_eq!(normalized_similarity("", ""), 1.0);
        assert_eq!(normalized_similarity("getName", "getName"), 1.0);
        assert_eq!(normalized_similarity("abc", ""), 0.0);
        // one substitution out of seven characters
        let sim = normalized_similarity("getName", "getNamf");
        assert!((sim - 6.0 / 7.0).abs() < 1e-9);
    }
}
