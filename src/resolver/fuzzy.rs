//! String similarity on a 0–100 scale.
//!
//! `ratio` is the normalized indel similarity `2 * lcs / (len_a + len_b)`,
//! computed by `rapidfuzz`.
//! `partial_ratio` aligns the shorter string against every same-length
//! window of the longer one (plus the shorter windows hanging off either
//! end) and keeps the best `ratio`, so a fragment of a file name scores as
//! high as the whole name. Comparison is case-insensitive.

use rapidfuzz::distance::indel;

/// Similarity of two whole strings.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a = lowered_chars(a);
    let b = lowered_chars(b);
    indel_ratio(&a, &b)
}

/// Best similarity of the shorter string against any window of the longer.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a = lowered_chars(a);
    let b = lowered_chars(b);
    let (needle, haystack) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if needle.is_empty() {
        return if haystack.is_empty() { 100.0 } else { 0.0 };
    }

    let m = needle.len();
    let n = haystack.len();
    let mut best = 0.0f64;

    for start in 0..=(n - m) {
        let score = indel_ratio(&needle, &haystack[start..start + m]);
        if score > best {
            best = score;
            if best >= 100.0 {
                return best;
            }
        }
    }

    // Partial overlaps at both ends of the haystack.
    for k in 1..m {
        let head = indel_ratio(&needle, &haystack[..k]);
        let tail = indel_ratio(&needle, &haystack[n - k..]);
        best = best.max(head).max(tail);
    }

    best
}

/// Pick the candidate with the highest `partial_ratio` against `query`.
/// On a tie the earlier candidate wins.
pub fn best_match<'a>(query: &str, candidates: &'a [String]) -> Option<(&'a str, f64)> {
    let mut best: Option<(&str, f64)> = None;
    for candidate in candidates {
        let score = partial_ratio(query, candidate);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate.as_str(), score)),
        }
    }
    best
}

fn lowered_chars(s: &str) -> Vec<char> {
    s.chars().flat_map(char::to_lowercase).collect()
}

fn indel_ratio(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    100.0 * indel::normalized_similarity(a.iter().copied(), b.iter().copied())
}
