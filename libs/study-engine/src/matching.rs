//! Answer comparison for typed responses.

use crate::types::MatchingMode;
use serde::{Deserialize, Serialize};

/// Result of comparing a typed answer to the expected answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    /// Whether the answer is considered correct.
    pub is_correct: bool,
    /// Similarity score between 0.0 and 1.0.
    pub similarity: f64,
    /// The matching mode used.
    pub matching_mode: MatchingMode,
    /// Typed answer as compared (for display).
    pub typed_normalized: String,
    /// Expected answer as compared (for display).
    pub correct_normalized: String,
}

/// Compare a typed answer to the expected answer.
///
/// `Exact` compares trimmed text only. The other modes also collapse
/// inner whitespace and ignore case.
pub fn compare_answers(
    typed: &str,
    correct: &str,
    mode: MatchingMode,
    fuzzy_threshold: f64,
) -> MatchResult {
    match mode {
        MatchingMode::Exact => {
            let typed_normalized = typed.trim().to_string();
            let correct_normalized = correct.trim().to_string();
            let is_correct = typed_normalized == correct_normalized;
            MatchResult {
                is_correct,
                similarity: if is_correct { 1.0 } else { 0.0 },
                matching_mode: mode,
                typed_normalized,
                correct_normalized,
            }
        }
        MatchingMode::CaseInsensitive => {
            let typed_normalized = normalize_whitespace(typed);
            let correct_normalized = normalize_whitespace(correct);
            let is_correct = typed_normalized.to_lowercase() == correct_normalized.to_lowercase();
            MatchResult {
                is_correct,
                similarity: if is_correct { 1.0 } else { 0.0 },
                matching_mode: mode,
                typed_normalized,
                correct_normalized,
            }
        }
        MatchingMode::Fuzzy => {
            let typed_normalized = normalize_whitespace(typed);
            let correct_normalized = normalize_whitespace(correct);
            let similarity = normalized_similarity(
                &typed_normalized.to_lowercase(),
                &correct_normalized.to_lowercase(),
            );
            MatchResult {
                is_correct: similarity >= fuzzy_threshold,
                similarity,
                matching_mode: mode,
                typed_normalized,
                correct_normalized,
            }
        }
    }
}

/// Trim and collapse runs of whitespace.
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Levenshtein distance over chars.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Similarity in 0.0..=1.0 derived from the Levenshtein distance.
///
/// Lengths are counted in chars so kana and hangul answers score the same
/// way as latin ones.
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein_distance(a, b);
    1.0 - (distance as f64 / max_len as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("いぬ", "いね"), 1);
    }

    #[test]
    fn test_similarity_counts_chars_not_bytes() {
        assert_eq!(normalized_similarity("", ""), 1.0);
        assert_eq!(normalized_similarity("いぬ", "いね"), 0.5);
    }

    #[test]
    fn test_exact_trims_outer_whitespace_only() {
        assert!(compare_answers("  dog ", "dog", MatchingMode::Exact, 0.8).is_correct);
        assert!(!compare_answers("Dog", "dog", MatchingMode::Exact, 0.8).is_correct);
        assert!(!compare_answers("hot  dog", "hot dog", MatchingMode::Exact, 0.8).is_correct);
    }

    #[test]
    fn test_case_insensitive_collapses_whitespace() {
        let result = compare_answers("HOT   Dog", "hot dog", MatchingMode::CaseInsensitive, 0.8);
        assert!(result.is_correct);
        assert_eq!(result.typed_normalized, "HOT Dog");
    }

    #[test]
    fn test_fuzzy_threshold() {
        assert!(compare_answers("helo", "hello", MatchingMode::Fuzzy, 0.8).is_correct);
        assert!(!compare_answers("xyz", "hello", MatchingMode::Fuzzy, 0.8).is_correct);
    }
}
