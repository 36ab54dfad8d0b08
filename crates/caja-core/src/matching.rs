//! # Approximate Matching
//!
//! Ratcliff/Obershelp similarity between short tokens, used to forgive
//! typos when the cashier types a product description.
//!
//! ```text
//!   ratio = 2 × M / (|a| + |b|)
//!
//!   M = characters in the longest common block, plus (recursively) the
//!       matches to the left and to the right of that block
//!
//!   "aple" vs "apple": blocks "ap" + "le" → M = 4 → 8 / 9 = 0.89
//! ```

/// Similarity ratio in `[0.0, 1.0]`. Two empty strings are identical.
///
/// ## Example
/// ```rust
/// use caja_core::matching::similarity;
///
/// assert_eq!(similarity("leche", "leche"), 1.0);
/// assert!(similarity("lehce", "leche") >= 0.8);
/// assert!(similarity("pan", "queso") < 0.5);
/// ```
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

/// Returns the candidate most similar to `token`, if it reaches `cutoff`.
pub fn best_match<'a, I>(token: &str, candidates: I, cutoff: f64) -> Option<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .map(|candidate| (candidate, similarity(token, candidate)))
        .filter(|(_, score)| *score >= cutoff)
        .fold(None, |best: Option<(&str, f64)>, current| match best {
            Some(b) if b.1 >= current.1 => Some(b),
            _ => Some(current),
        })
}

/// True when every search token has an approximate match among the
/// target tokens.
pub fn all_tokens_match(search: &[&str], target: &[&str], cutoff: f64) -> bool {
    !search.is_empty()
        && search
            .iter()
            .all(|token| best_match(token, target.iter().copied(), cutoff).is_some())
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let (start_a, start_b, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_characters(&a[..start_a], &b[..start_b])
        + matching_characters(&a[start_a + len..], &b[start_b + len..])
}

/// Longest common contiguous block; earliest in `a`, then earliest in `b`.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    // lengths[j + 1] = length of the common suffix ending at a[i], b[j]
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb { previous[j] + 1 } else { 0 };
            let len = current[j + 1];
            if len > 0 {
                let start_a = i + 1 - len;
                let start_b = j + 1 - len;
                let better = len > best.2
                    || (len == best.2 && (start_a, start_b) < (best.0, best.1));
                if better {
                    best = (start_a, start_b, len);
                }
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }
    best
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_known_ratios() {
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("abc", ""), 0.0);
        assert_eq!(similarity("abcd", "abcd"), 1.0);
        // "aple" / "apple" → 2*4/9
        assert!((similarity("aple", "apple") - 8.0 / 9.0).abs() < 1e-9);
        // "abcd" / "bcde" → "bcd" → 2*3/8
        assert!((similarity("abcd", "bcde") - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_is_symmetric_for_simple_cases() {
        assert_eq!(similarity("leche", "lecho"), similarity("lecho", "leche"));
    }

    #[test]
    fn test_best_match_respects_cutoff() {
        let candidates = ["arroz", "leche", "lechuga"];
        let (found, _) = best_match("lece", candidates.iter().copied(), 0.8).unwrap();
        assert_eq!(found, "leche");
        assert!(best_match("queso", candidates.iter().copied(), 0.8).is_none());
    }

    #[test]
    fn test_all_tokens_match() {
        let target = ["a1", "leche", "entera", "1l"];
        assert!(all_tokens_match(&["leche", "entera"], &target, 0.8));
        assert!(all_tokens_match(&["lece"], &target, 0.8));
        assert!(!all_tokens_match(&["leche", "descremada"], &target, 0.8));
        assert!(!all_tokens_match(&[], &target, 0.8));
    }
}
