//! Fuzzy matching contract used by the providers to rank candidates.
//!
//! A match is a case-insensitive subsequence of the candidate. The score
//! rewards consecutive runs, matches right after a separator or on a
//! camel-case hump, and penalizes skipped leading characters and every
//! unmatched character. Long candidates therefore score below zero even when
//! they match; each provider decides whether such matches are acceptable.

/// Outcome of matching a query against one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzyMatch {
    /// Whether every query character was found in order
    pub matched: bool,

    /// Relevance score (higher is better, may be negative)
    pub score: i32,
}

impl FuzzyMatch {
    /// A failed match.
    pub const NONE: FuzzyMatch = FuzzyMatch {
        matched: false,
        score: 0,
    };

    /// A successful match with the given score.
    pub fn hit(score: i32) -> Self {
        FuzzyMatch {
            matched: true,
            score,
        }
    }
}

/// Scores a candidate string against a query.
///
/// Implementations must be cheap to share between the caller and background
/// match tasks.
pub trait FuzzyMatcher: Send + Sync {
    fn fuzzy_match(&self, query: &str, candidate: &str) -> FuzzyMatch;
}

const RECURSION_LIMIT: usize = 10;
const MAX_MATCHES: usize = 256;

const SEQUENTIAL_BONUS: i32 = 15;
const SEPARATOR_BONUS: i32 = 30;
const CAMEL_BONUS: i32 = 30;
const FIRST_LETTER_BONUS: i32 = 15;

const LEADING_LETTER_PENALTY: i32 = -5;
const MAX_LEADING_LETTER_PENALTY: i32 = -15;
const UNMATCHED_LETTER_PENALTY: i32 = -1;

/// Default matcher: best-alignment scored subsequence search.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubsequenceMatcher;

impl FuzzyMatcher for SubsequenceMatcher {
    fn fuzzy_match(&self, query: &str, candidate: &str) -> FuzzyMatch {
        if query.is_empty() {
            return FuzzyMatch::NONE;
        }

        let needle: Vec<char> = query.chars().collect();
        let haystack: Vec<char> = candidate.chars().collect();
        let mut search = Alignment {
            needle: &needle,
            haystack: &haystack,
            recursions: 0,
        };

        let mut positions = Vec::new();
        match search.best(0, 0, &[], &mut positions) {
            Some(score) => FuzzyMatch::hit(score),
            None => FuzzyMatch::NONE,
        }
    }
}

struct Alignment<'a> {
    needle: &'a [char],
    haystack: &'a [char],
    recursions: usize,
}

impl Alignment<'_> {
    /// Best score for placing `needle[n..]` into `haystack[h..]` after the
    /// positions already fixed in `prefix`. Writes the winning positions to
    /// `out`.
    fn best(
        &mut self,
        mut n: usize,
        mut h: usize,
        prefix: &[usize],
        out: &mut Vec<usize>,
    ) -> Option<i32> {
        self.recursions += 1;
        if self.recursions >= RECURSION_LIMIT {
            return None;
        }
        if n == self.needle.len() || h == self.haystack.len() {
            return None;
        }

        let mut positions = prefix.to_vec();
        let mut alternative: Option<(i32, Vec<usize>)> = None;

        while n < self.needle.len() && h < self.haystack.len() {
            if same_letter(self.needle[n], self.haystack[h]) {
                if positions.len() >= MAX_MATCHES {
                    return None;
                }

                // Try leaving this haystack character for a later occurrence.
                let mut skipped = Vec::new();
                if let Some(score) = self.best(n, h + 1, &positions, &mut skipped) {
                    if alternative.as_ref().map_or(true, |(best, _)| score > *best) {
                        alternative = Some((score, skipped));
                    }
                }

                positions.push(h);
                n += 1;
            }
            h += 1;
        }

        let greedy = (n == self.needle.len()).then(|| self.score(&positions));
        match (greedy, alternative) {
            (Some(score), Some((alt, alt_positions))) if alt > score => {
                *out = alt_positions;
                Some(alt)
            }
            (Some(score), _) => {
                *out = positions;
                Some(score)
            }
            (None, Some((alt, alt_positions))) => {
                *out = alt_positions;
                Some(alt)
            }
            (None, None) => None,
        }
    }

    fn score(&self, positions: &[usize]) -> i32 {
        let mut score = 100;

        let leading = positions.first().copied().unwrap_or(0);
        score += LEADING_LETTER_PENALTY
            .saturating_mul(clamp_count(leading))
            .max(MAX_LEADING_LETTER_PENALTY);

        let unmatched = self.haystack.len() - positions.len();
        score = score
            .saturating_add(UNMATCHED_LETTER_PENALTY.saturating_mul(clamp_count(unmatched)));

        for (i, &pos) in positions.iter().enumerate() {
            if i > 0 && pos == positions[i - 1] + 1 {
                score += SEQUENTIAL_BONUS;
            }

            if pos == 0 {
                score += FIRST_LETTER_BONUS;
                continue;
            }

            let neighbor = self.haystack[pos - 1];
            let current = self.haystack[pos];
            if neighbor.is_lowercase() && current.is_uppercase() {
                score += CAMEL_BONUS;
            }
            if is_separator(neighbor) {
                score += SEPARATOR_BONUS;
            }
        }

        score
    }
}

fn same_letter(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn is_separator(c: char) -> bool {
    matches!(c, '_' | ' ' | '/' | '-' | '.')
}

fn clamp_count(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(query: &str, candidate: &str) -> FuzzyMatch {
        SubsequenceMatcher.fuzzy_match(query, candidate)
    }

    #[test]
    fn test_subsequence_matches() {
        assert!(score("term", "Terminal").matched);
        assert!(score("trm", "Terminal").matched);
        assert!(!score("xyz", "Terminal").matched);
        assert!(!score("lanimret", "Terminal").matched);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(score("TERM", "terminal"), score("term", "terminal"));
    }

    #[test]
    fn test_empty_query_never_matches() {
        assert_eq!(score("", "anything"), FuzzyMatch::NONE);
    }

    #[test]
    fn test_prefix_beats_scattered() {
        let prefix = score("text", "textpad");
        let scattered = score("text", "tieoxyt");
        assert!(prefix.matched && scattered.matched);
        assert!(prefix.score > scattered.score);
    }

    #[test]
    fn test_separator_bonus() {
        let after_slash = score("b", "a/b");
        let mid_word = score("b", "aab");
        assert!(after_slash.score > mid_word.score);
    }

    #[test]
    fn test_long_candidate_scores_negative() {
        let candidate = format!("/{}/needle", "x".repeat(300));
        let result = score("needle", &candidate);
        assert!(result.matched);
        assert!(result.score < 0);
    }

    #[test]
    fn test_picks_best_alignment() {
        // Greedy placement would take the first 'f'; the better alignment
        // uses the separator-prefixed "file" later on.
        let result = score("file", "fxxxxx_file");
        let greedy_only = 100 - 7 + 15 + 15 * 2;
        assert!(result.score > greedy_only);
    }
}
