//! Keyword scoring of a normalized query against catalog intents
//!
//! Additive, no early exit:
//! 1. Keyword phrase found in the query → +10
//! 2. Each keyword word longer than 2 chars found in the query → +5
//!    (stacks with rule 1 for the same phrase)
//! 3. Synonym found in the query → +3
//! 4. Each keyword word partially matching a query token → +2
//! 5. Any positive score gets a length bonus of `min(chars / 10, 5)`

use crate::types::{Intent, ScoredIntent};

pub const PHRASE_POINTS: f64 = 10.0;
pub const WORD_POINTS: f64 = 5.0;
pub const SYNONYM_POINTS: f64 = 3.0;
pub const PARTIAL_POINTS: f64 = 2.0;
pub const MAX_LENGTH_BONUS: f64 = 5.0;

/// Words of this many chars or fewer never score under rule 2
const MIN_WORD_CHARS: usize = 2;

/// Score one intent against a normalized query and its tokens.
///
/// Pure and total: no match simply yields 0.
pub fn score(normalized: &str, tokens: &[&str], intent: &Intent) -> f64 {
    let mut total = 0.0;

    for phrase in &intent.keywords {
        if normalized.contains(phrase.as_str()) {
            total += PHRASE_POINTS;
        }

        for word in phrase.split(' ') {
            if word.chars().count() > MIN_WORD_CHARS && normalized.contains(word) {
                total += WORD_POINTS;
            }
        }
    }

    for synonym in &intent.synonyms {
        if normalized.contains(synonym.as_str()) {
            total += SYNONYM_POINTS;
        }
    }

    for phrase in &intent.keywords {
        let matched = phrase
            .split(' ')
            .filter(|word| tokens.iter().any(|token| partially_matches(token, word)))
            .count();
        total += PARTIAL_POINTS * matched as f64;
    }

    if total > 0.0 {
        total += length_bonus(normalized);
    }

    total
}

/// Score every intent, preserving catalog order
pub fn score_all<'a>(normalized: &str, tokens: &[&str], intents: &'a [Intent]) -> Vec<ScoredIntent<'a>> {
    intents
        .iter()
        .map(|intent| ScoredIntent {
            intent,
            score: score(normalized, tokens, intent),
        })
        .collect()
}

/// Either side containing the other. Empty tokens never match.
fn partially_matches(token: &str, word: &str) -> bool {
    if token.is_empty() || word.is_empty() {
        return false;
    }
    token.contains(word) || word.contains(token)
}

fn length_bonus(normalized: &str) -> f64 {
    (normalized.chars().count() as f64 / 10.0).min(MAX_LENGTH_BONUS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize, tokenize};

    fn score_query(query: &str, intent: &Intent) -> f64 {
        let normalized = normalize(query);
        let tokens = tokenize(&normalized);
        score(&normalized, &tokens, intent)
    }

    #[test]
    fn test_phrase_and_word_points_stack() {
        let intent = Intent::new("contract", &["abc def"], &[], 0);
        // phrase 10 + two words 5 each + partial 2 * 2 + bonus 0.7
        let s = score_query("abc def", &intent);
        assert!((s - 24.7).abs() < 1e-9);
    }

    #[test]
    fn test_short_words_skip_word_points() {
        let intent = Intent::new("short", &["ab"], &[], 0);
        // phrase 10 + partial 2 + bonus 0.2, no word points for 2 chars
        let s = score_query("ab", &intent);
        assert!((s - 12.2).abs() < 1e-9);
    }

    #[test]
    fn test_synonym_points() {
        let intent = Intent::new("syn", &["zzzz"], &["rent"], 0);
        // synonym 3 + bonus 0.4
        let s = score_query("rent", &intent);
        assert!((s - 3.4).abs() < 1e-9);
    }

    #[test]
    fn test_partial_match_both_directions() {
        let intent = Intent::new("partial", &["tenant", "xy"], &[], 0);
        // "tenants" contains "tenant": phrase 10 + word 5 + partial 2
        // "x" is contained in "xy": partial 2
        // bonus for "tenants x" (9 chars) = 0.9
        let s = score_query("tenants x", &intent);
        assert!((s - 19.9).abs() < 1e-9);
    }

    #[test]
    fn test_length_bonus_is_capped() {
        let intent = Intent::new("cap", &["zzzz"], &["a"], 0);
        let long = format!("a {}", "b".repeat(200));
        let s = score_query(&long, &intent);
        assert!((s - (SYNONYM_POINTS + MAX_LENGTH_BONUS)).abs() < 1e-9);
    }

    #[test]
    fn test_no_match_is_zero_without_bonus() {
        let intent = Intent::new("none", &["عقد عمل"], &["راتب"], 0);
        assert_eq!(score_query("xyz123", &intent), 0.0);
    }

    #[test]
    fn test_empty_query_scores_zero() {
        let intent = Intent::new("any", &["عقد عمل"], &["راتب"], 0);
        assert_eq!(score_query("", &intent), 0.0);
    }

    #[test]
    fn test_score_all_keeps_order() {
        let intents = vec![
            Intent::new("first", &["alpha"], &[], 0),
            Intent::new("second", &["beta"], &[], 1),
        ];
        let scored = score_all("beta", &["beta"], &intents);
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].intent.id, "first");
        assert_eq!(scored[0].score, 0.0);
        assert!(scored[1].score > 0.0);
    }
}
