//! Candidate scoring and winner selection
//!
//! The similarity metric is a deliberately crude character-overlap
//! heuristic, not edit distance. Winner selection depends on its exact
//! shape, so swapping in a textbook metric would silently change which
//! candidate wins on ambiguous input.

use tracing::debug;

use super::{ElementKind, UiCandidate};

/// Minimum final score an acceptable match must exceed
pub const MATCH_THRESHOLD: f32 = 0.3;
/// Base score when one normalized string contains the other
const SUBSTRING_SCORE: f32 = 0.9;
/// Multiplier applied to geometry-detected candidates (clickable affinity)
const BUTTON_BOOST: f32 = 1.2;

/// Case-insensitive similarity between candidate text and query.
///
/// Substring containment in either direction scores a flat 0.9, but only
/// when both strings are non-empty: empty text has nothing to match.
/// Otherwise the score is the number of query characters (with repetition)
/// that occur anywhere in the candidate text, over the longer length.
pub fn text_similarity(candidate: &str, query: &str) -> f32 {
    let a = candidate.to_lowercase();
    let b = query.to_lowercase();

    if !a.is_empty() && !b.is_empty() && (a.contains(&b) || b.contains(&a)) {
        return SUBSTRING_SCORE;
    }

    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 0.0;
    }

    let matches = b.chars().filter(|&c| a.contains(c)).count();
    matches as f32 / longest as f32
}

/// Final score for one candidate against the query
pub fn score(candidate: &UiCandidate, query: &str) -> f32 {
    let mut score = text_similarity(&candidate.text, query);

    if candidate.kind == ElementKind::Button {
        score *= BUTTON_BOOST;
    }

    score * (candidate.confidence / 100.0)
}

/// Select the best-scoring candidate for the query.
///
/// Scores are compared strictly, so an exact tie resolves to the candidate
/// scored first. Returns `None` when no candidate exceeds
/// [`MATCH_THRESHOLD`], which callers treat as a soft outcome.
pub fn find_best_match<'a>(candidates: &'a [UiCandidate], query: &str) -> Option<&'a UiCandidate> {
    let mut best: Option<&UiCandidate> = None;
    let mut best_score = 0.0f32;

    for candidate in candidates {
        let candidate_score = score(candidate, query);
        if candidate_score > best_score {
            best_score = candidate_score;
            best = Some(candidate);
        }
    }

    debug!("best score for '{query}': {best_score:.3}");

    if best_score > MATCH_THRESHOLD {
        best
    } else {
        None
    }
}
