//! Free-text answer normalization for the fill-in-blank phase.

/// Normalizes a guess or canonical term for comparison: surrounding
/// whitespace is trimmed, letters lowercased, and internal whitespace runs
/// collapsed to a single space. Phrases like "alma  mater" and "Alma Mater "
/// compare equal after normalization.
#[must_use]
pub fn normalize_answer(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// True when guess and canonical term are equal after normalization.
#[must_use]
pub fn answers_match(guess: &str, term: &str) -> bool {
    normalize_answer(guess) == normalize_answer(term)
}
