use thiserror::Error;

use crate::model::ids::WordId;

/// Minimum per-word accuracy for a word (and thus a plot) to count as mastered.
pub const MASTERY_THRESHOLD: f64 = 0.7;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WordError {
    #[error("word term cannot be empty")]
    EmptyTerm,

    #[error("word meaning cannot be empty")]
    EmptyMeaning,

    #[error("correct count {correct} exceeds total attempts {total}")]
    CounterInvariant { correct: u32, total: u32 },
}

//
// ─── WORD ENTRY ────────────────────────────────────────────────────────────────
//

/// One vocabulary word plus its learning progress.
///
/// The term text is the merge identity across reloads; the id is positional
/// and reassigned every load. `raw_row` keeps the original source columns so
/// the row can be re-exported losslessly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    id: WordId,
    word: String,
    meaning: String,
    learned: bool,
    correct_count: u32,
    total_attempts: u32,
    raw_row: Vec<String>,
}

impl WordEntry {
    /// Creates a brand-new word with zeroed progress.
    ///
    /// # Errors
    ///
    /// Returns `WordError::EmptyTerm` / `WordError::EmptyMeaning` if either
    /// text is empty or whitespace-only. The texts themselves are stored
    /// untrimmed: merge identity is the exact source string.
    pub fn new(
        id: WordId,
        word: impl Into<String>,
        meaning: impl Into<String>,
        raw_row: Vec<String>,
    ) -> Result<Self, WordError> {
        let word = word.into();
        let meaning = meaning.into();
        if word.trim().is_empty() {
            return Err(WordError::EmptyTerm);
        }
        if meaning.trim().is_empty() {
            return Err(WordError::EmptyMeaning);
        }

        Ok(Self {
            id,
            word,
            meaning,
            learned: false,
            correct_count: 0,
            total_attempts: 0,
            raw_row,
        })
    }

    /// Rebuilds a word from persisted progress counters.
    ///
    /// # Errors
    ///
    /// Returns `WordError::CounterInvariant` when `correct_count` exceeds
    /// `total_attempts`, plus the `new` validation errors.
    pub fn from_persisted(
        id: WordId,
        word: impl Into<String>,
        meaning: impl Into<String>,
        learned: bool,
        correct_count: u32,
        total_attempts: u32,
        raw_row: Vec<String>,
    ) -> Result<Self, WordError> {
        let mut entry = Self::new(id, word, meaning, raw_row)?;
        entry.apply_progress(learned, correct_count, total_attempts)?;
        Ok(entry)
    }

    /// Copies progress state onto this entry (used by the merge step).
    ///
    /// # Errors
    ///
    /// Returns `WordError::CounterInvariant` when the counters are inconsistent.
    pub fn apply_progress(
        &mut self,
        learned: bool,
        correct_count: u32,
        total_attempts: u32,
    ) -> Result<(), WordError> {
        if correct_count > total_attempts {
            return Err(WordError::CounterInvariant {
                correct: correct_count,
                total: total_attempts,
            });
        }
        self.learned = learned;
        self.correct_count = correct_count;
        self.total_attempts = total_attempts;
        Ok(())
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> WordId {
        self.id
    }

    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    #[must_use]
    pub fn meaning(&self) -> &str {
        &self.meaning
    }

    #[must_use]
    pub fn learned(&self) -> bool {
        self.learned
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn total_attempts(&self) -> u32 {
        self.total_attempts
    }

    #[must_use]
    pub fn raw_row(&self) -> &[String] {
        &self.raw_row
    }

    /// Marks the word as placed into a batch (or clears that mark on rollback).
    pub fn set_learned(&mut self, learned: bool) {
        self.learned = learned;
    }

    /// Records one assessment attempt. Counters move at most one step each,
    /// so `correct_count <= total_attempts` holds by construction.
    pub fn record_attempt(&mut self, perfect: bool) {
        self.total_attempts += 1;
        if perfect {
            self.correct_count += 1;
        }
    }

    /// Fraction of attempts answered perfectly; `0.0` before any attempt.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.total_attempts == 0 {
            return 0.0;
        }
        f64::from(self.correct_count) / f64::from(self.total_attempts)
    }

    /// True once the word has been attempted and sits at or above the
    /// mastery threshold.
    #[must_use]
    pub fn is_accurate(&self) -> bool {
        self.total_attempts > 0 && self.accuracy() >= MASTERY_THRESHOLD
    }
}

//
// ─── PASSTHROUGH ENTRY ─────────────────────────────────────────────────────────
//

/// A non-word source row (blank line, comment, malformed row) carried
/// verbatim so exports can reproduce the file byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassthroughEntry {
    raw: String,
}

impl PassthroughEntry {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

//
// ─── ROW ENTRY ─────────────────────────────────────────────────────────────────
//

/// One row of the word database, in original source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowEntry {
    Word(WordEntry),
    Passthrough(PassthroughEntry),
}

impl RowEntry {
    #[must_use]
    pub fn as_word(&self) -> Option<&WordEntry> {
        match self {
            RowEntry::Word(word) => Some(word),
            RowEntry::Passthrough(_) => None,
        }
    }

    pub fn as_word_mut(&mut self) -> Option<&mut WordEntry> {
        match self {
            RowEntry::Word(word) => Some(word),
            RowEntry::Passthrough(_) => None,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn build_word(id: u32, word: &str, meaning: &str) -> WordEntry {
        WordEntry::new(
            WordId::new(id),
            word,
            meaning,
            vec![word.to_string(), meaning.to_string()],
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_empty_term() {
        let err = WordEntry::new(WordId::new(1), "   ", "n.預算", vec![]).unwrap_err();
        assert_eq!(err, WordError::EmptyTerm);
    }

    #[test]
    fn new_rejects_empty_meaning() {
        let err = WordEntry::new(WordId::new(1), "budget", " ", vec![]).unwrap_err();
        assert_eq!(err, WordError::EmptyMeaning);
    }

    #[test]
    fn from_persisted_rejects_inconsistent_counters() {
        let err = WordEntry::from_persisted(
            WordId::new(1),
            "budget",
            "n.預算",
            true,
            5,
            3,
            vec![],
        )
        .unwrap_err();
        assert_eq!(err, WordError::CounterInvariant { correct: 5, total: 3 });
    }

    #[test]
    fn record_attempt_moves_counters() {
        let mut word = build_word(1, "budget", "n.預算");
        word.record_attempt(true);
        word.record_attempt(false);
        assert_eq!(word.correct_count(), 1);
        assert_eq!(word.total_attempts(), 2);
        assert!(word.correct_count() <= word.total_attempts());
    }

    #[test]
    fn accuracy_threshold_is_inclusive() {
        let word = WordEntry::from_persisted(
            WordId::new(1),
            "budget",
            "n.預算",
            true,
            7,
            10,
            vec![],
        )
        .unwrap();
        assert!((word.accuracy() - 0.7).abs() < f64::EPSILON);
        assert!(word.is_accurate());
    }

    #[test]
    fn accuracy_below_threshold_is_not_accurate() {
        let word = WordEntry::from_persisted(
            WordId::new(1),
            "budget",
            "n.預算",
            true,
            1,
            2,
            vec![],
        )
        .unwrap();
        assert!(!word.is_accurate());
    }

    #[test]
    fn unattempted_word_is_never_accurate() {
        let word = build_word(1, "budget", "n.預算");
        assert_eq!(word.accuracy(), 0.0);
        assert!(!word.is_accurate());
    }

    #[test]
    fn row_entry_word_access() {
        let mut entry = RowEntry::Word(build_word(1, "audit", "n.審計"));
        assert_eq!(entry.as_word().unwrap().word(), "audit");
        entry.as_word_mut().unwrap().set_learned(true);
        assert!(entry.as_word().unwrap().learned());

        let passthrough = RowEntry::Passthrough(PassthroughEntry::new("# comment"));
        assert!(passthrough.as_word().is_none());
    }
}
