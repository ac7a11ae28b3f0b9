use farm_core::model::WordId;

/// The per-word result of one completed assessment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordResult {
    pub word_id: WordId,
    pub word: String,
    pub meaning: String,
    pub choice_correct: bool,
    pub spelling_correct: bool,
    pub perfect: bool,
    /// The learner's normalized fill-in guess, kept for the results screen.
    pub submitted: String,
}

/// Everything the results screen needs after scoring a batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExamOutcome {
    pub results: Vec<WordResult>,
    pub perfect_count: usize,
}

impl ExamOutcome {
    /// Number of words that were scored.
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }
}
