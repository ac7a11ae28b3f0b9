use std::collections::HashMap;

use rand::Rng;
use rand::seq::SliceRandom;

use farm_core::answer::{answers_match, normalize_answer};
use farm_core::model::{GameState, PlotId, WordId};

use super::outcome::{ExamOutcome, WordResult};
use crate::error::FarmError;

/// Number of options per multiple-choice question (own meaning + distractors).
const CHOICE_OPTIONS: usize = 4;

//
// ─── SESSION TYPES ─────────────────────────────────────────────────────────────
//

/// How the session was opened. Mode decides what happens on abandon: a
/// learning session rolls back its freshly planted plot, a review does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamMode {
    Learning,
    Review,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ExamPhase {
    MultipleChoice,
    FillInBlank { choice_correct: HashMap<WordId, bool> },
    Scored,
}

/// One multiple-choice question: pick the meaning for a term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceQuestion {
    pub word_id: WordId,
    pub word: String,
    pub options: Vec<String>,
}

/// One fill-in question: write the term for a meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillQuestion {
    pub word_id: WordId,
    pub meaning: String,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// An in-flight two-phase assessment over one batch.
///
/// Phase 1 (multiple choice) results live only in the session until phase 2
/// (fill-in-blank) is submitted; counters are committed exactly once per word
/// at that point. Abandoning the session earlier commits nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamSession {
    mode: ExamMode,
    plot: Option<PlotId>,
    word_ids: Vec<WordId>,
    phase: ExamPhase,
}

impl ExamSession {
    pub(crate) fn learning(plot: PlotId, word_ids: Vec<WordId>) -> Self {
        Self {
            mode: ExamMode::Learning,
            plot: Some(plot),
            word_ids,
            phase: ExamPhase::MultipleChoice,
        }
    }

    pub(crate) fn review(word_ids: Vec<WordId>) -> Self {
        Self {
            mode: ExamMode::Review,
            plot: None,
            word_ids,
            phase: ExamPhase::MultipleChoice,
        }
    }

    // Accessors
    #[must_use]
    pub fn mode(&self) -> ExamMode {
        self.mode
    }

    /// The freshly planted plot, for learning sessions only.
    #[must_use]
    pub fn plot_id(&self) -> Option<PlotId> {
        self.plot
    }

    #[must_use]
    pub fn word_ids(&self) -> &[WordId] {
        &self.word_ids
    }

    #[must_use]
    pub fn is_scored(&self) -> bool {
        matches!(self.phase, ExamPhase::Scored)
    }

    /// Builds the phase-1 question sheet.
    ///
    /// Each term is shown against its own meaning plus up to three
    /// distractors drawn without replacement from the de-duplicated meanings
    /// of every other word in the database, shuffled.
    #[must_use]
    pub fn multiple_choice_questions<R: Rng + ?Sized>(
        &self,
        state: &GameState,
        rng: &mut R,
    ) -> Vec<ChoiceQuestion> {
        self.word_ids
            .iter()
            .filter_map(|id| state.word(*id))
            .map(|word| {
                let mut pool: Vec<String> = Vec::new();
                for other in state.words() {
                    let meaning = other.meaning();
                    if meaning != word.meaning() && !pool.iter().any(|m| m == meaning) {
                        pool.push(meaning.to_string());
                    }
                }
                pool.shuffle(rng);
                pool.truncate(CHOICE_OPTIONS - 1);

                let mut options = pool;
                options.push(word.meaning().to_string());
                options.shuffle(rng);

                ChoiceQuestion {
                    word_id: word.id(),
                    word: word.word().to_string(),
                    options,
                }
            })
            .collect()
    }

    /// Builds the phase-2 question sheet.
    #[must_use]
    pub fn fill_in_questions(&self, state: &GameState) -> Vec<FillQuestion> {
        self.word_ids
            .iter()
            .filter_map(|id| state.word(*id))
            .map(|word| FillQuestion {
                word_id: word.id(),
                meaning: word.meaning().to_string(),
            })
            .collect()
    }

    /// Records the chosen meanings and advances to the fill-in phase.
    ///
    /// A missing or wrong choice simply records `false`; nothing is
    /// persisted yet.
    ///
    /// # Errors
    ///
    /// Returns `FarmError::WrongPhase` unless the session is in phase 1.
    pub fn submit_multiple_choice(
        &mut self,
        state: &GameState,
        answers: &HashMap<WordId, String>,
    ) -> Result<(), FarmError> {
        if !matches!(self.phase, ExamPhase::MultipleChoice) {
            return Err(FarmError::WrongPhase);
        }

        let mut choice_correct = HashMap::with_capacity(self.word_ids.len());
        for id in &self.word_ids {
            let correct = match (state.word(*id), answers.get(id)) {
                (Some(word), Some(chosen)) => chosen == word.meaning(),
                _ => false,
            };
            choice_correct.insert(*id, correct);
        }

        self.phase = ExamPhase::FillInBlank { choice_correct };
        Ok(())
    }

    /// Scores the batch and commits counters, exactly once per word.
    ///
    /// A word is perfect only when both phases were answered correctly;
    /// every word in the batch gains one attempt either way. Word ids that
    /// no longer resolve are skipped silently.
    ///
    /// # Errors
    ///
    /// Returns `FarmError::WrongPhase` unless phase 1 has been submitted.
    pub fn submit_fill_in_blank(
        &mut self,
        state: &mut GameState,
        answers: &HashMap<WordId, String>,
    ) -> Result<ExamOutcome, FarmError> {
        let ExamPhase::FillInBlank { choice_correct } = &self.phase else {
            return Err(FarmError::WrongPhase);
        };

        let mut outcome = ExamOutcome::default();
        for id in &self.word_ids {
            let Some(word) = state.word(*id) else {
                continue;
            };

            let guess = answers.get(id).map(String::as_str).unwrap_or_default();
            let spelling_correct = answers_match(guess, word.word());
            let choice = choice_correct.get(id).copied().unwrap_or(false);
            let perfect = choice && spelling_correct;

            let result = WordResult {
                word_id: *id,
                word: word.word().to_string(),
                meaning: word.meaning().to_string(),
                choice_correct: choice,
                spelling_correct,
                perfect,
                submitted: normalize_answer(guess),
            };

            if let Some(word) = state.word_mut(*id) {
                word.record_attempt(perfect);
            }
            if perfect {
                outcome.perfect_count += 1;
            }
            outcome.results.push(result);
        }

        self.phase = ExamPhase::Scored;
        Ok(outcome)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use farm_core::model::{FarmState, RowEntry, WordEntry};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn word(id: u32, term: &str, meaning: &str) -> RowEntry {
        RowEntry::Word(
            WordEntry::new(WordId::new(id), term, meaning, vec![]).unwrap(),
        )
    }

    fn big_state() -> GameState {
        let entries = (1..=12)
            .map(|id| word(id, &format!("term{id}"), &format!("meaning{id}")))
            .collect();
        GameState::new(entries, FarmState::new())
    }

    fn batch(ids: &[u32]) -> Vec<WordId> {
        ids.iter().map(|id| WordId::new(*id)).collect()
    }

    fn answers(pairs: &[(u32, &str)]) -> HashMap<WordId, String> {
        pairs
            .iter()
            .map(|(id, text)| (WordId::new(*id), (*text).to_string()))
            .collect()
    }

    #[test]
    fn choice_questions_have_four_unique_options_including_own() {
        let state = big_state();
        let session = ExamSession::review(batch(&[1, 2, 3]));
        let mut rng = StdRng::seed_from_u64(11);

        for question in session.multiple_choice_questions(&state, &mut rng) {
            assert_eq!(question.options.len(), 4);
            let unique: HashSet<_> = question.options.iter().collect();
            assert_eq!(unique.len(), 4);

            let own = state.word(question.word_id).unwrap().meaning();
            assert!(question.options.iter().any(|opt| opt == own));
        }
    }

    #[test]
    fn small_databases_yield_fewer_distractors() {
        let state = GameState::new(
            vec![word(1, "audit", "n.審計"), word(2, "budget", "n.預算")],
            FarmState::new(),
        );
        let session = ExamSession::review(batch(&[1]));
        let mut rng = StdRng::seed_from_u64(11);

        let questions = session.multiple_choice_questions(&state, &mut rng);
        assert_eq!(questions[0].options.len(), 2);
    }

    #[test]
    fn scoring_requires_both_phases_correct() {
        let mut state = big_state();
        let mut session = ExamSession::review(batch(&[1, 2, 3]));

        // A: both right. B: choice right, spelling wrong. C: choice wrong,
        // spelling right.
        session
            .submit_multiple_choice(
                &state,
                &answers(&[(1, "meaning1"), (2, "meaning2"), (3, "meaning99")]),
            )
            .unwrap();
        let outcome = session
            .submit_fill_in_blank(
                &mut state,
                &answers(&[(1, " Term1 "), (2, "nope"), (3, "term3")]),
            )
            .unwrap();

        assert_eq!(outcome.total(), 3);
        assert_eq!(outcome.perfect_count, 1);
        assert!(outcome.results[0].perfect);
        assert!(outcome.results[1].choice_correct && !outcome.results[1].spelling_correct);
        assert!(!outcome.results[2].choice_correct && outcome.results[2].spelling_correct);

        for id in [1, 2, 3] {
            assert_eq!(state.word(WordId::new(id)).unwrap().total_attempts(), 1);
        }
        assert_eq!(state.word(WordId::new(1)).unwrap().correct_count(), 1);
        assert_eq!(state.word(WordId::new(2)).unwrap().correct_count(), 0);
        assert_eq!(state.word(WordId::new(3)).unwrap().correct_count(), 0);
        assert!(session.is_scored());
    }

    #[test]
    fn missing_answers_count_as_wrong_attempts() {
        let mut state = big_state();
        let mut session = ExamSession::review(batch(&[1]));

        session.submit_multiple_choice(&state, &HashMap::new()).unwrap();
        let outcome = session
            .submit_fill_in_blank(&mut state, &HashMap::new())
            .unwrap();

        assert_eq!(outcome.perfect_count, 0);
        assert_eq!(state.word(WordId::new(1)).unwrap().total_attempts(), 1);
        assert_eq!(state.word(WordId::new(1)).unwrap().correct_count(), 0);
    }

    #[test]
    fn dangling_ids_are_skipped_silently() {
        let mut state = big_state();
        let mut session = ExamSession::review(batch(&[1, 99]));

        session
            .submit_multiple_choice(&state, &answers(&[(1, "meaning1")]))
            .unwrap();
        let outcome = session
            .submit_fill_in_blank(&mut state, &answers(&[(1, "term1")]))
            .unwrap();

        assert_eq!(outcome.total(), 1);
        assert_eq!(outcome.perfect_count, 1);
    }

    #[test]
    fn phase_order_is_enforced() {
        let mut state = big_state();
        let mut session = ExamSession::review(batch(&[1]));

        let err = session
            .submit_fill_in_blank(&mut state, &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, FarmError::WrongPhase));

        session.submit_multiple_choice(&state, &HashMap::new()).unwrap();
        let err = session
            .submit_multiple_choice(&state, &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, FarmError::WrongPhase));
    }

    #[test]
    fn scored_session_cannot_be_scored_twice() {
        let mut state = big_state();
        let mut session = ExamSession::review(batch(&[1]));

        session.submit_multiple_choice(&state, &HashMap::new()).unwrap();
        session
            .submit_fill_in_blank(&mut state, &HashMap::new())
            .unwrap();
        let err = session
            .submit_fill_in_blank(&mut state, &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, FarmError::WrongPhase));
        assert_eq!(state.word(WordId::new(1)).unwrap().total_attempts(), 1);
    }
}
