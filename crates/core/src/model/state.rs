use crate::model::ids::WordId;
use crate::model::plot::FarmState;
use crate::model::word::{RowEntry, WordEntry};

//
// ─── GAME STATE ────────────────────────────────────────────────────────────────
//

/// The whole learner state: the merged word database plus the farm grid.
///
/// This is an explicit context value passed into and returned from engine
/// calls; there is no ambient global. Entries keep source order so exports
/// can reproduce the original file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    entries: Vec<RowEntry>,
    farm: FarmState,
}

impl GameState {
    #[must_use]
    pub fn new(entries: Vec<RowEntry>, farm: FarmState) -> Self {
        Self { entries, farm }
    }

    #[must_use]
    pub fn entries(&self) -> &[RowEntry] {
        &self.entries
    }

    #[must_use]
    pub fn farm(&self) -> &FarmState {
        &self.farm
    }

    pub fn farm_mut(&mut self) -> &mut FarmState {
        &mut self.farm
    }

    /// Iterates over the word entries only, in source order.
    pub fn words(&self) -> impl Iterator<Item = &WordEntry> {
        self.entries.iter().filter_map(RowEntry::as_word)
    }

    /// Looks up a word by id. Returns `None` for ids that no longer exist,
    /// e.g. after the source list shrank.
    #[must_use]
    pub fn word(&self, id: WordId) -> Option<&WordEntry> {
        self.words().find(|word| word.id() == id)
    }

    pub fn word_mut(&mut self, id: WordId) -> Option<&mut WordEntry> {
        self.entries
            .iter_mut()
            .filter_map(RowEntry::as_word_mut)
            .find(|word| word.id() == id)
    }

    /// Aggregate progress counters for the whole database.
    #[must_use]
    pub fn statistics(&self) -> Statistics {
        let mut stats = Statistics::default();
        for word in self.words() {
            stats.total_words += 1;
            if word.learned() {
                stats.learned += 1;
            } else {
                stats.unlearned += 1;
            }
            if word.learned()
                && word.total_attempts() > 0
                && word.correct_count() < word.total_attempts()
            {
                stats.needs_review += 1;
            }
        }
        stats
    }
}

//
// ─── STATISTICS ────────────────────────────────────────────────────────────────
//

/// Word counters shown on the farm's status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Statistics {
    pub total_words: usize,
    pub learned: usize,
    pub unlearned: usize,
    pub needs_review: usize,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn word(id: u32, term: &str, learned: bool, correct: u32, total: u32) -> RowEntry {
        RowEntry::Word(
            WordEntry::from_persisted(
                WordId::new(id),
                term,
                format!("meaning of {term}"),
                learned,
                correct,
                total,
                vec![],
            )
            .unwrap(),
        )
    }

    fn comment(raw: &str) -> RowEntry {
        RowEntry::Passthrough(crate::model::word::PassthroughEntry::new(raw))
    }

    #[test]
    fn word_lookup_skips_passthrough_rows() {
        let state = GameState::new(
            vec![comment("# toefl"), word(1, "audit", false, 0, 0)],
            FarmState::new(),
        );
        assert_eq!(state.word(WordId::new(1)).unwrap().word(), "audit");
        assert!(state.word(WordId::new(2)).is_none());
    }

    #[test]
    fn statistics_counts_learned_and_review_buckets() {
        let state = GameState::new(
            vec![
                word(1, "audit", true, 2, 2),   // learned, perfect
                word(2, "budget", true, 1, 3),  // learned, needs review
                word(3, "deficit", false, 0, 0), // unlearned
                comment(""),
            ],
            FarmState::new(),
        );

        let stats = state.statistics();
        assert_eq!(stats.total_words, 3);
        assert_eq!(stats.learned, 2);
        assert_eq!(stats.unlearned, 1);
        assert_eq!(stats.needs_review, 1);
    }

    #[test]
    fn word_mut_allows_in_place_progress() {
        let mut state = GameState::new(vec![word(1, "audit", false, 0, 0)], FarmState::new());
        state.word_mut(WordId::new(1)).unwrap().record_attempt(true);
        assert_eq!(state.word(WordId::new(1)).unwrap().total_attempts(), 1);
    }
}
