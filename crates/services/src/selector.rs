//! Choosing which words to plant next.

use rand::Rng;
use rand::seq::SliceRandom;

use farm_core::model::{GameState, MASTERY_THRESHOLD, WordEntry, WordId};

/// A word is eligible for a new batch when it has never been planted, or when
/// it keeps missing after a fair number of tries (three or more attempts with
/// accuracy below the mastery threshold).
#[must_use]
pub fn is_eligible(word: &WordEntry) -> bool {
    if !word.learned() {
        return true;
    }
    word.total_attempts() >= 3 && word.accuracy() < MASTERY_THRESHOLD
}

/// Draws a uniformly random batch of up to `size` eligible word ids.
///
/// Returns fewer ids when the eligible pool is small, and an empty list when
/// nothing is eligible (the caller treats that as "no seeds available").
#[must_use]
pub fn choose_batch<R: Rng + ?Sized>(state: &GameState, size: usize, rng: &mut R) -> Vec<WordId> {
    let mut ids: Vec<WordId> = state
        .words()
        .filter(|word| is_eligible(word))
        .map(WordEntry::id)
        .collect();
    ids.shuffle(rng);
    ids.truncate(size);
    ids
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use farm_core::model::{BATCH_SIZE, FarmState, RowEntry};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn word(id: u32, learned: bool, correct: u32, total: u32) -> RowEntry {
        RowEntry::Word(
            WordEntry::from_persisted(
                WordId::new(id),
                format!("word{id}"),
                "meaning",
                learned,
                correct,
                total,
                vec![],
            )
            .unwrap(),
        )
    }

    fn state_of(entries: Vec<RowEntry>) -> GameState {
        GameState::new(entries, FarmState::new())
    }

    #[test]
    fn unlearned_words_are_eligible() {
        let state = state_of(vec![word(1, false, 0, 0)]);
        assert!(is_eligible(state.word(WordId::new(1)).unwrap()));
    }

    #[test]
    fn weak_learned_words_need_three_attempts() {
        // Two attempts, 0% accuracy: still not eligible for replanting.
        let state = state_of(vec![word(1, true, 0, 2), word(2, true, 0, 3)]);
        assert!(!is_eligible(state.word(WordId::new(1)).unwrap()));
        assert!(is_eligible(state.word(WordId::new(2)).unwrap()));
    }

    #[test]
    fn accurate_learned_words_are_not_eligible() {
        let state = state_of(vec![word(1, true, 7, 10)]);
        assert!(!is_eligible(state.word(WordId::new(1)).unwrap()));
    }

    #[test]
    fn batch_is_bounded_unique_and_eligible() {
        let entries = (1..=30).map(|id| word(id, false, 0, 0)).collect();
        let state = state_of(entries);
        let mut rng = StdRng::seed_from_u64(7);

        let batch = choose_batch(&state, BATCH_SIZE, &mut rng);
        assert_eq!(batch.len(), BATCH_SIZE);

        let unique: HashSet<_> = batch.iter().collect();
        assert_eq!(unique.len(), batch.len());
        assert!(batch
            .iter()
            .all(|id| is_eligible(state.word(*id).unwrap())));
    }

    #[test]
    fn small_pools_return_everything() {
        let state = state_of(vec![word(1, false, 0, 0), word(2, true, 2, 2)]);
        let mut rng = StdRng::seed_from_u64(7);

        let batch = choose_batch(&state, BATCH_SIZE, &mut rng);
        assert_eq!(batch, vec![WordId::new(1)]);
    }

    #[test]
    fn empty_pool_returns_empty_batch() {
        let state = state_of(vec![word(1, true, 3, 3)]);
        let mut rng = StdRng::seed_from_u64(7);
        assert!(choose_batch(&state, BATCH_SIZE, &mut rng).is_empty());
    }
}
