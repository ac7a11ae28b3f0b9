//! Plot-level mastery, derived from per-word accuracy.

use crate::model::{GameState, Plot};

/// True iff the plot holds at least one word and every referenced word has
/// been attempted and sits at or above the mastery threshold.
///
/// Pure and idempotent: callers re-evaluate it whenever progress may have
/// changed. A word id that no longer resolves keeps the plot unmastered.
#[must_use]
pub fn is_plot_mastered(plot: &Plot, state: &GameState) -> bool {
    if plot.word_ids().is_empty() {
        return false;
    }
    plot.word_ids()
        .iter()
        .all(|id| state.word(*id).is_some_and(|word| word.is_accurate()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FarmState, RowEntry, WordEntry, WordId};
    use crate::time::fixed_now;

    fn state_with(words: Vec<(u32, u32, u32)>) -> GameState {
        let entries = words
            .into_iter()
            .map(|(id, correct, total)| {
                RowEntry::Word(
                    WordEntry::from_persisted(
                        WordId::new(id),
                        format!("word{id}"),
                        "meaning",
                        true,
                        correct,
                        total,
                        vec![],
                    )
                    .unwrap(),
                )
            })
            .collect();
        GameState::new(entries, FarmState::new())
    }

    fn planted(ids: &[u32]) -> Plot {
        let mut plot = Plot::new();
        plot.plant(ids.iter().map(|id| WordId::new(*id)).collect(), fixed_now())
            .unwrap();
        plot
    }

    #[test]
    fn empty_plot_is_never_mastered() {
        let state = state_with(vec![(1, 10, 10)]);
        assert!(!is_plot_mastered(&Plot::new(), &state));
    }

    #[test]
    fn mastered_when_every_word_meets_threshold() {
        let state = state_with(vec![(1, 7, 10), (2, 3, 3)]);
        assert!(is_plot_mastered(&planted(&[1, 2]), &state));
    }

    #[test]
    fn one_weak_word_blocks_mastery() {
        let state = state_with(vec![(1, 7, 10), (2, 1, 2)]);
        assert!(!is_plot_mastered(&planted(&[1, 2]), &state));
    }

    #[test]
    fn unattempted_word_blocks_mastery() {
        let state = state_with(vec![(1, 0, 0)]);
        assert!(!is_plot_mastered(&planted(&[1]), &state));
    }

    #[test]
    fn dangling_word_id_blocks_mastery() {
        let state = state_with(vec![(1, 10, 10)]);
        assert!(!is_plot_mastered(&planted(&[1, 42]), &state));
    }
}
