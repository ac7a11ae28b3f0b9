//! Reconciling a freshly parsed source list with persisted progress.

use std::collections::HashMap;

use crate::model::{PassthroughEntry, RowEntry, WordEntry, WordId};
use crate::source::SourceRow;

/// Merges fresh source rows with an optional prior database.
///
/// Word rows receive sequential ids (1..N) in source order. When a prior
/// database exists, progress (`learned`, counters) is copied onto any fresh
/// word whose term text matches a stored word exactly; the fresh id, meaning,
/// and raw columns always win. Comment rows are always taken fresh, and
/// stored words missing from the fresh source are dropped silently.
#[must_use]
pub fn merge(fresh: Vec<SourceRow>, stored: Option<&[RowEntry]>) -> Vec<RowEntry> {
    let prior: HashMap<&str, &WordEntry> = stored
        .unwrap_or_default()
        .iter()
        .filter_map(RowEntry::as_word)
        .map(|word| (word.word(), word))
        .collect();

    let mut next_id: u32 = 1;
    let mut entries = Vec::with_capacity(fresh.len());

    for row in fresh {
        match row {
            SourceRow::Comment { raw } => {
                entries.push(RowEntry::Passthrough(PassthroughEntry::new(raw)));
            }
            SourceRow::Word {
                word,
                meaning,
                columns,
            } => {
                let id = WordId::new(next_id);
                next_id += 1;

                // The parser guarantees non-empty term/meaning; a row that
                // still fails validation degrades to a passthrough row so the
                // export stays lossless.
                let Ok(mut entry) = WordEntry::new(id, word, meaning, columns.clone()) else {
                    next_id -= 1;
                    entries.push(RowEntry::Passthrough(PassthroughEntry::new(
                        columns.join(","),
                    )));
                    continue;
                };

                if let Some(old) = prior.get(entry.word()) {
                    let applied = entry.apply_progress(
                        old.learned(),
                        old.correct_count(),
                        old.total_attempts(),
                    );
                    // Stored entries validated the counter invariant when they
                    // were constructed; on a violation the fresh zeroed state
                    // stands.
                    debug_assert!(applied.is_ok(), "stored counters violate the invariant");
                }
                entries.push(RowEntry::Word(entry));
            }
        }
    }

    entries
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
