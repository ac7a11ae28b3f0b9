//! Re-serializing the word database back into the external tabular format.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::model::{RowEntry, WordId};

/// Header line prepended to every export.
pub const EXPORT_HEADER: &str = "English,Chinese,Note/Archive";

/// Marker written into the first free extension column of a graduated row.
pub const ARCHIVE_MARKER: &str = "已畢業";

/// Byte-order mark so external spreadsheet tools re-encode the file as UTF-8.
const BOM: &str = "\u{feff}";

/// Renders the database as CSV text, annotating the selected ("graduated")
/// words and passing every other row through untouched.
///
/// Passthrough rows are emitted verbatim. Word rows re-emit their original
/// columns, quoting a column only when it contains a comma. A graduated row
/// has its first two columns blanked and the marker tag, original term, and
/// original meaning written into three consecutive slots starting at the
/// first free extension column from index 2 (appended at the end when no
/// slot is free). Only the starting slot is required to be free: the two
/// columns after it are overwritten.
#[must_use]
pub fn render_export(entries: &[RowEntry], selected: &HashSet<WordId>) -> String {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    lines.push(EXPORT_HEADER.to_string());

    for entry in entries {
        match entry {
            RowEntry::Passthrough(row) => lines.push(row.raw().to_string()),
            RowEntry::Word(word) => {
                let mut columns = word.raw_row().to_vec();
                if selected.contains(&word.id()) {
                    graduate_columns(&mut columns, word.word(), word.meaning());
                }
                lines.push(join_columns(&columns));
            }
        }
    }

    let mut out = String::from(BOM);
    out.push_str(&lines.join("\r\n"));
    out.push_str("\r\n");
    out
}

/// Export artifact name for the given day, e.g. `vocabulary_08-24.csv`.
#[must_use]
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("vocabulary_{}.csv", now.format("%m-%d"))
}

fn graduate_columns(columns: &mut Vec<String>, term: &str, meaning: &str) {
    if columns.len() < 2 {
        columns.resize(2, String::new());
    }
    columns[0].clear();
    columns[1].clear();

    let slot = (2..columns.len())
        .find(|&i| columns[i].is_empty() || columns[i] == "\"\"")
        .unwrap_or(columns.len());
    if columns.len() < slot + 3 {
        columns.resize(slot + 3, String::new());
    }

    columns[slot] = ARCHIVE_MARKER.to_string();
    columns[slot + 1] = term.to_string();
    columns[slot + 2] = meaning.to_string();
}

fn join_columns(columns: &[String]) -> String {
    columns
        .iter()
        .map(|col| quote_column(col))
        .collect::<Vec<_>>()
        .join(",")
}

fn quote_column(col: &str) -> String {
    if col.contains(',') {
        format!("\"{col}\"")
    } else {
        col.to_string()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
