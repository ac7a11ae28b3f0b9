//! Parsing of the external comma-separated word list.
//!
//! The source is a header row followed by data rows. Each data row is either
//! a WORD row (first two columns carry term and meaning) or a passthrough
//! COMMENT row preserved verbatim for lossless export.

//
// ─── ROW CLASSIFICATION ────────────────────────────────────────────────────────
//

/// A classified source row, in file order (header excluded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRow {
    Word {
        word: String,
        meaning: String,
        columns: Vec<String>,
    },
    Comment {
        raw: String,
    },
}

/// Parses raw tabular text into classified rows.
///
/// The first line is treated as the header and skipped. A data row becomes a
/// comment when it is blank, starts with `#` (optionally after a quote), or
/// is missing either of its first two columns; its original text is kept
/// untouched. Everything else becomes a word row.
#[must_use]
pub fn parse_source(text: &str) -> Vec<SourceRow> {
    text.lines().skip(1).map(classify_row).collect()
}

fn classify_row(line: &str) -> SourceRow {
    if is_comment_line(line) {
        return SourceRow::Comment {
            raw: line.to_string(),
        };
    }

    let columns = split_columns(line);
    let word = columns.first().cloned().unwrap_or_default();
    let meaning = columns.get(1).cloned().unwrap_or_default();

    if word.is_empty() || meaning.is_empty() {
        return SourceRow::Comment {
            raw: line.to_string(),
        };
    }

    SourceRow::Word {
        word,
        meaning,
        columns,
    }
}

fn is_comment_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("\"#")
}

//
// ─── COLUMN SPLITTING ──────────────────────────────────────────────────────────
//

/// Splits one line into cleaned columns. Commas inside double quotes do not
/// split; each column then loses surrounding whitespace and one quote pair.
#[must_use]
pub fn split_columns(line: &str) -> Vec<String> {
    let mut columns = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ',' if !in_quotes => {
                columns.push(clean_column(&current));
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    columns.push(clean_column(&current));
    columns
}

fn clean_column(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };
    unquoted.trim().to_string()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_row_is_skipped() {
        let rows = parse_source("English,Chinese\nbudget,n.預算\n");
        assert_eq!(rows.len(), 1);
        assert!(matches!(rows[0], SourceRow::Word { ref word, .. } if word == "budget"));
    }

    #[test]
    fn blank_and_hash_rows_become_comments() {
        let rows = parse_source("header\n\n# unit 3\n\"#quoted\",x\n");
        assert_eq!(
            rows,
            vec![
                SourceRow::Comment { raw: String::new() },
                SourceRow::Comment {
                    raw: "# unit 3".into()
                },
                SourceRow::Comment {
                    raw: "\"#quoted\",x".into()
                },
            ]
        );
    }

    #[test]
    fn missing_first_or_second_column_becomes_comment() {
        let rows = parse_source("header\n,n.預算\nbudget,\nbudget\n");
        assert!(rows.iter().all(|row| matches!(row, SourceRow::Comment { .. })));
        // Raw text is preserved untouched for passthrough export.
        assert_eq!(
            rows[0],
            SourceRow::Comment {
                raw: ",n.預算".into()
            }
        );
    }

    #[test]
    fn quoted_column_keeps_embedded_comma() {
        let rows = parse_source("header\nbudget,\"n.預算, 款項\"\n");
        match &rows[0] {
            SourceRow::Word { meaning, .. } => assert_eq!(meaning, "n.預算, 款項"),
            SourceRow::Comment { .. } => panic!("expected a word row"),
        }
    }

    #[test]
    fn columns_are_unquoted_and_trimmed() {
        let rows = parse_source("header\n \"fiscal\" , adj.財政的 ,note,\n");
        match &rows[0] {
            SourceRow::Word {
                word,
                meaning,
                columns,
            } => {
                assert_eq!(word, "fiscal");
                assert_eq!(meaning, "adj.財政的");
                assert_eq!(columns, &vec![
                    "fiscal".to_string(),
                    "adj.財政的".to_string(),
                    "note".to_string(),
                    String::new(),
                ]);
            }
            SourceRow::Comment { .. } => panic!("expected a word row"),
        }
    }

    #[test]
    fn split_respects_quoted_commas() {
        let columns = split_columns("\"v.縮減；削減, severely\",curtail");
        assert_eq!(columns, vec!["v.縮減；削減, severely", "curtail"]);
    }

    #[test]
    fn crlf_input_parses_cleanly() {
        let rows = parse_source("header\r\nbudget,n.預算\r\n");
        assert!(matches!(rows[0], SourceRow::Word { ref word, .. } if word == "budget"));
    }

    #[test]
    fn empty_input_yields_no_rows() {
        assert!(parse_source("").is_empty());
    }
}
