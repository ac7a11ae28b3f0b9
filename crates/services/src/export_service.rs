//! Turning graduated words into a downloadable artifact.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use farm_core::Clock;
use farm_core::export::{export_filename, render_export};
use farm_core::model::{GameState, WordId};

/// A named, fully rendered export ready to hand to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub content: String,
}

/// Renders export artifacts; the clock only names the file.
#[derive(Debug, Clone, Copy)]
pub struct ExportService {
    clock: Clock,
}

impl ExportService {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self { clock }
    }

    /// Renders the current database with the selected ids graduated.
    #[must_use]
    pub fn render(&self, state: &GameState, selected: &HashSet<WordId>) -> ExportArtifact {
        ExportArtifact {
            filename: export_filename(self.clock.now()),
            content: render_export(state.entries(), selected),
        }
    }

    /// Renders and writes the artifact into `dir`, returning the final path.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the file cannot be written.
    pub fn write_to(
        &self,
        dir: &Path,
        state: &GameState,
        selected: &HashSet<WordId>,
    ) -> std::io::Result<PathBuf> {
        let artifact = self.render(state, selected);
        let path = dir.join(&artifact.filename);
        fs::write(&path, artifact.content)?;
        Ok(path)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use farm_core::export::EXPORT_HEADER;
    use farm_core::model::{FarmState, RowEntry, WordEntry};
    use farm_core::time::fixed_clock;

    fn sample_state() -> GameState {
        let entries = vec![RowEntry::Word(
            WordEntry::new(
                WordId::new(1),
                "budget",
                "n.預算",
                vec!["budget".into(), "n.預算".into()],
            )
            .unwrap(),
        )];
        GameState::new(entries, FarmState::new())
    }

    #[test]
    fn artifact_is_named_by_date_and_carries_header() {
        let service = ExportService::new(fixed_clock());
        let artifact = service.render(&sample_state(), &HashSet::new());

        assert_eq!(artifact.filename, "vocabulary_11-14.csv");
        assert!(artifact.content.contains(EXPORT_HEADER));
        assert!(artifact.content.contains("budget,n.預算"));
    }
}
