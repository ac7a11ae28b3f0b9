//! Orchestrates the whole farm: load/merge, planting, reviews, scoring,
//! rollback, and export.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use farm_core::Clock;
use farm_core::mastery::is_plot_mastered;
use farm_core::merge::merge;
use farm_core::model::{BATCH_SIZE, GameState, PlotId, Statistics, WordId};
use farm_core::source::parse_source;
use storage::repository::{Snapshot, Storage};

use crate::error::FarmError;
use crate::exam::{ExamOutcome, ExamSession};
use crate::export_service::{ExportArtifact, ExportService};
use crate::selector::choose_batch;
use crate::source::WordSource;

/// The engine entry points consumed by the (excluded) presentation layer.
///
/// Every call takes the `GameState` explicitly; the service itself holds only
/// collaborators. One session at a time is the caller's responsibility.
#[derive(Clone)]
pub struct FarmService {
    clock: Clock,
    source: Arc<dyn WordSource>,
    storage: Storage,
}

impl FarmService {
    #[must_use]
    pub fn new(source: Arc<dyn WordSource>, storage: Storage) -> Self {
        Self {
            clock: Clock::default_clock(),
            source,
            storage,
        }
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Fetches the source list, merges it with stored progress, and returns
    /// the active state.
    ///
    /// A failed fetch degrades to an empty word list, and a missing or
    /// corrupt snapshot degrades to zeroed progress; neither fails the load.
    ///
    /// # Errors
    ///
    /// Returns `FarmError::Storage` only for adapter failures (I/O,
    /// connection) while reading the snapshot.
    pub async fn load(&self) -> Result<GameState, FarmError> {
        let text = self.source.fetch().await.unwrap_or_default();
        let rows = parse_source(&text);

        let stored = match self.storage.snapshots.load_snapshot().await? {
            Some(snapshot) => snapshot.restore().ok(),
            None => None,
        };

        let entries = merge(rows, stored.as_ref().map(GameState::entries));
        let farm = stored.map(|state| state.farm().clone()).unwrap_or_default();
        Ok(GameState::new(entries, farm))
    }

    /// Plants a fresh batch into an empty plot and opens a learning session.
    ///
    /// The batch is marked learned and the plot planted *before* the exam
    /// runs (and persisted eagerly so an ungraceful exit loses nothing);
    /// abandoning the session rolls all of it back.
    ///
    /// # Errors
    ///
    /// `FarmError::UnknownPlot` for an out-of-range plot,
    /// `FarmError::Plot(AlreadyPlanted)` for a planted one, and
    /// `FarmError::NoSeeds` when nothing is eligible.
    pub async fn plant_batch(
        &self,
        state: &mut GameState,
        plot_id: PlotId,
    ) -> Result<ExamSession, FarmError> {
        let plot = state
            .farm()
            .plot(plot_id)
            .ok_or(FarmError::UnknownPlot(plot_id))?;
        if plot.is_planted() {
            return Err(farm_core::model::PlotError::AlreadyPlanted.into());
        }

        let ids = choose_batch(state, BATCH_SIZE, &mut rand::rng());
        if ids.is_empty() {
            return Err(FarmError::NoSeeds);
        }

        for id in &ids {
            if let Some(word) = state.word_mut(*id) {
                word.set_learned(true);
            }
        }
        let now = self.clock.now();
        state
            .farm_mut()
            .plot_mut(plot_id)
            .ok_or(FarmError::UnknownPlot(plot_id))?
            .plant(ids.clone(), now)?;

        self.persist(state).await?;
        Ok(ExamSession::learning(plot_id, ids))
    }

    /// Opens a review session over a planted plot.
    ///
    /// Word ids that no longer resolve are dropped; only words that are not
    /// yet at 100% are quizzed.
    ///
    /// # Errors
    ///
    /// `FarmError::NotPlanted` for bare plots, `FarmError::BatchUnavailable`
    /// when every id dangles, and `FarmError::NothingToReview` when the
    /// whole batch is already perfect.
    pub fn open_review(
        &self,
        state: &GameState,
        plot_id: PlotId,
    ) -> Result<ExamSession, FarmError> {
        let plot = state
            .farm()
            .plot(plot_id)
            .ok_or(FarmError::UnknownPlot(plot_id))?;
        if !plot.is_planted() {
            return Err(FarmError::NotPlanted(plot_id));
        }

        let resolved: Vec<&farm_core::model::WordEntry> = plot
            .word_ids()
            .iter()
            .filter_map(|id| state.word(*id))
            .collect();
        if resolved.is_empty() {
            return Err(FarmError::BatchUnavailable);
        }

        let to_quiz: Vec<WordId> = resolved
            .iter()
            .filter(|word| {
                word.total_attempts() == 0 || word.correct_count() != word.total_attempts()
            })
            .map(|word| word.id())
            .collect();
        if to_quiz.is_empty() {
            return Err(FarmError::NothingToReview);
        }

        Ok(ExamSession::review(to_quiz))
    }

    /// Phase-1 submission; results stay in the session, nothing persists.
    ///
    /// # Errors
    ///
    /// Returns `FarmError::WrongPhase` when called out of order.
    pub fn submit_multiple_choice(
        &self,
        state: &GameState,
        session: &mut ExamSession,
        answers: &HashMap<WordId, String>,
    ) -> Result<(), FarmError> {
        session.submit_multiple_choice(state, answers)
    }

    /// Phase-2 submission: scores the batch, commits counters once per word,
    /// and persists the full snapshot.
    ///
    /// # Errors
    ///
    /// Returns `FarmError::WrongPhase` when called out of order and storage
    /// errors when the snapshot cannot be written.
    pub async fn submit_fill_in_blank(
        &self,
        state: &mut GameState,
        session: &mut ExamSession,
        answers: &HashMap<WordId, String>,
    ) -> Result<ExamOutcome, FarmError> {
        let outcome = session.submit_fill_in_blank(state, answers)?;
        self.persist(state).await?;
        Ok(outcome)
    }

    /// Abandons a session before it was scored.
    ///
    /// A learning session rolls back its optimistic plant: every batch word
    /// is unmarked, the plot returns to bare dirt, and the rollback is
    /// persisted. Abandoning a review (or an already scored session) changes
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns storage errors when the rollback cannot be persisted.
    pub async fn abandon_session(
        &self,
        state: &mut GameState,
        session: ExamSession,
    ) -> Result<(), FarmError> {
        if session.is_scored() {
            return Ok(());
        }
        let Some(plot_id) = session.plot_id() else {
            return Ok(());
        };

        for id in session.word_ids() {
            if let Some(word) = state.word_mut(*id) {
                word.set_learned(false);
            }
        }
        if let Some(plot) = state.farm_mut().plot_mut(plot_id) {
            plot.reset();
        }
        self.persist(state).await
    }

    /// Renders the export artifact for the given graduated ids.
    #[must_use]
    pub fn request_export(
        &self,
        state: &GameState,
        selected: &HashSet<WordId>,
    ) -> ExportArtifact {
        ExportService::new(self.clock).render(state, selected)
    }

    /// Aggregate counters for the status line.
    #[must_use]
    pub fn statistics(&self, state: &GameState) -> Statistics {
        state.statistics()
    }

    /// Whether the plot's whole batch sits at or above the mastery threshold
    /// (drives the "golden" plot rendering). Unknown plots are not mastered.
    #[must_use]
    pub fn plot_mastered(&self, state: &GameState, plot_id: PlotId) -> bool {
        state
            .farm()
            .plot(plot_id)
            .is_some_and(|plot| is_plot_mastered(plot, state))
    }

    /// Drops all persisted progress ("reset game").
    ///
    /// # Errors
    ///
    /// Returns storage errors when the records cannot be deleted.
    pub async fn clear_progress(&self) -> Result<(), FarmError> {
        self.storage.snapshots.clear().await?;
        Ok(())
    }

    async fn persist(&self, state: &GameState) -> Result<(), FarmError> {
        self.storage
            .snapshots
            .save_snapshot(&Snapshot::capture(state))
            .await?;
        Ok(())
    }
}
