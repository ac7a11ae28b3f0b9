use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{PlotId, WordId};

/// Number of plots in the farm grid (5x5 in the reference deployment).
pub const PLOT_COUNT: usize = 25;

/// Maximum number of words planted together in one plot.
pub const BATCH_SIZE: usize = 10;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlotError {
    #[error("batch of {len} words exceeds the plot capacity of {BATCH_SIZE}")]
    BatchTooLarge { len: usize },

    #[error("cannot plant an empty batch")]
    EmptyBatch,

    #[error("plot is already planted")]
    AlreadyPlanted,
}

//
// ─── PLOT ──────────────────────────────────────────────────────────────────────
//

/// One plot of the farm: either bare dirt or a planted batch of word ids.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Plot {
    is_planted: bool,
    word_ids: Vec<WordId>,
    plant_date: Option<DateTime<Utc>>,
}

impl Plot {
    /// Creates an unplanted plot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a plot from persisted fields, normalizing inconsistent
    /// state: an unplanted plot always carries an empty batch.
    #[must_use]
    pub fn from_persisted(
        is_planted: bool,
        mut word_ids: Vec<WordId>,
        plant_date: Option<DateTime<Utc>>,
    ) -> Self {
        if !is_planted {
            word_ids.clear();
        }
        word_ids.truncate(BATCH_SIZE);
        Self {
            is_planted,
            word_ids,
            plant_date: if is_planted { plant_date } else { None },
        }
    }

    // Accessors
    #[must_use]
    pub fn is_planted(&self) -> bool {
        self.is_planted
    }

    #[must_use]
    pub fn word_ids(&self) -> &[WordId] {
        &self.word_ids
    }

    #[must_use]
    pub fn plant_date(&self) -> Option<DateTime<Utc>> {
        self.plant_date
    }

    /// Plants a batch of words into this plot.
    ///
    /// # Errors
    ///
    /// Returns `PlotError::AlreadyPlanted` if the plot holds a batch,
    /// `PlotError::EmptyBatch` for an empty id list, and
    /// `PlotError::BatchTooLarge` past the plot capacity.
    pub fn plant(&mut self, word_ids: Vec<WordId>, at: DateTime<Utc>) -> Result<(), PlotError> {
        if self.is_planted {
            return Err(PlotError::AlreadyPlanted);
        }
        if word_ids.is_empty() {
            return Err(PlotError::EmptyBatch);
        }
        if word_ids.len() > BATCH_SIZE {
            return Err(PlotError::BatchTooLarge {
                len: word_ids.len(),
            });
        }

        self.is_planted = true;
        self.word_ids = word_ids;
        self.plant_date = Some(at);
        Ok(())
    }

    /// Reverts the plot to bare dirt (abandoned learning session).
    pub fn reset(&mut self) {
        self.is_planted = false;
        self.word_ids.clear();
        self.plant_date = None;
    }
}

//
// ─── FARM STATE ────────────────────────────────────────────────────────────────
//

/// The fixed grid of plots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FarmState {
    plots: Vec<Plot>,
}

impl Default for FarmState {
    fn default() -> Self {
        Self::new()
    }
}

impl FarmState {
    /// Creates a farm of `PLOT_COUNT` unplanted plots.
    #[must_use]
    pub fn new() -> Self {
        Self {
            plots: vec![Plot::new(); PLOT_COUNT],
        }
    }

    /// Rebuilds a farm from a persisted plot list, padding or truncating
    /// back to the fixed grid size.
    #[must_use]
    pub fn from_plots(mut plots: Vec<Plot>) -> Self {
        plots.resize(PLOT_COUNT, Plot::new());
        Self { plots }
    }

    #[must_use]
    pub fn plots(&self) -> &[Plot] {
        &self.plots
    }

    #[must_use]
    pub fn plot(&self, id: PlotId) -> Option<&Plot> {
        self.plots.get(id.index())
    }

    pub fn plot_mut(&mut self, id: PlotId) -> Option<&mut Plot> {
        self.plots.get_mut(id.index())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
