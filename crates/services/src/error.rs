//! Shared error types for the services crate.

use thiserror::Error;

use farm_core::model::{PlotError, PlotId};
use storage::repository::StorageError;

/// Errors emitted while fetching the external word list.
///
/// These never fail a load: the farm treats a failed fetch as an empty word
/// source and carries on with whatever progress is stored.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("word source request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("could not read word source file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors emitted by the farm engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FarmError {
    #[error("no seed words available to plant")]
    NoSeeds,
    #[error("unknown plot {0}")]
    UnknownPlot(PlotId),
    #[error("plot {0} has not been planted yet")]
    NotPlanted(PlotId),
    #[error("batch data unavailable")]
    BatchUnavailable,
    #[error("every word in this plot is already at 100%")]
    NothingToReview,
    #[error("answers submitted out of phase")]
    WrongPhase,
    #[error(transparent)]
    Plot(#[from] PlotError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
