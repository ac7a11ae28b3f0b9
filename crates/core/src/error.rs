use thiserror::Error;

use crate::model::{PlotError, WordError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Word(#[from] WordError),
    #[error(transparent)]
    Plot(#[from] PlotError),
}
