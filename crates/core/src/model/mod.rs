mod ids;
mod plot;
mod state;
mod word;

pub use ids::{ParseIdError, PlotId, WordId};
pub use plot::{BATCH_SIZE, FarmState, PLOT_COUNT, Plot, PlotError};
pub use state::{GameState, Statistics};
pub use word::{MASTERY_THRESHOLD, PassthroughEntry, RowEntry, WordEntry, WordError};
