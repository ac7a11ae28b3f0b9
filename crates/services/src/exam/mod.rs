//! The two-phase assessment over a planted or reviewed batch.

mod outcome;
mod session;

pub use outcome::{ExamOutcome, WordResult};
pub use session::{ChoiceQuestion, ExamMode, ExamSession, FillQuestion};
