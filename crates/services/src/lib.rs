#![forbid(unsafe_code)]

pub mod error;
pub mod exam;
pub mod export_service;
pub mod farm_service;
pub mod selector;
pub mod source;

pub use farm_core::Clock;

pub use error::{FarmError, SourceError};
pub use exam::{
    ChoiceQuestion, ExamMode, ExamOutcome, ExamSession, FillQuestion, WordResult,
};
pub use export_service::{ExportArtifact, ExportService};
pub use farm_service::FarmService;
pub use source::{HttpWordSource, StaticWordSource, WordSource};
