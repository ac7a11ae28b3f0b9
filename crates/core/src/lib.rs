#![forbid(unsafe_code)]

pub mod answer;
pub mod error;
pub mod export;
pub mod mastery;
pub mod merge;
pub mod model;
pub mod source;
pub mod time;

pub use error::Error;
pub use time::Clock;
