//! Tally Core - Fundamental types
//!
//! This crate provides the core types used throughout Tally:
//! - `Sample` / `Dataset`: validated observations, optionally labeled
//! - `TestResult`: analysis results and the `Statistic` sentinel type
//! - `TallyError`: structured, serialisable errors

mod sample;
mod result;
mod error;

pub use sample::{Sample, Dataset, ParseError, MIN_SAMPLES};
pub use result::{
    round_to, DeviationKind, Statistic, DescriptiveResult, LabeledValue,
    TTestResult, OneWayAnovaResult, TwoWayAnovaResult, TestResult, DEFAULT_DECIMALS,
    MAX_DECIMALS,
};
pub use error::{TallyError, ErrorContext, codes};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Sample, Dataset, TestResult, TallyError, Statistic, DeviationKind};
    pub use crate::error::codes;
}
