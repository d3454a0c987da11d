//! Plugin traits

use tally_core::{Dataset, TallyError, TestResult};
use crate::AnalysisContext;
use serde::Serialize;

/// Metadata for an analysis plugin
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMeta {
    pub name: &'static str,
    pub description: &'static str,
    /// How many datasets the analysis accepts, in words
    pub requires: &'static str,
    pub returns: &'static str,
    pub examples: &'static [&'static str],
    pub category: &'static str,
    pub related: &'static [&'static str],
}

/// Pure analysis over a set of datasets
pub trait AnalysisPlugin: Send + Sync {
    fn meta(&self) -> AnalysisMeta;
    fn run(&self, datasets: &[Dataset], ctx: &AnalysisContext) -> Result<TestResult, TallyError>;
}

/// Source of p-values for computed test statistics
///
/// Implementations live outside this workspace. Returning `None` means the
/// provider cannot evaluate that combination of arguments.
pub trait DistributionProvider: Send + Sync {
    /// Two-tailed p-value of a Student-t statistic
    fn t_two_tailed(&self, t: f64, df: f64) -> Option<f64>;

    /// Upper-tail p-value of an F statistic
    fn f_upper_tail(&self, f: f64, df1: f64, df2: f64) -> Option<f64>;
}
