//! Independent two-sample t-test
//!
//! Uses the unpooled standard error `sqrt(sd1²/n1 + sd2²/n2)` and reports
//! `n1 + n2 - 2` degrees of freedom. Both standard deviations must be of the
//! same kind (population or sample); that precondition is not checked.

use tally_plugin::prelude::*;
use tally_core::TTestResult;
use crate::descriptive::describe;
use crate::helpers::require_exact_datasets;
use crate::names;

/// Summary statistics of one group
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupSummary {
    pub mean: f64,
    pub sd: f64,
    pub n: usize,
}

impl GroupSummary {
    pub fn new(mean: f64, sd: f64, n: usize) -> Self {
        Self { mean, sd, n }
    }

    /// Summarise a sample with the requested standard deviation kind
    pub fn of(sample: &Sample, kind: DeviationKind) -> Result<Self, TallyError> {
        let d = describe(sample)?;
        Ok(Self::new(d.mean, d.sd(kind), d.n))
    }
}

/// t statistic for two group summaries
pub fn t_test(
    first: &GroupSummary,
    second: &GroupSummary,
    deviation: DeviationKind,
) -> Result<TTestResult, TallyError> {
    if first.n == 0 || second.n == 0 {
        return Err(TallyError::validation(format!("{} requires non-empty groups", names::T_TEST)));
    }

    let mean_diff = first.mean - second.mean;
    let standard_error =
        (first.sd.powi(2) / first.n as f64 + second.sd.powi(2) / second.n as f64).sqrt();

    if !mean_diff.is_finite() || !standard_error.is_finite() {
        return Err(non_finite_t());
    }
    if standard_error == 0.0 {
        return Err(TallyError::undefined_result("zero standard error")
            .with_suggestion("Both groups are constant; the t statistic is undefined"));
    }

    let t = mean_diff / standard_error;
    if !t.is_finite() {
        return Err(non_finite_t());
    }

    Ok(TTestResult {
        t,
        df: first.n + second.n - 2,
        mean_diff,
        standard_error,
        deviation,
        p_value: None,
    })
}

fn non_finite_t() -> TallyError {
    TallyError::undefined_result("t statistic is not finite")
        .with_suggestion("The group statistics overflow f64; rescale the data")
}

// ============ T-Test ============

pub struct TTest;

static T_TEST_EXAMPLES: [&str; 1] = ["t-test of [1,2,3,4,5] vs [2,3,4,5,6] → t = -1, df = 8"];

static T_TEST_RELATED: [&str; 2] = [names::ANOVA_ONE_WAY, names::SAMPLE_STD_DEV];

impl AnalysisPlugin for TTest {
    fn meta(&self) -> AnalysisMeta {
        AnalysisMeta {
            name: names::T_TEST,
            description: "Independent two-sample t-test (unpooled standard error)",
            requires: "exactly two datasets",
            returns: "TTest",
            examples: &T_TEST_EXAMPLES,
            category: "inferential",
            related: &T_TEST_RELATED,
        }
    }

    fn run(&self, datasets: &[Dataset], ctx: &AnalysisContext) -> Result<TestResult, TallyError> {
        require_exact_datasets(datasets, 2, names::T_TEST)?;

        let kind = ctx.config.ttest_deviation;
        let summarise = |d: &Dataset| {
            GroupSummary::of(&d.sample, kind).map_err(|e| e.for_dataset(d.label.as_str()))
        };
        let first = summarise(&datasets[0])?;
        let second = summarise(&datasets[1])?;

        let mut result = t_test(&first, &second, kind)?;
        result.p_value = ctx.t_p_value(result.t, result.df);
        Ok(TestResult::TTest(result))
    }
}
