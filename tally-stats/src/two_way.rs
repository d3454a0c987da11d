//! Two-way ANOVA, main effects only
//!
//! The error term is the pure within-cell sum of squares. No interaction
//! term is computed, so the design needs more than one observation per cell.

use tally_plugin::prelude::*;
use tally_core::TwoWayAnovaResult;
use crate::factorial::FactorialDesign;
use crate::helpers::{mean, require_finite, squared_deviations_from, sum};
use crate::names;

/// Main-effect sums of squares and F statistics for a validated design
pub fn two_way_anova(design: &FactorialDesign<'_>) -> Result<TwoWayAnovaResult, TallyError> {
    let a = design.levels_a().len();
    let b = design.levels_b().len();
    let n_cell = design.n_per_cell();
    let total_n = design.total_n();

    if total_n <= a * b {
        return Err(TallyError::degenerate_design(format!(
            "error degrees of freedom is 0 ({} values in {} cells)",
            total_n,
            a * b
        ))
        .with_note("main-effects model without interaction needs replicates in every cell"));
    }

    let grand_mean = require_finite(
        design.cells().map(|d| sum(d.values())).sum::<f64>() / total_n as f64,
        "grand mean",
    )?;

    let mut ss_a = 0.0;
    for i in 0..a {
        let row_mean = mean(&design.row_values(i))?;
        ss_a += (n_cell * b) as f64 * (row_mean - grand_mean).powi(2);
    }

    let mut ss_b = 0.0;
    for j in 0..b {
        let column_mean = mean(&design.column_values(j))?;
        ss_b += (n_cell * a) as f64 * (column_mean - grand_mean).powi(2);
    }

    let mut ss_error = 0.0;
    for cell in design.cells() {
        let cell_mean = mean(cell.values())?;
        ss_error += squared_deviations_from(cell.values(), cell_mean);
    }

    let ss_a = require_finite(ss_a, "factor A sum of squares")?;
    let ss_b = require_finite(ss_b, "factor B sum of squares")?;
    let ss_error = require_finite(ss_error, "error sum of squares")?;

    let df_a = a - 1;
    let df_b = b - 1;
    let df_error = total_n - a * b;
    let ms_a = ss_a / df_a as f64;
    let ms_b = ss_b / df_b as f64;
    let ms_error = ss_error / df_error as f64;

    Ok(TwoWayAnovaResult {
        f_a: Statistic::ratio(ms_a, ms_error),
        f_b: Statistic::ratio(ms_b, ms_error),
        ss_a,
        ss_b,
        ss_error,
        df_a,
        df_b,
        df_error,
        ms_a,
        ms_b,
        ms_error,
        levels_a: design.levels_a().to_vec(),
        levels_b: design.levels_b().to_vec(),
        p_value_a: None,
        p_value_b: None,
    })
}

// ============ ANOVA (two-way) ============

pub struct AnovaTwoWay;

static ANOVA_TWO_WAY_EXAMPLES: [&str; 1] =
    ["anova-two-way of Drug-Morning, Drug-Evening, Placebo-Morning, Placebo-Evening"];

static ANOVA_TWO_WAY_RELATED: [&str; 1] = [names::ANOVA_ONE_WAY];

impl AnalysisPlugin for AnovaTwoWay {
    fn meta(&self) -> AnalysisMeta {
        AnalysisMeta {
            name: names::ANOVA_TWO_WAY,
            description: "Two-way ANOVA on main effects; labels must be FactorA-FactorB",
            requires: "one dataset per factor combination, equal sizes",
            returns: "TwoWayAnova",
            examples: &ANOVA_TWO_WAY_EXAMPLES,
            category: "inferential",
            related: &ANOVA_TWO_WAY_RELATED,
        }
    }

    fn run(&self, datasets: &[Dataset], ctx: &AnalysisContext) -> Result<TestResult, TallyError> {
        let design = FactorialDesign::from_datasets(datasets)?;
        let mut result = two_way_anova(&design)?;
        result.p_value_a = ctx.f_p_value(result.f_a, result.df_a, result.df_error);
        result.p_value_b = ctx.f_p_value(result.f_b, result.df_b, result.df_error);
        Ok(TestResult::TwoWayAnova(result))
    }
}
