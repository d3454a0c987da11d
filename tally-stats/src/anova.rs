//! One-way ANOVA
//!
//! The grand mean is the pooled mean of every observation, so groups of
//! different sizes are weighted by their size.

use tally_plugin::prelude::*;
use tally_core::OneWayAnovaResult;
use crate::helpers::{mean, require_datasets, require_finite, squared_deviations_from, sum};
use crate::names;

/// Between/within decomposition over raw groups
pub fn one_way_anova(groups: &[&[f64]]) -> Result<OneWayAnovaResult, TallyError> {
    let k = groups.len();
    if k < 2 {
        return Err(TallyError::invalid_arity(names::ANOVA_ONE_WAY, "at least 2", k));
    }
    if groups.iter().any(|g| g.is_empty()) {
        return Err(TallyError::validation(format!(
            "{} requires non-empty groups",
            names::ANOVA_ONE_WAY
        )));
    }

    let total_n: usize = groups.iter().map(|g| g.len()).sum();
    if total_n <= k {
        return Err(TallyError::degenerate_design(format!(
            "within-group degrees of freedom is {} ({} values in {} groups)",
            total_n as i64 - k as i64,
            total_n,
            k
        )));
    }

    let grand_mean = require_finite(
        groups.iter().map(|g| sum(g)).sum::<f64>() / total_n as f64,
        "grand mean",
    )?;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for group in groups {
        let group_mean = mean(group)?;
        ss_between += group.len() as f64 * (group_mean - grand_mean).powi(2);
        ss_within += squared_deviations_from(group, group_mean);
    }
    let ss_between = require_finite(ss_between, "between-group sum of squares")?;
    let ss_within = require_finite(ss_within, "within-group sum of squares")?;

    let df_between = k - 1;
    let df_within = total_n - k;
    let ms_between = ss_between / df_between as f64;
    let ms_within = ss_within / df_within as f64;

    Ok(OneWayAnovaResult {
        f: Statistic::ratio(ms_between, ms_within),
        ss_between,
        ss_within,
        df_between,
        df_within,
        ms_between,
        ms_within,
        grand_mean,
        p_value: None,
    })
}

// ============ ANOVA (one-way) ============

pub struct AnovaOneWay;

static ANOVA_ONE_WAY_EXAMPLES: [&str; 1] = ["anova-one-way of [1,2,3], [4,5,6], [7,8,9] → F = 27"];

static ANOVA_ONE_WAY_RELATED: [&str; 2] = [names::T_TEST, names::ANOVA_TWO_WAY];

impl AnalysisPlugin for AnovaOneWay {
    fn meta(&self) -> AnalysisMeta {
        AnalysisMeta {
            name: names::ANOVA_ONE_WAY,
            description: "One-way analysis of variance across groups",
            requires: "two or more datasets",
            returns: "OneWayAnova",
            examples: &ANOVA_ONE_WAY_EXAMPLES,
            category: "inferential",
            related: &ANOVA_ONE_WAY_RELATED,
        }
    }

    fn run(&self, datasets: &[Dataset], ctx: &AnalysisContext) -> Result<TestResult, TallyError> {
        require_datasets(datasets, 2, names::ANOVA_ONE_WAY)?;

        let groups: Vec<&[f64]> = datasets.iter().map(|d| d.values()).collect();
        let mut result = one_way_anova(&groups)?;
        result.p_value = ctx.f_p_value(result.f, result.df_between, result.df_within);
        Ok(TestResult::OneWayAnova(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptive::describe;
    use crate::helpers::assert_close;
    use crate::ttest::{t_test, GroupSummary};

    #[test]
    fn test_three_groups() {
        let groups: [&[f64]; 3] = [&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0], &[7.0, 8.0, 9.0]];
        let r = one_way_anova(&groups).unwrap();
        assert_close(r.grand_mean, 5.0);
        // group means 2, 5, 8
        assert_close(r.ss_between, 54.0);
        assert_close(r.ss_within, 6.0);
        assert_eq!(r.df_between, 2);
        assert_eq!(r.df_within, 6);
        assert_close(r.ms_between, 27.0);
        assert_close(r.ms_within, 1.0);
        assert_close(r.f.value().unwrap(), 27.0);
    }

    #[test]
    fn test_f_equals_t_squared_for_two_groups() {
        let a = Sample::parse("3.1, 4.7, 5.2, 6.8, 2.9").unwrap();
        let b = Sample::parse("5.5, 7.1, 6.4, 8.0, 6.9").unwrap();
        let anova = one_way_anova(&[a.values(), b.values()]).unwrap();
        let t = t_test(
            &GroupSummary::of(&a, DeviationKind::Sample).unwrap(),
            &GroupSummary::of(&b, DeviationKind::Sample).unwrap(),
            DeviationKind::Sample,
        )
        .unwrap();
        let f = anova.f.value().unwrap();
        assert!((f - t.t * t.t).abs() < 1e-9 * f.max(1.0), "F {} vs t² {}", f, t.t * t.t);
    }

    #[test]
    fn test_pooled_grand_mean_with_unequal_groups() {
        let groups: [&[f64]; 2] = [&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0, 7.0, 8.0]];
        let r = one_way_anova(&groups).unwrap();
        // pooled 36/8, not the mean of means (4.0)
        assert_close(r.grand_mean, 4.5);
        assert_close(r.ss_between, 30.0);
        assert_close(r.ss_within, 12.0);
    }

    #[test]
    fn test_grand_mean_matches_mean_of_means_when_balanced() {
        let a = Sample::parse("1,2,3,4").unwrap();
        let b = Sample::parse("10,20,30,40").unwrap();
        let r = one_way_anova(&[a.values(), b.values()]).unwrap();
        let mean_of_means = (describe(&a).unwrap().mean + describe(&b).unwrap().mean) / 2.0;
        assert_close(r.grand_mean, mean_of_means);
    }

    #[test]
    fn test_zero_within_variance_is_infinite() {
        let groups: [&[f64]; 2] = [&[1.0, 1.0, 1.0], &[2.0, 2.0, 2.0]];
        let r = one_way_anova(&groups).unwrap();
        assert_eq!(r.f, Statistic::Infinite);
    }

    #[test]
    fn test_all_identical_is_undefined() {
        let groups: [&[f64]; 2] = [&[3.0, 3.0, 3.0], &[3.0, 3.0, 3.0]];
        let r = one_way_anova(&groups).unwrap();
        assert_eq!(r.f, Statistic::Undefined);
    }

    #[test]
    fn test_single_group_is_invalid_arity() {
        let groups: [&[f64]; 1] = [&[1.0, 2.0, 3.0]];
        assert!(one_way_anova(&groups).unwrap_err().is(codes::INVALID_ARITY));

        let one = vec![Dataset::parse("G1", "1,2,3").unwrap()];
        let err = AnovaOneWay.run(&one, &AnalysisContext::default()).unwrap_err();
        assert!(err.is(codes::INVALID_ARITY));
    }

    #[test]
    fn test_total_equals_group_count_is_degenerate() {
        let groups: [&[f64]; 3] = [&[1.0], &[2.0], &[3.0]];
        assert!(one_way_anova(&groups).unwrap_err().is(codes::DEGENERATE_DESIGN));
    }

    #[test]
    fn test_empty_group() {
        let groups: [&[f64]; 2] = [&[1.0, 2.0], &[]];
        assert!(one_way_anova(&groups).unwrap_err().is(codes::VALIDATION));
    }

    #[test]
    fn test_overflowing_values_are_arithmetic_errors() {
        let groups: [&[f64]; 2] = [&[1e308, 1.5e308, 1.7e308], &[1.0, 2.0, 3.0]];
        let err = one_way_anova(&groups).unwrap_err();
        assert!(err.is(codes::ARITHMETIC));
        assert_eq!(err.message, "grand mean is not finite: the values overflow f64");

        // finite means, overflowing squared deviations
        let groups: [&[f64]; 2] = [&[1e308, -1e308, 0.0], &[1.0, 2.0, 3.0]];
        assert!(one_way_anova(&groups).unwrap_err().is(codes::ARITHMETIC));
    }
}
