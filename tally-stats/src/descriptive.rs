//! Descriptive functions: mean, standard deviation

use tally_plugin::prelude::*;
use tally_core::{DescriptiveResult, LabeledValue};
use crate::helpers::{mean, require_datasets, require_finite, squared_deviations_from};
use crate::names;

/// Σ(x − mean)²
pub fn sum_squared_deviation(values: &[f64]) -> Result<f64, TallyError> {
    let m = mean(values)?;
    require_finite(squared_deviations_from(values, m), "sum of squared deviations")
}

/// Variance with the chosen denominator
pub fn variance(values: &[f64], kind: DeviationKind) -> Result<f64, TallyError> {
    let n = values.len();
    if n == 0 {
        return Err(TallyError::validation("Cannot calculate variance of empty list"));
    }
    if kind == DeviationKind::Sample && n == 1 {
        return Err(TallyError::arithmetic(
            "sample standard deviation undefined for n=1",
        ));
    }

    let ssd = sum_squared_deviation(values)?;
    let divisor = match kind {
        DeviationKind::Population => n as f64,
        DeviationKind::Sample => (n - 1) as f64,
    };
    Ok(ssd / divisor)
}

/// Standard deviation at full precision
pub fn standard_deviation(values: &[f64], kind: DeviationKind) -> Result<f64, TallyError> {
    Ok(variance(values, kind)?.sqrt())
}

/// Mean and both standard deviations of a validated sample
///
/// Fails with `ARITHMETIC` when the values are too large for f64 sums.
pub fn describe(sample: &Sample) -> Result<DescriptiveResult, TallyError> {
    let values = sample.values();
    let n = values.len();
    let m = mean(values)?;
    let ssd = require_finite(squared_deviations_from(values, m), "sum of squared deviations")?;
    Ok(DescriptiveResult {
        mean: m,
        sd_population: (ssd / n as f64).sqrt(),
        sd_sample: (ssd / (n - 1) as f64).sqrt(),
        n,
    })
}

fn per_dataset<F>(datasets: &[Dataset], analysis: &str, f: F) -> Result<TestResult, TallyError>
where
    F: Fn(&[f64]) -> Result<f64, TallyError>,
{
    require_datasets(datasets, 1, analysis)?;
    let values = datasets
        .iter()
        .map(|d| {
            f(d.values())
                .map(|value| LabeledValue { label: d.label.clone(), value })
                .map_err(|e| e.for_dataset(d.label.as_str()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TestResult::Descriptive { values })
}

// ============ Mean ============

pub struct Mean;

static MEAN_EXAMPLES: [&str; 1] = ["mean of [1,2,3,4,5] → 3"];

static MEAN_RELATED: [&str; 2] = [names::SAMPLE_STD_DEV, names::POPULATION_STD_DEV];

impl AnalysisPlugin for Mean {
    fn meta(&self) -> AnalysisMeta {
        AnalysisMeta {
            name: names::MEAN,
            description: "Arithmetic mean of each dataset",
            requires: "one or more datasets",
            returns: "Descriptive",
            examples: &MEAN_EXAMPLES,
            category: "descriptive",
            related: &MEAN_RELATED,
        }
    }

    fn run(&self, datasets: &[Dataset], _ctx: &AnalysisContext) -> Result<TestResult, TallyError> {
        per_dataset(datasets, names::MEAN, mean)
    }
}

// ============ Standard Deviation (Sample) ============

pub struct SampleStdDev;

static SAMPLE_SD_EXAMPLES: [&str; 1] = ["sample-std-dev of [1,2,3,4,5] → 1.581"];

static SAMPLE_SD_RELATED: [&str; 2] = [names::POPULATION_STD_DEV, names::MEAN];

impl AnalysisPlugin for SampleStdDev {
    fn meta(&self) -> AnalysisMeta {
        AnalysisMeta {
            name: names::SAMPLE_STD_DEV,
            description: "Sample standard deviation of each dataset (divides by n-1)",
            requires: "one or more datasets",
            returns: "Descriptive",
            examples: &SAMPLE_SD_EXAMPLES,
            category: "descriptive",
            related: &SAMPLE_SD_RELATED,
        }
    }

    fn run(&self, datasets: &[Dataset], _ctx: &AnalysisContext) -> Result<TestResult, TallyError> {
        per_dataset(datasets, names::SAMPLE_STD_DEV, |v| standard_deviation(v, DeviationKind::Sample))
    }
}

// ============ Standard Deviation (Population) ============

pub struct PopulationStdDev;

static POPULATION_SD_EXAMPLES: [&str; 1] = ["population-std-dev of [1,2,3,4,5] → 1.414"];

static POPULATION_SD_RELATED: [&str; 2] = [names::SAMPLE_STD_DEV, names::MEAN];

impl AnalysisPlugin for PopulationStdDev {
    fn meta(&self) -> AnalysisMeta {
        AnalysisMeta {
            name: names::POPULATION_STD_DEV,
            description: "Population standard deviation of each dataset (divides by n)",
            requires: "one or more datasets",
            returns: "Descriptive",
            examples: &POPULATION_SD_EXAMPLES,
            category: "descriptive",
            related: &POPULATION_SD_RELATED,
        }
    }

    fn run(&self, datasets: &[Dataset], _ctx: &AnalysisContext) -> Result<TestResult, TallyError> {
        per_dataset(datasets, names::POPULATION_STD_DEV, |v| standard_deviation(v, DeviationKind::Population))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::assert_close;

    #[test]
    fn test_mean_and_sd_example() {
        let a = Sample::parse("1,2,3,4,5").unwrap();
        let b = Sample::parse("2,3,4,5,6").unwrap();
        let da = describe(&a).unwrap();
        let db = describe(&b).unwrap();
        assert_close(da.mean, 3.0);
        assert_close(db.mean, 4.0);
        assert_eq!(da.rounded(3).sd_population, 1.414);
        assert_eq!(db.rounded(3).sd_population, 1.414);
        assert_eq!(da.rounded(3).sd_sample, 1.581);
        assert_eq!(da.n, 5);
    }

    #[test]
    fn test_constant_sample() {
        let s = Sample::new(vec![7.5; 4]).unwrap();
        let d = describe(&s).unwrap();
        assert_close(d.mean, 7.5);
        assert_eq!(d.sd_population, 0.0);
        assert_eq!(d.sd_sample, 0.0);
    }

    #[test]
    fn test_population_variance_not_larger() {
        let values = [3.0, 9.0, 1.5, 4.0, 12.0];
        let pop = variance(&values, DeviationKind::Population).unwrap();
        let samp = variance(&values, DeviationKind::Sample).unwrap();
        assert!(pop <= samp);
    }

    #[test]
    fn test_shift_and_scale() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let base = standard_deviation(&values, DeviationKind::Sample).unwrap();

        let shifted: Vec<f64> = values.iter().map(|x| x + 1000.0).collect();
        assert_close(standard_deviation(&shifted, DeviationKind::Sample).unwrap(), base);

        let scaled: Vec<f64> = values.iter().map(|x| x * -3.0).collect();
        assert_close(standard_deviation(&scaled, DeviationKind::Sample).unwrap(), 3.0 * base);
    }

    #[test]
    fn test_population_sd_known_value() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_close(standard_deviation(&values, DeviationKind::Population).unwrap(), 2.0);
    }

    #[test]
    fn test_sample_sd_single_value() {
        let err = standard_deviation(&[4.0], DeviationKind::Sample).unwrap_err();
        assert!(err.is(codes::ARITHMETIC));
        assert_eq!(err.message, "sample standard deviation undefined for n=1");
        assert_eq!(standard_deviation(&[4.0], DeviationKind::Population).unwrap(), 0.0);
    }

    #[test]
    fn test_empty_slice() {
        assert!(standard_deviation(&[], DeviationKind::Population).unwrap_err().is(codes::VALIDATION));
        assert!(sum_squared_deviation(&[]).is_err());
    }

    #[test]
    fn test_mean_plugin_per_dataset() {
        let datasets = vec![
            Dataset::parse("G1", "1,2,3,4,5").unwrap(),
            Dataset::parse("G2", "2,3,4,5,6").unwrap(),
        ];
        let result = Mean.run(&datasets, &AnalysisContext::default()).unwrap();
        let values = result.as_descriptive().unwrap();
        assert_eq!(values[0].label, "G1");
        assert_close(values[0].value, 3.0);
        assert_close(values[1].value, 4.0);
    }

    #[test]
    fn test_sd_plugins_keep_full_precision() {
        let datasets = vec![Dataset::parse("G1", "1,2,3,4,5").unwrap()];
        let ctx = AnalysisContext::default();
        let pop = PopulationStdDev.run(&datasets, &ctx).unwrap();
        assert_close(pop.as_descriptive().unwrap()[0].value, 2f64.sqrt());
        let samp = SampleStdDev.run(&datasets, &ctx).unwrap();
        assert_close(samp.as_descriptive().unwrap()[0].value, 2.5f64.sqrt());
    }

    #[test]
    fn test_descriptive_requires_a_dataset() {
        let err = Mean.run(&[], &AnalysisContext::default()).unwrap_err();
        assert!(err.is(codes::INVALID_ARITY));
    }

    #[test]
    fn test_overflowing_values_are_arithmetic_errors() {
        let huge = Sample::parse("1e308, 1.5e308, 1.7e308").unwrap();
        assert!(describe(&huge).unwrap_err().is(codes::ARITHMETIC));

        // mean is 0 but the squared deviations overflow
        let spread = Sample::parse("1e308, -1e308, 0").unwrap();
        let err = describe(&spread).unwrap_err();
        assert!(err.is(codes::ARITHMETIC));
        assert_eq!(err.message, "sum of squared deviations is not finite: the values overflow f64");

        let datasets = vec![Dataset::new("G1", spread)];
        let err = SampleStdDev.run(&datasets, &AnalysisContext::default()).unwrap_err();
        assert!(err.is(codes::ARITHMETIC));
        assert_eq!(err.context.unwrap().dataset.as_deref(), Some("G1"));
    }
}
