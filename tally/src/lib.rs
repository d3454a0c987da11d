//! Tally - group comparison engine
//!
//! Wraps the analysis registry in a facade that validates raw input and runs
//! a batch of requested analyses over one set of datasets.

mod report;

pub use report::{display_value, outcome_to_json, AnalysisReport, Outcome};

use tally_core::{Dataset, DescriptiveResult, TallyError};
use tally_plugin::{AnalysisContext, AnalysisMeta, AnalysisRegistry, DistributionProvider, EngineConfig};
use std::sync::Arc;
use tracing::{debug, warn};

/// Main Tally engine
pub struct Tally {
    registry: Arc<AnalysisRegistry>,
    config: EngineConfig,
    distributions: Option<Arc<dyn DistributionProvider>>,
}

impl Tally {
    pub fn new(registry: AnalysisRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            config: EngineConfig::default(),
            distributions: None,
        }
    }

    pub fn with_standard_library() -> Self {
        Self::new(tally_stats::standard_registry())
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_distributions(mut self, provider: Arc<dyn DistributionProvider>) -> Self {
        self.distributions = Some(provider);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn context(&self) -> AnalysisContext {
        let ctx = AnalysisContext::new(self.config);
        match &self.distributions {
            Some(d) => ctx.with_distributions(d.clone()),
            None => ctx,
        }
    }

    /// Parse one labeled text token into a dataset
    pub fn parse_dataset(&self, label: &str, text: &str) -> Result<Dataset, TallyError> {
        Dataset::parse(label, text).map_err(|e| TallyError::from(e).for_dataset(label))
    }

    /// Parse several labeled tokens; failures are collected, not fatal
    pub fn parse_datasets<'a, I>(&self, inputs: I) -> (Vec<Dataset>, Vec<TallyError>)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut datasets = Vec::new();
        let mut errors = Vec::new();
        for (label, text) in inputs {
            match self.parse_dataset(label, text) {
                Ok(d) => datasets.push(d),
                Err(e) => {
                    warn!(dataset = label, error = %e, "dataset rejected");
                    errors.push(e);
                }
            }
        }
        (datasets, errors)
    }

    /// Full-precision summary of one dataset
    pub fn describe(&self, dataset: &Dataset) -> Result<DescriptiveResult, TallyError> {
        tally_stats::describe(&dataset.sample).map_err(|e| e.for_dataset(dataset.label.as_str()))
    }

    /// Run every requested analysis independently
    ///
    /// Names are matched case-insensitively; a repeated name runs once.
    pub fn analyze<S: AsRef<str>>(&self, datasets: &[Dataset], requested: &[S]) -> AnalysisReport {
        let ctx = self.context();
        let mut report = AnalysisReport::new();

        for name in requested {
            let name = name.as_ref().trim().to_lowercase();
            if report.get(&name).is_some() {
                continue;
            }

            debug!(analysis = %name, datasets = datasets.len(), "running analysis");
            let outcome = self.registry.run(&name, datasets, &ctx);
            if let Err(e) = &outcome {
                warn!(analysis = %name, code = %e.code, "analysis failed: {}", e.message);
            }
            report.push(name, outcome);
        }

        report
    }

    pub fn help(&self, name: &str) -> Option<AnalysisMeta> {
        self.registry.help(name)
    }

    pub fn list_analyses(&self, category: Option<&str>) -> Vec<AnalysisMeta> {
        self.registry.list(category)
    }
}

impl Default for Tally {
    fn default() -> Self {
        Self::with_standard_library()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_core::{codes, DeviationKind, Statistic};

    fn test_tally() -> Tally {
        Tally::with_standard_library()
    }

    fn groups() -> Vec<Dataset> {
        vec![
            Dataset::parse("G1", "1,2,3,4,5").unwrap(),
            Dataset::parse("G2", "2,3,4,5,6").unwrap(),
        ]
    }

    #[test]
    fn test_end_to_end_example() {
        let tally = test_tally();
        let report = tally.analyze(
            &groups(),
            &["mean", "population-std-dev", "t-test", "anova-one-way"],
        );
        assert_eq!(report.len(), 4);
        assert!(!report.has_errors());

        let means = report.get("mean").unwrap().as_ref().unwrap();
        let means = means.as_descriptive().unwrap();
        assert_eq!(means[0].value, 3.0);
        assert_eq!(means[1].value, 4.0);

        let sds = report.get("population-std-dev").unwrap().as_ref().unwrap().rounded(3);
        assert_eq!(sds.as_descriptive().unwrap()[0].value, 1.414);

        let t = report.get("t-test").unwrap().as_ref().unwrap().rounded(3);
        assert_eq!(t.as_t_test().unwrap().t, -1.0);

        let f = report.get("anova-one-way").unwrap().as_ref().unwrap().rounded(3);
        assert_eq!(f.as_one_way().unwrap().f, Statistic::Finite(1.0));
    }

    #[test]
    fn test_failures_do_not_block_other_analyses() {
        let tally = test_tally();
        let report = tally.analyze(&groups(), &["anova-two-way", "mean", "median", "t-test"]);

        let two_way = report.get("anova-two-way").unwrap().as_ref().unwrap_err();
        assert!(two_way.is(codes::MALFORMED_LABEL));
        assert_eq!(two_way.context.as_ref().unwrap().analysis.as_deref(), Some("anova-two-way"));

        let unknown = report.get("median").unwrap().as_ref().unwrap_err();
        assert!(unknown.is(codes::UNKNOWN_ANALYSIS));

        assert!(report.get("mean").unwrap().is_ok());
        assert!(report.get("t-test").unwrap().is_ok());
        assert_eq!(report.succeeded().count(), 2);
        assert_eq!(report.failed().count(), 2);
    }

    #[test]
    fn test_repeated_names_run_once() {
        let report = test_tally().analyze(&groups(), &["Mean", "mean ", "MEAN"]);
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_parse_datasets_collects_errors() {
        let tally = test_tally();
        let (datasets, errors) = tally.parse_datasets(vec![
            ("G1", "1, 2, 3"),
            ("G2", "1, two, 3"),
            ("G3", ""),
            ("G4", "4, 5, 6"),
        ]);
        assert_eq!(datasets.len(), 2);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.is(codes::VALIDATION)));
        assert_eq!(errors[1].message, "empty input");
        assert_eq!(errors[0].context.as_ref().unwrap().dataset.as_deref(), Some("G2"));
    }

    #[test]
    fn test_config_reaches_analyses() {
        let tally = test_tally().with_config(
            EngineConfig::default().with_ttest_deviation(DeviationKind::Population),
        );
        let report = tally.analyze(&groups(), &["t-test"]);
        let t = report.get("t-test").unwrap().as_ref().unwrap();
        assert_eq!(t.as_t_test().unwrap().deviation, DeviationKind::Population);
    }

    struct ConstantDistributions;

    impl DistributionProvider for ConstantDistributions {
        fn t_two_tailed(&self, _t: f64, _df: f64) -> Option<f64> {
            Some(0.3466)
        }

        fn f_upper_tail(&self, _f: f64, _df1: f64, _df2: f64) -> Option<f64> {
            Some(0.3466)
        }
    }

    #[test]
    fn test_distributions_fill_p_values() {
        let tally = test_tally().with_distributions(Arc::new(ConstantDistributions));
        let report = tally.analyze(&groups(), &["t-test", "anova-one-way"]);
        let t = report.get("t-test").unwrap().as_ref().unwrap();
        assert_eq!(t.as_t_test().unwrap().p_value, Some(0.3466));
        let f = report.get("anova-one-way").unwrap().as_ref().unwrap();
        assert_eq!(f.as_one_way().unwrap().p_value, Some(0.3466));
    }

    #[test]
    fn test_report_json() {
        let report = test_tally().analyze(&groups(), &["sample-std-dev", "anova-two-way"]);
        let json = report.to_json(3);
        assert_eq!(json["sample-std-dev"]["result"]["kind"], "descriptive");
        assert_eq!(json["sample-std-dev"]["result"]["values"][0]["value"], 1.581);
        assert_eq!(json["anova-two-way"]["error"]["code"], "MALFORMED_LABEL");
    }

    #[test]
    fn test_describe_and_display() {
        let tally = test_tally();
        let d = tally.describe(&groups()[0]).unwrap();
        assert_eq!(display_value(d.sd_sample, 3), "1.581");
        assert_eq!(display_value(d.mean, 3), "3.000");
    }

    #[test]
    fn test_overflowing_dataset_never_yields_non_finite_results() {
        let tally = test_tally();
        let datasets = vec![
            Dataset::parse("G1", "1e308, 1.5e308, 1.7e308").unwrap(),
            Dataset::parse("G2", "1,2,3").unwrap(),
        ];
        let report = tally.analyze(
            &datasets,
            &["mean", "sample-std-dev", "t-test", "anova-one-way"],
        );
        assert_eq!(report.failed().count(), 4);
        for (_, e) in report.failed() {
            assert!(e.is(codes::ARITHMETIC), "unexpected {}", e);
        }
        assert!(tally.describe(&datasets[0]).unwrap_err().is(codes::ARITHMETIC));

        let json = report.to_json(3).to_string();
        assert!(!json.contains("null"), "{}", json);
    }

    #[test]
    fn test_report_json_with_oversized_decimals() {
        let report = test_tally().analyze(&groups(), &["mean", "t-test"]);
        for decimals in [400, 3_000_000_000] {
            let json = report.to_json(decimals);
            assert_eq!(json["mean"]["result"]["values"][0]["value"], 3.0);
            assert_eq!(json["t-test"]["result"]["t"], -1.0);
            assert!(!json.to_string().contains("null"));
        }
        assert_eq!(display_value(2.0f64.sqrt(), 400), "1.414213562373");
    }
}
