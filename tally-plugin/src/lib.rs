//! Tally Plugin System
//!
//! Provides the traits every analysis implements, the registry that
//! dispatches analyses by name, and the per-run context.

mod traits;
mod registry;
mod context;

pub use traits::{AnalysisPlugin, AnalysisMeta, DistributionProvider};
pub use registry::AnalysisRegistry;
pub use context::{AnalysisContext, EngineConfig};

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{
        AnalysisPlugin, AnalysisMeta, AnalysisRegistry, AnalysisContext,
        DistributionProvider, EngineConfig,
    };
    pub use tally_core::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::sync::Arc;
    use tally_core::LabeledValue;

    struct CountAnalysis;

    static COUNT_EXAMPLES: [&str; 1] = ["count → number of values per dataset"];

    impl AnalysisPlugin for CountAnalysis {
        fn meta(&self) -> AnalysisMeta {
            AnalysisMeta {
                name: "count",
                description: "Number of values",
                requires: "one or more datasets",
                returns: "Descriptive",
                examples: &COUNT_EXAMPLES,
                category: "test",
                related: &[],
            }
        }

        fn run(&self, datasets: &[Dataset], _ctx: &AnalysisContext) -> Result<TestResult, TallyError> {
            if datasets.is_empty() {
                return Err(TallyError::invalid_arity("count", "at least 1", 0));
            }
            Ok(TestResult::Descriptive {
                values: datasets
                    .iter()
                    .map(|d| LabeledValue { label: d.label.clone(), value: d.len() as f64 })
                    .collect(),
            })
        }
    }

    struct FixedDistributions;

    impl DistributionProvider for FixedDistributions {
        fn t_two_tailed(&self, _t: f64, _df: f64) -> Option<f64> {
            Some(0.5)
        }

        fn f_upper_tail(&self, _f: f64, _df1: f64, _df2: f64) -> Option<f64> {
            Some(0.25)
        }
    }

    fn dataset(label: &str) -> Dataset {
        Dataset::from_values(label, vec![1.0, 2.0, 3.0]).unwrap()
    }

    #[test]
    fn test_registry_dispatch_is_case_insensitive() {
        let registry = AnalysisRegistry::new().with_analysis(CountAnalysis);
        let result = registry.run("COUNT", &[dataset("a")], &AnalysisContext::default()).unwrap();
        assert_eq!(result.as_descriptive().unwrap()[0].value, 3.0);
    }

    #[test]
    fn test_registry_attaches_analysis_context() {
        let registry = AnalysisRegistry::new().with_analysis(CountAnalysis);
        let err = registry.run("count", &[], &AnalysisContext::default()).unwrap_err();
        assert!(err.is(codes::INVALID_ARITY));
        assert_eq!(err.context.unwrap().analysis.as_deref(), Some("count"));
    }

    #[test]
    fn test_unknown_analysis_suggests() {
        let registry = AnalysisRegistry::new().with_analysis(CountAnalysis);
        let err = registry.run("cou", &[], &AnalysisContext::default()).unwrap_err();
        assert!(err.is(codes::UNKNOWN_ANALYSIS));
        assert!(err.suggestion.unwrap().contains("count"));
    }

    #[test]
    fn test_list_and_help() {
        let registry = AnalysisRegistry::new().with_analysis(CountAnalysis);
        assert_eq!(registry.list(None).len(), 1);
        assert!(registry.list(Some("other")).is_empty());
        assert_eq!(registry.help("count").unwrap().requires, "one or more datasets");
        assert!(registry.help("missing").is_none());
    }

    #[test]
    fn test_context_p_values() {
        let ctx = AnalysisContext::default();
        assert_eq!(ctx.t_p_value(1.0, 4), None);

        let ctx = ctx.with_distributions(Arc::new(FixedDistributions));
        assert_eq!(ctx.t_p_value(1.0, 4), Some(0.5));
        assert_eq!(ctx.f_p_value(Statistic::Finite(2.0), 1, 4), Some(0.25));
        assert_eq!(ctx.f_p_value(Statistic::Infinite, 1, 4), None);
    }

    #[test]
    fn test_engine_config_builders() {
        let config = EngineConfig::default()
            .with_decimals(5)
            .with_ttest_deviation(DeviationKind::Population);
        assert_eq!(config.decimals, 5);
        assert_eq!(config.ttest_deviation, DeviationKind::Population);
        assert_eq!(EngineConfig::default().decimals, 3);
        assert_eq!(EngineConfig::default().with_decimals(400).decimals, 12);
    }
}
