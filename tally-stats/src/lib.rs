//! Tally Statistics Plugin
//!
//! Descriptive statistics, the independent two-sample t-test, and one- and
//! two-way ANOVA. Every computation is pure f64 arithmetic on validated
//! samples; failures come back as `TallyError` values, never panics.
//!
//! p-values are not computed here. Analyses ask the run's
//! `DistributionProvider`, when one is attached, for the tail probability.

mod helpers;
pub mod descriptive;
pub mod ttest;
pub mod anova;
pub mod factorial;
pub mod two_way;

pub use helpers::mean;
pub use descriptive::{describe, standard_deviation, sum_squared_deviation, variance};
pub use ttest::{t_test, GroupSummary};
pub use anova::one_way_anova;
pub use factorial::{split_label, FactorialDesign};
pub use two_way::two_way_anova;

use tally_plugin::AnalysisRegistry;

/// Analysis names understood by the engine
pub mod names {
    pub const MEAN: &str = "mean";
    pub const SAMPLE_STD_DEV: &str = "sample-std-dev";
    pub const POPULATION_STD_DEV: &str = "population-std-dev";
    pub const T_TEST: &str = "t-test";
    pub const ANOVA_ONE_WAY: &str = "anova-one-way";
    pub const ANOVA_TWO_WAY: &str = "anova-two-way";

    pub const ALL: [&str; 6] = [
        MEAN,
        SAMPLE_STD_DEV,
        POPULATION_STD_DEV,
        T_TEST,
        ANOVA_ONE_WAY,
        ANOVA_TWO_WAY,
    ];
}

/// Load statistics analyses into registry
pub fn load_stats_library(registry: AnalysisRegistry) -> AnalysisRegistry {
    registry
        // Descriptive
        .with_analysis(descriptive::Mean)
        .with_analysis(descriptive::SampleStdDev)
        .with_analysis(descriptive::PopulationStdDev)

        // Inferential
        .with_analysis(ttest::TTest)
        .with_analysis(anova::AnovaOneWay)
        .with_analysis(two_way::AnovaTwoWay)
}

/// Registry holding exactly the standard vocabulary
pub fn standard_registry() -> AnalysisRegistry {
    load_stats_library(AnalysisRegistry::new())
}
