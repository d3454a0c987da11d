//! Analysis Context

use crate::DistributionProvider;
use tally_core::{DeviationKind, Statistic, DEFAULT_DECIMALS, MAX_DECIMALS};
use std::sync::Arc;

/// Engine settings shared by every analysis in a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Decimals kept in presentation copies
    pub decimals: u32,
    /// Standard deviation fed into the t-test
    pub ttest_deviation: DeviationKind,
}

impl EngineConfig {
    /// Capped at `MAX_DECIMALS`
    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals.min(MAX_DECIMALS);
        self
    }

    pub fn with_ttest_deviation(mut self, kind: DeviationKind) -> Self {
        self.ttest_deviation = kind;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            decimals: DEFAULT_DECIMALS,
            ttest_deviation: DeviationKind::Sample,
        }
    }
}

/// Context passed to plugins for one run
#[derive(Clone, Default)]
pub struct AnalysisContext {
    pub config: EngineConfig,
    pub distributions: Option<Arc<dyn DistributionProvider>>,
}

impl AnalysisContext {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            distributions: None,
        }
    }

    pub fn with_distributions(mut self, provider: Arc<dyn DistributionProvider>) -> Self {
        self.distributions = Some(provider);
        self
    }

    /// Two-tailed p-value for a t statistic, if a provider is attached
    pub fn t_p_value(&self, t: f64, df: usize) -> Option<f64> {
        self.distributions
            .as_ref()
            .and_then(|d| d.t_two_tailed(t, df as f64))
    }

    /// Upper-tail p-value for an F statistic; never asked for non-finite F
    pub fn f_p_value(&self, f: Statistic, df1: usize, df2: usize) -> Option<f64> {
        let f = f.value()?;
        self.distributions
            .as_ref()
            .and_then(|d| d.f_upper_tail(f, df1 as f64, df2 as f64))
    }
}

impl std::fmt::Debug for AnalysisContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisContext")
            .field("config", &self.config)
            .field("distributions", &self.distributions.is_some())
            .finish()
    }
}
