//! Server configuration from the environment

use tally_core::{DeviationKind, DEFAULT_DECIMALS, MAX_DECIMALS};
use tally_plugin::EngineConfig;
use tracing::warn;

pub const DECIMALS_VAR: &str = "TALLY_DECIMALS";
pub const TTEST_DEVIATION_VAR: &str = "TALLY_TTEST_DEVIATION";

/// Build the engine config from a variable lookup
///
/// Invalid values are logged and replaced by the defaults.
pub fn engine_config<F>(lookup: F) -> EngineConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = EngineConfig::default();

    if let Some(raw) = lookup(DECIMALS_VAR) {
        match raw.trim().parse::<u32>() {
            Ok(d) if d <= MAX_DECIMALS => config = config.with_decimals(d),
            _ => warn!(
                "{}={:?} is not an integer in 0..={}, using {}",
                DECIMALS_VAR, raw, MAX_DECIMALS, DEFAULT_DECIMALS
            ),
        }
    }

    if let Some(raw) = lookup(TTEST_DEVIATION_VAR) {
        match raw.parse::<DeviationKind>() {
            Ok(kind) => config = config.with_ttest_deviation(kind),
            Err(e) => warn!("{}: {}, using sample", TTEST_DEVIATION_VAR, e),
        }
    }

    config
}

/// Engine config from the process environment
pub fn from_env() -> EngineConfig {
    engine_config(|key| std::env::var(key).ok())
}
