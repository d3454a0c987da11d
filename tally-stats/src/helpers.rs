//! Helper functions for statistical operations
//!
//! Raw-slice primitives shared by every analysis, plus input checks.

use tally_core::{Dataset, TallyError};

/// Require a minimum number of datasets
pub fn require_datasets(datasets: &[Dataset], min: usize, analysis: &str) -> Result<(), TallyError> {
    if datasets.len() < min {
        return Err(TallyError::invalid_arity(
            analysis,
            &format!("at least {}", min),
            datasets.len(),
        ));
    }
    Ok(())
}

/// Require exactly `count` datasets
pub fn require_exact_datasets(datasets: &[Dataset], count: usize, analysis: &str) -> Result<(), TallyError> {
    if datasets.len() != count {
        return Err(TallyError::invalid_arity(
            analysis,
            &format!("exactly {}", count),
            datasets.len(),
        ));
    }
    Ok(())
}

/// Calculate sum of values
pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Calculate mean of values
pub fn mean(values: &[f64]) -> Result<f64, TallyError> {
    if values.is_empty() {
        return Err(TallyError::validation("Cannot calculate mean of empty list"));
    }
    require_finite(sum(values) / values.len() as f64, "mean")
}

/// Reject an intermediate value that overflowed f64
pub fn require_finite(value: f64, what: &str) -> Result<f64, TallyError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(TallyError::arithmetic(format!("{} is not finite: the values overflow f64", what))
            .with_suggestion("Rescale the data to a smaller magnitude"))
    }
}

/// Σ(x − mean)² around a known mean
pub fn squared_deviations_from(values: &[f64], center: f64) -> f64 {
    values.iter().map(|x| (x - center).powi(2)).sum()
}

#[cfg(test)]
pub(crate) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}
