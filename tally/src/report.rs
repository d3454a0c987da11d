//! Batch analysis report
//!
//! One entry per requested analysis, in request order. Each entry holds its
//! own outcome; a failed analysis never hides the others.

use serde_json::{json, Value as JsonValue};
use tally_core::{round_to, TallyError, TestResult, MAX_DECIMALS};

/// Outcome of a single requested analysis
pub type Outcome = Result<TestResult, TallyError>;

#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    entries: Vec<(String, Outcome)>,
}

impl AnalysisReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, name: String, outcome: Outcome) {
        self.entries.push((name, outcome));
    }

    pub fn get(&self, name: &str) -> Option<&Outcome> {
        let name = name.trim().to_lowercase();
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, o)| o)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Outcome)> {
        self.entries.iter().map(|(n, o)| (n.as_str(), o))
    }

    pub fn succeeded(&self) -> impl Iterator<Item = (&str, &TestResult)> {
        self.entries
            .iter()
            .filter_map(|(n, o)| o.as_ref().ok().map(|r| (n.as_str(), r)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &TallyError)> {
        self.entries
            .iter()
            .filter_map(|(n, o)| o.as_ref().err().map(|e| (n.as_str(), e)))
    }

    pub fn has_errors(&self) -> bool {
        self.failed().next().is_some()
    }

    /// Presentation form: results rounded, errors as `{"error": {...}}`
    pub fn to_json(&self, decimals: u32) -> JsonValue {
        let mut results = serde_json::Map::new();
        for (name, outcome) in &self.entries {
            results.insert(name.clone(), outcome_to_json(outcome, decimals));
        }
        JsonValue::Object(results)
    }
}

/// One outcome as JSON, rounding at the presentation boundary
pub fn outcome_to_json(outcome: &Outcome, decimals: u32) -> JsonValue {
    match outcome {
        Ok(result) => match serde_json::to_value(result.rounded(decimals)) {
            Ok(value) => json!({ "result": value }),
            Err(e) => json!({ "error": TallyError::new("INTERNAL", e.to_string()) }),
        },
        Err(e) => json!({ "error": e }),
    }
}

/// Round a raw float for display, at most `MAX_DECIMALS` places
pub fn display_value(value: f64, decimals: u32) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    format!("{:.*}", decimals as usize, round_to(value, decimals))
}
