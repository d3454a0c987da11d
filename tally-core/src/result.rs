//! Analysis result records
//!
//! Results are plain values handed to the presentation layer. Every number
//! is kept at full precision; `rounded()` produces the display copy.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Default number of decimals in presentation copies
pub const DEFAULT_DECIMALS: u32 = 3;

/// Largest decimals setting accepted for presentation copies
pub const MAX_DECIMALS: u32 = 12;

/// Round to a fixed number of decimal places
///
/// `decimals` is capped at [`MAX_DECIMALS`]. Values that cannot be scaled
/// without overflow are returned unchanged.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let exponent = match i32::try_from(decimals.min(MAX_DECIMALS)) {
        Ok(e) => e,
        Err(_) => return value,
    };
    let factor = 10f64.powi(exponent);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    let rounded = scaled.round() / factor;
    // normalise -0.0
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Which variance denominator to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviationKind {
    /// Divide by n
    Population,
    /// Divide by n - 1
    Sample,
}

impl DeviationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviationKind::Population => "population",
            DeviationKind::Sample => "sample",
        }
    }
}

impl std::str::FromStr for DeviationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "population" | "pop" | "p" => Ok(DeviationKind::Population),
            "sample" | "s" => Ok(DeviationKind::Sample),
            other => Err(format!("unknown deviation kind '{}'", other)),
        }
    }
}

/// A ratio statistic that may be infinite or undefined
///
/// Serialises as a JSON number, or as `"infinite"` / `"undefined"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Statistic {
    Finite(f64),
    /// Positive numerator over a zero denominator
    Infinite,
    /// Zero over zero
    Undefined,
}

impl Statistic {
    /// Divide a non-negative numerator by a non-negative denominator
    ///
    /// Never yields `Finite(NaN)` or `Finite(inf)`: a NaN operand or an
    /// indeterminate quotient is `Undefined`, an unbounded one `Infinite`.
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if numerator.is_nan() || denominator.is_nan() {
            return Statistic::Undefined;
        }
        if denominator == 0.0 {
            return if numerator == 0.0 {
                Statistic::Undefined
            } else {
                Statistic::Infinite
            };
        }

        let quotient = numerator / denominator;
        if quotient.is_nan() {
            Statistic::Undefined
        } else if quotient.is_infinite() {
            Statistic::Infinite
        } else {
            Statistic::Finite(quotient)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Statistic::Finite(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, Statistic::Finite(_))
    }

    pub fn rounded(&self, decimals: u32) -> Self {
        match self {
            Statistic::Finite(v) => Statistic::Finite(round_to(*v, decimals)),
            other => *other,
        }
    }
}

impl std::fmt::Display for Statistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Statistic::Finite(v) => write!(f, "{}", v),
            Statistic::Infinite => write!(f, "infinite"),
            Statistic::Undefined => write!(f, "undefined"),
        }
    }
}

impl Serialize for Statistic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Statistic::Finite(v) => serializer.serialize_f64(*v),
            Statistic::Infinite => serializer.serialize_str("infinite"),
            Statistic::Undefined => serializer.serialize_str("undefined"),
        }
    }
}

impl<'de> Deserialize<'de> for Statistic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(Statistic::Finite(v)),
            Repr::Text(s) => match s.as_str() {
                "infinite" => Ok(Statistic::Infinite),
                "undefined" => Ok(Statistic::Undefined),
                other => Err(serde::de::Error::custom(format!(
                    "invalid statistic '{}'",
                    other
                ))),
            },
        }
    }
}

/// Summary of one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveResult {
    pub mean: f64,
    pub sd_population: f64,
    pub sd_sample: f64,
    pub n: usize,
}

impl DescriptiveResult {
    pub fn sd(&self, kind: DeviationKind) -> f64 {
        match kind {
            DeviationKind::Population => self.sd_population,
            DeviationKind::Sample => self.sd_sample,
        }
    }

    pub fn rounded(&self, decimals: u32) -> Self {
        Self {
            mean: round_to(self.mean, decimals),
            sd_population: round_to(self.sd_population, decimals),
            sd_sample: round_to(self.sd_sample, decimals),
            n: self.n,
        }
    }
}

/// Per-dataset scalar (mean or standard deviation)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledValue {
    pub label: String,
    pub value: f64,
}

/// Independent two-sample t-test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TTestResult {
    pub t: f64,
    pub df: usize,
    pub mean_diff: f64,
    pub standard_error: f64,
    /// Standard deviation kind both groups were summarised with
    pub deviation: DeviationKind,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub p_value: Option<f64>,
}

impl TTestResult {
    pub fn rounded(&self, decimals: u32) -> Self {
        Self {
            t: round_to(self.t, decimals),
            mean_diff: round_to(self.mean_diff, decimals),
            standard_error: round_to(self.standard_error, decimals),
            ..self.clone()
        }
    }
}

/// One-way ANOVA table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneWayAnovaResult {
    pub f: Statistic,
    pub ss_between: f64,
    pub ss_within: f64,
    pub df_between: usize,
    pub df_within: usize,
    pub ms_between: f64,
    pub ms_within: f64,
    pub grand_mean: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub p_value: Option<f64>,
}

impl OneWayAnovaResult {
    pub fn rounded(&self, decimals: u32) -> Self {
        Self {
            f: self.f.rounded(decimals),
            ss_between: round_to(self.ss_between, decimals),
            ss_within: round_to(self.ss_within, decimals),
            ms_between: round_to(self.ms_between, decimals),
            ms_within: round_to(self.ms_within, decimals),
            grand_mean: round_to(self.grand_mean, decimals),
            ..self.clone()
        }
    }
}

/// Two-way ANOVA, main effects only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoWayAnovaResult {
    pub f_a: Statistic,
    pub f_b: Statistic,
    pub ss_a: f64,
    pub ss_b: f64,
    pub ss_error: f64,
    pub df_a: usize,
    pub df_b: usize,
    pub df_error: usize,
    pub ms_a: f64,
    pub ms_b: f64,
    pub ms_error: f64,
    pub levels_a: Vec<String>,
    pub levels_b: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub p_value_a: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub p_value_b: Option<f64>,
}

impl TwoWayAnovaResult {
    pub fn rounded(&self, decimals: u32) -> Self {
        Self {
            f_a: self.f_a.rounded(decimals),
            f_b: self.f_b.rounded(decimals),
            ss_a: round_to(self.ss_a, decimals),
            ss_b: round_to(self.ss_b, decimals),
            ss_error: round_to(self.ss_error, decimals),
            ms_a: round_to(self.ms_a, decimals),
            ms_b: round_to(self.ms_b, decimals),
            ms_error: round_to(self.ms_error, decimals),
            ..self.clone()
        }
    }
}

/// Result of one requested analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TestResult {
    /// One value per dataset (mean, standard deviations)
    Descriptive { values: Vec<LabeledValue> },
    TTest(TTestResult),
    OneWayAnova(OneWayAnovaResult),
    TwoWayAnova(TwoWayAnovaResult),
}

impl TestResult {
    /// Presentation copy; p-values are left untouched
    pub fn rounded(&self, decimals: u32) -> Self {
        match self {
            TestResult::Descriptive { values } => TestResult::Descriptive {
                values: values
                    .iter()
                    .map(|v| LabeledValue {
                        label: v.label.clone(),
                        value: round_to(v.value, decimals),
                    })
                    .collect(),
            },
            TestResult::TTest(r) => TestResult::TTest(r.rounded(decimals)),
            TestResult::OneWayAnova(r) => TestResult::OneWayAnova(r.rounded(decimals)),
            TestResult::TwoWayAnova(r) => TestResult::TwoWayAnova(r.rounded(decimals)),
        }
    }

    pub fn as_descriptive(&self) -> Option<&[LabeledValue]> {
        match self {
            TestResult::Descriptive { values } => Some(values),
            _ => None,
        }
    }

    pub fn as_t_test(&self) -> Option<&TTestResult> {
        match self {
            TestResult::TTest(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_one_way(&self) -> Option<&OneWayAnovaResult> {
        match self {
            TestResult::OneWayAnova(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_two_way(&self) -> Option<&TwoWayAnovaResult> {
        match self {
            TestResult::TwoWayAnova(r) => Some(r),
            _ => None,
        }
    }

    /// Kind tag as serialised
    pub fn kind(&self) -> &'static str {
        match self {
            TestResult::Descriptive { .. } => "descriptive",
            TestResult::TTest(_) => "t-test",
            TestResult::OneWayAnova(_) => "one-way-anova",
            TestResult::TwoWayAnova(_) => "two-way-anova",
        }
    }
}
