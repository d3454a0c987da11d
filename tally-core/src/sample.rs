//! Validated numeric samples and labeled datasets
//!
//! A `Sample` is built either from a comma-separated text token or from an
//! existing vector. Both paths apply the same rules: every value must be a
//! finite number and there must be at least [`MIN_SAMPLES`] of them.
//! Any non-numeric entry rejects the whole token; nothing is dropped silently.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum number of observations in a sample
pub const MIN_SAMPLES: usize = 3;

/// Error type for sample parsing and validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("empty input")]
    EmptyInput,

    #[error("not a number: '{token}' at position {position}")]
    InvalidToken { token: String, position: usize },

    #[error("not a finite number: '{token}' at position {position}")]
    NonFinite { token: String, position: usize },

    #[error("too few samples: got {got}, need at least {min}")]
    TooFewSamples { got: usize, min: usize },
}

/// Ordered, validated sequence of observations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Sample {
    values: Vec<f64>,
}

impl Sample {
    /// Validate an existing vector of observations
    pub fn new(values: Vec<f64>) -> Result<Self, ParseError> {
        if let Some(position) = values.iter().position(|x| !x.is_finite()) {
            return Err(ParseError::NonFinite {
                token: values[position].to_string(),
                position: position + 1,
            });
        }
        if values.len() < MIN_SAMPLES {
            return Err(ParseError::TooFewSamples {
                got: values.len(),
                min: MIN_SAMPLES,
            });
        }
        Ok(Self { values })
    }

    /// Parse a comma-separated token such as `"1, 2.5, -3e2"`
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        if text.trim().is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let mut values = Vec::new();
        for (i, piece) in text.split(',').enumerate() {
            let token = piece.trim();
            let value: f64 = token.parse().map_err(|_| ParseError::InvalidToken {
                token: token.to_string(),
                position: i + 1,
            })?;
            if !value.is_finite() {
                return Err(ParseError::NonFinite {
                    token: token.to_string(),
                    position: i + 1,
                });
            }
            values.push(value);
        }

        Self::new(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a validated sample
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.values.iter()
    }
}

impl AsRef<[f64]> for Sample {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}

impl TryFrom<Vec<f64>> for Sample {
    type Error = ParseError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<Sample> for Vec<f64> {
    fn from(sample: Sample) -> Self {
        sample.values
    }
}

impl std::str::FromStr for Sample {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A labeled sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub sample: Sample,
}

impl Dataset {
    pub fn new(label: impl Into<String>, sample: Sample) -> Self {
        Self {
            label: label.into(),
            sample,
        }
    }

    /// Parse a labeled text token
    pub fn parse(label: impl Into<String>, text: &str) -> Result<Self, ParseError> {
        Ok(Self::new(label, Sample::parse(text)?))
    }

    /// Build from raw values, validating them
    pub fn from_values(label: impl Into<String>, values: Vec<f64>) -> Result<Self, ParseError> {
        Ok(Self::new(label, Sample::new(values)?))
    }

    pub fn values(&self) -> &[f64] {
        self.sample.values()
    }

    pub fn len(&self) -> usize {
        self.sample.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sample.is_empty()
    }
}
