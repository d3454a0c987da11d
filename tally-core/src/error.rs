//! Structured analysis errors
//!
//! Errors never abort a run. They are values attached to the analysis that
//! produced them and carry enough text for a UI to show them directly.

use crate::ParseError;
use serde::{Deserialize, Serialize};

/// Standard error codes (machine-readable)
pub mod codes {
    pub const VALIDATION: &str = "VALIDATION";
    pub const ARITHMETIC: &str = "ARITHMETIC";
    pub const INVALID_ARITY: &str = "INVALID_ARITY";
    pub const DEGENERATE_DESIGN: &str = "DEGENERATE_DESIGN";
    pub const UNDEFINED_RESULT: &str = "UNDEFINED_RESULT";
    // Two-way design preconditions
    pub const MALFORMED_LABEL: &str = "MALFORMED_LABEL";
    pub const INSUFFICIENT_LEVELS: &str = "INSUFFICIENT_LEVELS";
    pub const DUPLICATE_COMBINATION: &str = "DUPLICATE_COMBINATION";
    pub const MISSING_COMBINATION: &str = "MISSING_COMBINATION";
    pub const UNBALANCED_DESIGN: &str = "UNBALANCED_DESIGN";
    pub const UNKNOWN_ANALYSIS: &str = "UNKNOWN_ANALYSIS";
}

/// Where an error occurred
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Analysis that failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,

    /// Dataset the failure points at
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,

    /// Propagation notes
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
}

/// Structured error returned by every analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallyError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Where the error occurred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,
}

impl TallyError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
            context: None,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: set analysis context
    pub fn in_analysis(mut self, analysis: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.analysis = Some(analysis.into());
        self
    }

    /// Builder: set dataset context
    pub fn for_dataset(mut self, dataset: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.dataset = Some(dataset.into());
        self
    }

    /// Builder: add propagation note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.notes.push(note.into());
        self
    }

    /// True if this error carries the given code
    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }

    // ========== Common Error Constructors ==========

    pub fn validation(details: impl Into<String>) -> Self {
        Self::new(codes::VALIDATION, details)
    }

    pub fn arithmetic(details: impl Into<String>) -> Self {
        Self::new(codes::ARITHMETIC, details)
    }

    pub fn invalid_arity(analysis: &str, expected: &str, got: usize) -> Self {
        Self::new(
            codes::INVALID_ARITY,
            format!("{} requires {} groups, got {}", analysis, expected, got),
        )
        .with_suggestion("Select a different number of datasets")
    }

    pub fn degenerate_design(details: impl Into<String>) -> Self {
        Self::new(codes::DEGENERATE_DESIGN, details)
            .with_suggestion("Add more observations per group")
    }

    pub fn undefined_result(details: impl Into<String>) -> Self {
        Self::new(codes::UNDEFINED_RESULT, details)
    }

    pub fn malformed_label(label: &str) -> Self {
        Self::new(
            codes::MALFORMED_LABEL,
            format!("Label '{}' is not of the form FactorA-FactorB", label),
        )
        .with_suggestion("Name two-way datasets like 'Control-Morning'")
        .for_dataset(label)
    }

    pub fn insufficient_levels(factor: &str, got: usize) -> Self {
        Self::new(
            codes::INSUFFICIENT_LEVELS,
            format!("Factor {} needs at least 2 levels, got {}", factor, got),
        )
    }

    pub fn duplicate_combination(a: &str, b: &str) -> Self {
        Self::new(
            codes::DUPLICATE_COMBINATION,
            format!("Combination {}-{} is assigned to more than one dataset", a, b),
        )
        .with_suggestion("Merge the observations into a single dataset per combination")
    }

    pub fn missing_combination(a: &str, b: &str) -> Self {
        Self::new(
            codes::MISSING_COMBINATION,
            format!("Missing dataset for combination {}-{}", a, b),
        )
        .with_suggestion(format!("Add a dataset labeled '{}-{}'", a, b))
    }

    pub fn unbalanced_design(label: &str, expected: usize, got: usize) -> Self {
        Self::new(
            codes::UNBALANCED_DESIGN,
            format!(
                "Dataset '{}' has {} values but every cell must have {}",
                label, got, expected
            ),
        )
        .with_suggestion("Two-way ANOVA needs the same number of values in every cell")
        .for_dataset(label)
    }

    pub fn unknown_analysis(name: &str) -> Self {
        Self::new(codes::UNKNOWN_ANALYSIS, format!("Unknown analysis: {}", name))
    }
}

impl std::fmt::Display for TallyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for TallyError {}

impl From<ParseError> for TallyError {
    fn from(err: ParseError) -> Self {
        let suggestion = match err {
            ParseError::EmptyInput => "Enter comma-separated numbers, e.g. 1, 2, 3",
            ParseError::InvalidToken { .. } | ParseError::NonFinite { .. } => {
                "Remove or correct the non-numeric entry"
            }
            ParseError::TooFewSamples { .. } => "Enter at least 3 values",
        };
        Self::validation(err.to_string()).with_suggestion(suggestion)
    }
}
