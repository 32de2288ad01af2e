//! Error types for the step-pipeline preview engine.
//!
//! This module defines a hierarchy of error types following best practices:
//!
//! - [`FormulaError`] - Formula parameter-contract violations
//! - [`ExecuteError`] - Step execution precondition failures
//! - [`PipelineError`] - Top-level orchestration errors
//! - [`ServerError`] - HTTP server errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Note the two-tier design: missing columns, unknown function names and
//! non-numeric operands are NOT errors — they degrade to sentinel cell
//! values inside the executor. Only precondition failures (empty input,
//! zero-row dataset) and parameter validation failures surface as typed
//! errors.

use thiserror::Error;

// =============================================================================
// Formula Validation Errors
// =============================================================================

/// Violations of a formula's parameter contract.
///
/// Raised before execution; a validation failure blocks only the offending
/// step, never the whole run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// The formula name is not registered (case-insensitive exact match).
    #[error("Unknown formula: {0}")]
    UnknownFormula(String),

    /// Fewer parameters than the formula's required count.
    #[error("Formula '{name}' requires at least {required} parameter(s), got {given}")]
    TooFewParameters {
        name: String,
        required: usize,
        given: usize,
    },

    /// More parameters than the formula declares.
    #[error("Formula '{name}' accepts at most {maximum} parameter(s), got {given}")]
    TooManyParameters {
        name: String,
        maximum: usize,
        given: usize,
    },
}

// =============================================================================
// Step Execution Errors
// =============================================================================

/// Precondition failures during step execution.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// No input datasets were provided.
    #[error("No input datasets provided")]
    EmptyInput,

    /// The designated source dataset has zero rows.
    #[error("Dataset '{0}' has no rows")]
    EmptyDataset(String),

    /// Formula parameter validation failed.
    #[error("Formula validation failed: {0}")]
    Formula(#[from] FormulaError),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Step execution error.
    #[error("Execution error: {0}")]
    Execute(#[from] ExecuteError),

    /// Formula error.
    #[error("Formula error: {0}")]
    Formula(#[from] FormulaError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for formula validation.
pub type FormulaResult<T> = Result<T, FormulaError>;

/// Result type for step execution.
pub type ExecResult<T> = Result<T, ExecuteError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // FormulaError -> ExecuteError -> PipelineError
        let formula_err = FormulaError::UnknownFormula("FOO".into());
        let exec_err: ExecuteError = formula_err.into();
        let pipeline_err: PipelineError = exec_err.into();
        assert!(pipeline_err.to_string().contains("FOO"));

        // ExecuteError -> PipelineError
        let exec_err = ExecuteError::EmptyDataset("sales.csv".into());
        let pipeline_err: PipelineError = exec_err.into();
        assert!(pipeline_err.to_string().contains("sales.csv"));
    }

    #[test]
    fn test_parameter_bound_messages() {
        let err = FormulaError::TooFewParameters {
            name: "ADD".into(),
            required: 2,
            given: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("ADD"));
        assert!(msg.contains("at least 2"));

        let err = FormulaError::TooManyParameters {
            name: "UPPER".into(),
            maximum: 1,
            given: 3,
        };
        assert!(err.to_string().contains("at most 1"));
    }
}
