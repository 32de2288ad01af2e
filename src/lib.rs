//! # Stepstudio - step-pipeline preview engine for tabular data
//!
//! Stepstudio executes user-authored transformation steps over in-memory
//! tabular datasets (CSV and Excel imports) and materializes a bounded
//! preview of every step for live display in an editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Datasets   │────▶│  Resolver   │────▶│  Executor   │────▶│  Previews   │
//! │ (CSV/Excel) │     │ (file▸col)  │     │ (per step)  │     │ (sampled)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stepstudio::{FormulaRegistry, PipelineRunner, TabularDataset, WorkflowStep};
//!
//! #[tokio::main]
//! async fn main() {
//!     let runner = PipelineRunner::new(Arc::new(FormulaRegistry::builtin()));
//!     let datasets = vec![TabularDataset::new("people.csv", vec!["Name".into()], vec![])];
//!     let steps = vec![
//!         WorkflowStep::column("s1", "Name"),
//!         WorkflowStep::function("s2", "UPPER", vec!["Name".into()]),
//!     ];
//!     let report = runner.run(&steps, &datasets, 100).await;
//!     println!("{} step(s) previewed", report.completed_steps());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (TabularDataset, WorkflowStep, ColumnReference)
//! - [`formula`] - Formula catalog, parsing, validation and transforms
//! - [`resolver`] - Display-path to column-reference resolution
//! - [`executor`] - Per-step execution via a handler registry
//! - [`pipeline`] - Sequential runner with chaining and generations
//! - [`preview`] - Selected-columns merge for side-by-side display
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Formula catalog and transforms
pub mod formula;

// Column resolution
pub mod resolver;

// Step execution
pub mod executor;

// Pipeline runner
pub mod pipeline;

// Selected-columns preview
pub mod preview;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ExecuteError, FormulaError, PipelineError, ServerError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    ColumnReference,
    ProcessedStepResult,
    Row,
    Sheet,
    StepKind,
    StepStatus,
    TableFragment,
    TabularDataset,
    WorkflowStep,
    DISPLAY_SEPARATOR,
};

// =============================================================================
// Re-exports - Formulas
// =============================================================================

pub use formula::{
    transform_registry,
    FormulaDefinition,
    FormulaParameter,
    FormulaRegistry,
    ParameterKind,
    ParsedFormula,
    Transform,
    ValidationReport,
};

// =============================================================================
// Re-exports - Resolver
// =============================================================================

pub use resolver::resolve;

// =============================================================================
// Re-exports - Executor
// =============================================================================

pub use executor::{StepContext, StepExecutor, StepHandler};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{PipelineRunner, RunReport, StepFailure, DEFAULT_SAMPLE_SIZE};

// =============================================================================
// Re-exports - Preview
// =============================================================================

pub use preview::{merge_selected_columns, MergedPreview};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{
    error_response,
    ColumnsRequest,
    PreviewRequest,
    PreviewResponse,
    ResponseMetadata,
    StepFailureDto,
    ValidateRequest,
    ValidationResponse,
};

// Server
pub mod server {
    pub use crate::api::server::{app, start_server, AppState};
}
