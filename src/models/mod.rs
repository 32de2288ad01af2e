//! Domain models for the step-pipeline preview engine.
//!
//! This module contains the core data structures used throughout the engine:
//!
//! - [`TabularDataset`] - An in-memory table produced by file import
//! - [`ColumnReference`] - A resolved (file, sheet, column) reference
//! - [`WorkflowStep`] - One unit of the user-authored step sequence
//! - [`ProcessedStepResult`] - The materialized preview of one step
//! - [`TableFragment`] - A bounded (columns, rows) slice produced by execution
//!
//! Cell values are `serde_json::Value` and a row is a JSON object mapping
//! column name to value. Datasets are owned by the external file-import
//! collaborator and passed by reference; the engine never mutates them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A single row: column name to cell value.
///
/// Invariant: keys are a subset of the owning dataset's `columns`.
/// A missing key means the cell is absent, not an error.
pub type Row = serde_json::Map<String, Value>;

/// Separator used in UI display paths (`file ▸ sheet ▸ column`).
pub const DISPLAY_SEPARATOR: &str = " ▸ ";

// =============================================================================
// Tabular Dataset
// =============================================================================

/// A secondary sheet of a multi-sheet (Excel-style) dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sheet {
    /// Ordered column names.
    pub columns: Vec<String>,
    /// Row objects; keys are a subset of `columns`.
    pub rows: Vec<Row>,
}

/// An in-memory table supplied by the external file-import collaborator.
///
/// `name` is unique within a working set and is what column references
/// use to designate their source file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TabularDataset {
    /// Dataset name (usually the imported file name).
    pub name: String,
    /// Ordered column names of the primary table.
    pub columns: Vec<String>,
    /// Primary rows.
    pub rows: Vec<Row>,
    /// Named secondary sheets (Excel imports), empty for CSV.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub sheets: HashMap<String, Sheet>,
}

impl TabularDataset {
    /// Create a dataset without sheets.
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows,
            sheets: HashMap::new(),
        }
    }

    /// Wrap an executed step's output as a synthetic dataset, used by the
    /// pipeline runner to chain `function` steps onto the prior step's result.
    pub fn from_fragment(name: impl Into<String>, fragment: TableFragment) -> Self {
        Self {
            name: name.into(),
            columns: fragment.columns,
            rows: fragment.rows,
            sheets: HashMap::new(),
        }
    }

    /// Add a named sheet.
    pub fn with_sheet(mut self, name: impl Into<String>, sheet: Sheet) -> Self {
        self.sheets.insert(name.into(), sheet);
        self
    }

    /// Look up a sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.get(name)
    }
}

// =============================================================================
// Column Reference
// =============================================================================

/// A resolved (file, optional sheet, column) triple derived from a
/// UI-facing display path.
///
/// Invariant: `full_path` is always rebuilt by joining the parts with
/// [`DISPLAY_SEPARATOR`], so parsing well-formed paths is lossless.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnReference {
    /// Short label shown in the UI (the column name).
    pub display_name: String,
    /// Column name inside the source table.
    pub column_name: String,
    /// Source dataset name.
    pub file_name: String,
    /// Sheet name for Excel sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
    /// Normalized display path.
    pub full_path: String,
}

impl ColumnReference {
    /// Build a reference, normalizing `full_path` from the parts.
    pub fn new(
        file_name: impl Into<String>,
        sheet_name: Option<String>,
        column_name: impl Into<String>,
    ) -> Self {
        let file_name = file_name.into();
        let column_name = column_name.into();
        let full_path = match &sheet_name {
            Some(sheet) => format!(
                "{}{sep}{}{sep}{}",
                file_name,
                sheet,
                column_name,
                sep = DISPLAY_SEPARATOR
            ),
            None => format!("{}{}{}", file_name, DISPLAY_SEPARATOR, column_name),
        };
        Self {
            display_name: column_name.clone(),
            column_name,
            file_name,
            sheet_name,
            full_path,
        }
    }
}

// =============================================================================
// Workflow Step
// =============================================================================

/// Lifecycle status of a step, owned by the UI/editor layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Discriminant of a [`WorkflowStep`], used to key the executor's
/// handler registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    Column,
    Function,
    Custom,
    Break,
    Sheet,
}

/// One unit of the user-authored transformation sequence.
///
/// A closed sum type: each variant carries exactly the fields it needs,
/// so there are no runtime "is this field present" checks. The JSON form
/// is the flat tagged object expected by the workflow-storage collaborator:
/// `{ id, type, source, target?, sheet?, parameters?, status, columnReference? }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum WorkflowStep {
    /// Project a single column out of a source dataset.
    Column {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        column_reference: Option<ColumnReference>,
        /// Source column name.
        source: String,
        /// Optional output column; when it differs from `source` the value
        /// is duplicated under both keys, not renamed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
        #[serde(default)]
        status: StepStatus,
    },

    /// Apply a registered formula to operand column(s).
    Function {
        id: String,
        /// Formula name, matched case-insensitively.
        source: String,
        /// Ordered operand parameters (column names or literals).
        #[serde(default)]
        parameters: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
        #[serde(default)]
        status: StepStatus,
    },

    /// Emit a constant value, ignoring input datasets.
    Custom {
        id: String,
        /// Literal text to repeat.
        source: String,
        #[serde(default)]
        status: StepStatus,
    },

    /// Visual divider; echoes the first dataset unchanged.
    Break {
        id: String,
        #[serde(default)]
        status: StepStatus,
    },

    /// Switch to a named sheet of the first dataset.
    Sheet {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sheet: Option<String>,
        #[serde(default)]
        status: StepStatus,
    },
}

impl WorkflowStep {
    /// Stable unique identifier.
    pub fn id(&self) -> &str {
        match self {
            Self::Column { id, .. }
            | Self::Function { id, .. }
            | Self::Custom { id, .. }
            | Self::Break { id, .. }
            | Self::Sheet { id, .. } => id,
        }
    }

    pub fn status(&self) -> StepStatus {
        match self {
            Self::Column { status, .. }
            | Self::Function { status, .. }
            | Self::Custom { status, .. }
            | Self::Break { status, .. }
            | Self::Sheet { status, .. } => *status,
        }
    }

    pub fn kind(&self) -> StepKind {
        match self {
            Self::Column { .. } => StepKind::Column,
            Self::Function { .. } => StepKind::Function,
            Self::Custom { .. } => StepKind::Custom,
            Self::Break { .. } => StepKind::Break,
            Self::Sheet { .. } => StepKind::Sheet,
        }
    }

    /// Create a column step.
    pub fn column(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self::Column {
            id: id.into(),
            column_reference: None,
            source: source.into(),
            target: None,
            status: StepStatus::Pending,
        }
    }

    /// Create a function step.
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        parameters: Vec<String>,
    ) -> Self {
        Self::Function {
            id: id.into(),
            source: name.into(),
            parameters,
            target: None,
            status: StepStatus::Pending,
        }
    }

    /// Create a custom-value step.
    pub fn custom(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Custom {
            id: id.into(),
            source: text.into(),
            status: StepStatus::Pending,
        }
    }
}

// =============================================================================
// Execution Output
// =============================================================================

/// A bounded (columns, rows) slice produced by executing one step.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFragment {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl TableFragment {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The materialized preview of one executed step.
///
/// Created fresh on every pipeline run, never mutated after creation,
/// superseded (not patched) by the next run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedStepResult {
    /// Sampled output rows.
    pub data: Vec<Row>,
    /// Ordered output column names.
    pub columns: Vec<String>,
    /// Number of rows in `data`.
    pub row_count: usize,
    /// Wall-clock execution time.
    pub execution_time_ms: u64,
    /// Rough in-memory size estimate of `data`.
    pub memory_usage_mb: f64,
    /// The sample limit the step ran under.
    pub sample_size: usize,
    /// Position of the step in the executed sequence.
    pub step_index: usize,
}

impl ProcessedStepResult {
    /// Build a result from an executed fragment.
    pub fn from_fragment(
        fragment: &TableFragment,
        step_index: usize,
        sample_size: usize,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            data: fragment.rows.clone(),
            columns: fragment.columns.clone(),
            row_count: fragment.rows.len(),
            execution_time_ms,
            memory_usage_mb: estimate_memory_mb(fragment),
            sample_size,
            step_index,
        }
    }
}

/// Rough per-cell estimate; preview tables are small so precision is
/// not worth a serialization pass.
fn estimate_memory_mb(fragment: &TableFragment) -> f64 {
    let cells = fragment.rows.len() * fragment.columns.len().max(1);
    (cells * 24) as f64 / (1024.0 * 1024.0)
}
