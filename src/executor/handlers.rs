//! Builtin step handlers.

use serde_json::Value;
use std::collections::HashMap;

use crate::error::{ExecResult, ExecuteError, FormulaError};
use crate::executor::{StepContext, StepHandler};
use crate::formula::{transform_registry, Transform};
use crate::models::{Row, TableFragment, TabularDataset, WorkflowStep};

/// Sentinel cell for a column name absent from a row or dataset.
pub fn column_not_found(column: &str) -> Value {
    Value::String(format!("[Column not found: {}]", column))
}

/// Sentinel cell for a function name with no registered transform.
pub fn unknown_function(name: &str) -> Value {
    Value::String(format!("[Unknown function: {}]", name))
}

fn require_rows<'a>(dataset: &'a TabularDataset) -> ExecResult<&'a TabularDataset> {
    if dataset.rows.is_empty() {
        Err(ExecuteError::EmptyDataset(dataset.name.clone()))
    } else {
        Ok(dataset)
    }
}

fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// =============================================================================
// Column
// =============================================================================

/// Projects a single column out of a source dataset.
///
/// The source dataset is the one named by the step's column reference when
/// present, otherwise the first dataset. A row without the source key gets
/// the column-not-found sentinel rather than aborting the run.
pub struct ColumnHandler;

impl StepHandler for ColumnHandler {
    fn execute(&self, ctx: &StepContext<'_>) -> ExecResult<TableFragment> {
        let (reference, source, target) = match ctx.step {
            WorkflowStep::Column {
                column_reference,
                source,
                target,
                ..
            } => (column_reference.as_ref(), source.as_str(), target.as_deref()),
            _ => return Err(ExecuteError::EmptyInput),
        };
        // A target equal to the source is a no-op, not a duplicate column.
        let target = target.filter(|t| *t != source);

        let dataset = reference
            .and_then(|r| ctx.datasets.iter().find(|d| d.name == r.file_name))
            .unwrap_or(&ctx.datasets[0]);
        require_rows(dataset)?;

        let column = reference.map(|r| r.column_name.as_str()).unwrap_or(source);

        let mut columns = vec![source.to_string()];
        if let Some(target) = target {
            columns.push(target.to_string());
        }

        let mut fragment = TableFragment::new(columns);
        for row in dataset.rows.iter().take(ctx.sample_limit) {
            let value = row
                .get(column)
                .cloned()
                .unwrap_or_else(|| column_not_found(column));
            let mut out = Row::new();
            out.insert(source.to_string(), value.clone());
            if let Some(target) = target {
                out.insert(target.to_string(), value);
            }
            fragment.rows.push(out);
        }
        Ok(fragment)
    }
}

// =============================================================================
// Function
// =============================================================================

/// Applies a registered transform to operand column(s) of the first dataset.
///
/// Output schema is fixed at `Input_Column` / `Output_Column` so the UI can
/// render any function step the same way. Missing operand parameters are a
/// typed error; an unregistered function name or a missing operand column
/// degrades to sentinel cells.
pub struct FunctionHandler {
    transforms: HashMap<String, Transform>,
}

impl FunctionHandler {
    pub fn new() -> Self {
        Self {
            transforms: transform_registry(),
        }
    }
}

impl Default for FunctionHandler {
    fn default() -> Self {
        Self::new()
    }
}

const INPUT_COLUMN: &str = "Input_Column";
const OUTPUT_COLUMN: &str = "Output_Column";

impl StepHandler for FunctionHandler {
    fn execute(&self, ctx: &StepContext<'_>) -> ExecResult<TableFragment> {
        let (name, parameters) = match ctx.step {
            WorkflowStep::Function {
                source, parameters, ..
            } => (source, parameters),
            _ => return Err(ExecuteError::EmptyInput),
        };

        let dataset = require_rows(&ctx.datasets[0])?;
        let canonical = name.trim().to_uppercase();
        let transform = self.transforms.get(&canonical).copied();

        let required = match transform {
            Some(t) if t.is_binary() => 2,
            _ => 1,
        };
        if parameters.len() < required {
            return Err(FormulaError::TooFewParameters {
                name: canonical,
                required,
                given: parameters.len(),
            }
            .into());
        }

        let mut fragment =
            TableFragment::new(vec![INPUT_COLUMN.to_string(), OUTPUT_COLUMN.to_string()]);
        for row in dataset.rows.iter().take(ctx.sample_limit) {
            let mut out = Row::new();
            match transform {
                Some(t) if t.is_binary() => {
                    let left = row.get(&parameters[0]);
                    let right = row.get(&parameters[1]);
                    match (left, right) {
                        (Some(left), Some(right)) => {
                            let input = format!(
                                "{}, {}",
                                display_string(left),
                                display_string(right)
                            );
                            out.insert(INPUT_COLUMN.into(), Value::String(input));
                            out.insert(OUTPUT_COLUMN.into(), t.apply_binary(left, right));
                        }
                        (left, _) => {
                            let missing = if left.is_none() {
                                &parameters[0]
                            } else {
                                &parameters[1]
                            };
                            out.insert(INPUT_COLUMN.into(), column_not_found(missing));
                            out.insert(OUTPUT_COLUMN.into(), column_not_found(missing));
                        }
                    }
                }
                Some(t) => match row.get(&parameters[0]) {
                    Some(value) => {
                        out.insert(INPUT_COLUMN.into(), value.clone());
                        out.insert(OUTPUT_COLUMN.into(), t.apply_unary(value));
                    }
                    None => {
                        out.insert(INPUT_COLUMN.into(), column_not_found(&parameters[0]));
                        out.insert(OUTPUT_COLUMN.into(), column_not_found(&parameters[0]));
                    }
                },
                None => {
                    let input = row
                        .get(&parameters[0])
                        .cloned()
                        .unwrap_or_else(|| column_not_found(&parameters[0]));
                    out.insert(INPUT_COLUMN.into(), input);
                    out.insert(OUTPUT_COLUMN.into(), unknown_function(&canonical));
                }
            }
            fragment.rows.push(out);
        }
        Ok(fragment)
    }
}

// =============================================================================
// Custom
// =============================================================================

/// Repeats a literal value for `sample_limit` rows, ignoring input data.
pub struct CustomHandler;

impl StepHandler for CustomHandler {
    fn execute(&self, ctx: &StepContext<'_>) -> ExecResult<TableFragment> {
        let text = match ctx.step {
            WorkflowStep::Custom { source, .. } => source.clone(),
            _ => String::new(),
        };
        let mut fragment =
            TableFragment::new(vec!["Custom_Value".to_string(), "Row_Index".to_string()]);
        for index in 0..ctx.sample_limit {
            let mut out = Row::new();
            out.insert("Custom_Value".into(), Value::String(text.clone()));
            out.insert("Row_Index".into(), Value::Number(((index + 1) as u64).into()));
            fragment.rows.push(out);
        }
        Ok(fragment)
    }
}

// =============================================================================
// Sheet
// =============================================================================

/// Switches the preview to a named sheet of the first dataset, falling
/// back to the primary table when the sheet is absent or unnamed.
pub struct SheetHandler;

impl StepHandler for SheetHandler {
    fn execute(&self, ctx: &StepContext<'_>) -> ExecResult<TableFragment> {
        let dataset = require_rows(&ctx.datasets[0])?;
        let sheet_name = match ctx.step {
            WorkflowStep::Sheet { sheet, .. } => sheet.as_deref(),
            _ => None,
        };
        let (columns, rows) = match sheet_name.and_then(|name| dataset.sheet(name)) {
            Some(sheet) => (sheet.columns.clone(), &sheet.rows),
            None => (dataset.columns.clone(), &dataset.rows),
        };
        Ok(TableFragment {
            columns,
            rows: rows.iter().take(ctx.sample_limit).cloned().collect(),
        })
    }
}

// =============================================================================
// Echo
// =============================================================================

/// Passes the first dataset through unchanged, bounded by the sample
/// limit. Used for break steps and as the fallback for unknown kinds.
pub struct EchoHandler;

impl StepHandler for EchoHandler {
    fn execute(&self, ctx: &StepContext<'_>) -> ExecResult<TableFragment> {
        let dataset = require_rows(&ctx.datasets[0])?;
        Ok(TableFragment {
            columns: dataset.columns.clone(),
            rows: dataset.rows.iter().take(ctx.sample_limit).cloned().collect(),
        })
    }
}
