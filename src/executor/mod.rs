//! Single-step execution.
//!
//! [`StepExecutor`] executes one [`WorkflowStep`] against a set of input
//! datasets, producing a bounded [`TableFragment`]. Dispatch goes through
//! a handler registry keyed by [`StepKind`], so adding a step kind is a
//! registration call rather than a new arm in a dispatcher.
//!
//! Failure semantics are two-tier: missing columns, unknown function
//! names and non-numeric operands degrade to sentinel cell values (a
//! single malformed step must not blank the whole preview), while an
//! empty dataset list or a zero-row source dataset is a typed
//! precondition error that propagates to the caller.

mod handlers;

pub use handlers::{
    column_not_found, unknown_function, ColumnHandler, CustomHandler, EchoHandler,
    FunctionHandler, SheetHandler,
};

use std::collections::HashMap;

use crate::error::{ExecResult, ExecuteError};
use crate::models::{StepKind, TableFragment, TabularDataset, WorkflowStep};

/// Everything a handler needs to execute one step.
pub struct StepContext<'a> {
    pub step: &'a WorkflowStep,
    pub datasets: &'a [TabularDataset],
    pub sample_limit: usize,
}

/// One step-kind's execution behavior.
pub trait StepHandler: Send + Sync {
    fn execute(&self, ctx: &StepContext<'_>) -> ExecResult<TableFragment>;
}

/// Executes single steps via a registry of [`StepHandler`]s.
pub struct StepExecutor {
    handlers: HashMap<StepKind, Box<dyn StepHandler>>,
    fallback: EchoHandler,
}

impl StepExecutor {
    /// Executor with the builtin handler set.
    pub fn new() -> Self {
        let mut executor = Self {
            handlers: HashMap::new(),
            fallback: EchoHandler,
        };
        executor.register_handler(StepKind::Column, Box::new(ColumnHandler));
        executor.register_handler(StepKind::Function, Box::new(FunctionHandler::new()));
        executor.register_handler(StepKind::Custom, Box::new(CustomHandler));
        executor.register_handler(StepKind::Sheet, Box::new(SheetHandler));
        executor.register_handler(StepKind::Break, Box::new(EchoHandler));
        executor
    }

    /// Replace or add the handler for a step kind.
    pub fn register_handler(&mut self, kind: StepKind, handler: Box<dyn StepHandler>) {
        self.handlers.insert(kind, handler);
    }

    /// Execute one step. `sample_limit` bounds the produced row count.
    pub fn execute(
        &self,
        step: &WorkflowStep,
        datasets: &[TabularDataset],
        sample_limit: usize,
    ) -> ExecResult<TableFragment> {
        if datasets.is_empty() {
            return Err(ExecuteError::EmptyInput);
        }
        let ctx = StepContext {
            step,
            datasets,
            sample_limit,
        };
        match self.handlers.get(&step.kind()) {
            Some(handler) => handler.execute(&ctx),
            // Unrecognized kinds echo the first dataset unchanged.
            None => self.fallback.execute(&ctx),
        }
    }
}

impl Default for StepExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnReference, Row, Sheet, StepStatus};
    use serde_json::{json, Value};

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn people() -> TabularDataset {
        TabularDataset::new(
            "people.csv",
            vec!["Name".into(), "Age".into()],
            vec![
                row(&[("Name", json!("ann")), ("Age", json!("34"))]),
                row(&[("Name", json!("bob")), ("Age", json!("27"))]),
                row(&[("Age", json!("61"))]), // Name absent in this row
            ],
        )
    }

    #[test]
    fn test_empty_input_is_precondition_failure() {
        let executor = StepExecutor::new();
        let step = WorkflowStep::column("s1", "Name");
        let err = executor.execute(&step, &[], 10).unwrap_err();
        assert!(matches!(err, ExecuteError::EmptyInput));
    }

    #[test]
    fn test_zero_row_dataset_is_precondition_failure() {
        let executor = StepExecutor::new();
        let empty = TabularDataset::new("empty.csv", vec!["A".into()], Vec::new());
        let step = WorkflowStep::column("s1", "A");
        let err = executor.execute(&step, &[empty], 10).unwrap_err();
        assert!(matches!(err, ExecuteError::EmptyDataset(name) if name == "empty.csv"));
    }

    #[test]
    fn test_column_step_projects_and_samples() {
        let executor = StepExecutor::new();
        let step = WorkflowStep::column("s1", "Name");
        let fragment = executor.execute(&step, &[people()], 2).unwrap();
        assert_eq!(fragment.columns, vec!["Name"]);
        assert_eq!(fragment.rows.len(), 2);
        assert_eq!(fragment.rows[0]["Name"], json!("ann"));
    }

    #[test]
    fn test_column_step_missing_cell_gets_sentinel() {
        let executor = StepExecutor::new();
        let step = WorkflowStep::column("s1", "Name");
        let fragment = executor.execute(&step, &[people()], 10).unwrap();
        assert_eq!(
            fragment.rows[2]["Name"],
            json!("[Column not found: Name]")
        );
    }

    #[test]
    fn test_column_step_target_duplicates_value() {
        let executor = StepExecutor::new();
        let step = WorkflowStep::Column {
            id: "s1".into(),
            column_reference: None,
            source: "Name".into(),
            target: Some("Full Name".into()),
            status: StepStatus::Pending,
        };
        let fragment = executor.execute(&step, &[people()], 1).unwrap();
        assert_eq!(fragment.columns, vec!["Name", "Full Name"]);
        // Both keys coexist with the same value; this is a duplicate, not a rename.
        assert_eq!(fragment.rows[0]["Name"], json!("ann"));
        assert_eq!(fragment.rows[0]["Full Name"], json!("ann"));
    }

    #[test]
    fn test_column_step_prefers_referenced_dataset() {
        let executor = StepExecutor::new();
        let other = TabularDataset::new(
            "other.csv",
            vec!["Name".into()],
            vec![row(&[("Name", json!("zoe"))])],
        );
        let step = WorkflowStep::Column {
            id: "s1".into(),
            column_reference: Some(ColumnReference::new("other.csv", None, "Name")),
            source: "Name".into(),
            target: None,
            status: StepStatus::Pending,
        };
        let fragment = executor
            .execute(&step, &[people(), other], 10)
            .unwrap();
        assert_eq!(fragment.rows.len(), 1);
        assert_eq!(fragment.rows[0]["Name"], json!("zoe"));
    }

    #[test]
    fn test_function_step_unary() {
        let executor = StepExecutor::new();
        let step = WorkflowStep::function("s1", "UPPER", vec!["Name".into()]);
        let fragment = executor.execute(&step, &[people()], 2).unwrap();
        assert_eq!(fragment.columns, vec!["Input_Column", "Output_Column"]);
        assert_eq!(fragment.rows[0]["Input_Column"], json!("ann"));
        assert_eq!(fragment.rows[0]["Output_Column"], json!("ANN"));
    }

    #[test]
    fn test_function_step_binary() {
        let executor = StepExecutor::new();
        let prices = TabularDataset::new(
            "prices.csv",
            vec!["A".into(), "B".into()],
            vec![row(&[("A", json!("2")), ("B", json!("3"))])],
        );
        let step = WorkflowStep::function("s1", "ADD", vec!["A".into(), "B".into()]);
        let fragment = executor.execute(&step, &[prices], 10).unwrap();
        assert_eq!(fragment.rows[0]["Output_Column"], json!(5.0));
        assert_eq!(fragment.rows[0]["Input_Column"], json!("2, 3"));
    }

    #[test]
    fn test_function_step_unknown_name_gets_sentinel() {
        let executor = StepExecutor::new();
        let step = WorkflowStep::function("s1", "FROBNICATE", vec!["Name".into()]);
        let fragment = executor.execute(&step, &[people()], 1).unwrap();
        assert_eq!(
            fragment.rows[0]["Output_Column"],
            json!("[Unknown function: FROBNICATE]")
        );
    }

    #[test]
    fn test_function_step_without_parameters_is_rejected() {
        let executor = StepExecutor::new();
        let step = WorkflowStep::function("s1", "UPPER", Vec::new());
        let err = executor.execute(&step, &[people()], 1).unwrap_err();
        assert!(matches!(err, ExecuteError::Formula(_)));
    }

    #[test]
    fn test_custom_step_ignores_datasets() {
        let executor = StepExecutor::new();
        let step = WorkflowStep::custom("s1", "fixed");
        let fragment = executor.execute(&step, &[people()], 3).unwrap();
        assert_eq!(fragment.columns, vec!["Custom_Value", "Row_Index"]);
        assert_eq!(fragment.rows.len(), 3);
        assert_eq!(fragment.rows[0]["Custom_Value"], json!("fixed"));
        assert_eq!(fragment.rows[0]["Row_Index"], json!(1));
        assert_eq!(fragment.rows[2]["Row_Index"], json!(3));
    }

    #[test]
    fn test_sheet_step_switches_sheet() {
        let executor = StepExecutor::new();
        let dataset = people().with_sheet(
            "Extra",
            Sheet {
                columns: vec!["City".into()],
                rows: vec![row(&[("City", json!("Oslo"))])],
            },
        );
        let step = WorkflowStep::Sheet {
            id: "s1".into(),
            sheet: Some("Extra".into()),
            status: StepStatus::Pending,
        };
        let fragment = executor.execute(&step, &[dataset], 10).unwrap();
        assert_eq!(fragment.columns, vec!["City"]);
        assert_eq!(fragment.rows[0]["City"], json!("Oslo"));
    }

    #[test]
    fn test_sheet_step_falls_back_to_primary_rows() {
        let executor = StepExecutor::new();
        let step = WorkflowStep::Sheet {
            id: "s1".into(),
            sheet: Some("Missing".into()),
            status: StepStatus::Pending,
        };
        let fragment = executor.execute(&step, &[people()], 2).unwrap();
        assert_eq!(fragment.columns, vec!["Name", "Age"]);
        assert_eq!(fragment.rows.len(), 2);
    }

    #[test]
    fn test_break_step_echoes_first_dataset() {
        let executor = StepExecutor::new();
        let step = WorkflowStep::Break {
            id: "s1".into(),
            status: StepStatus::Pending,
        };
        let fragment = executor.execute(&step, &[people()], 2).unwrap();
        assert_eq!(fragment.columns, vec!["Name", "Age"]);
        assert_eq!(fragment.rows.len(), 2);
        assert_eq!(fragment.rows[1]["Name"], json!("bob"));
    }
}
