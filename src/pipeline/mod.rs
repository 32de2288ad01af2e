//! Sequential pipeline runner.
//!
//! [`PipelineRunner`] drives a step sequence through the executor,
//! chaining each `function` step onto the previous step's output via a
//! synthetic dataset, validating formula parameter contracts up front,
//! and collecting per-step results into a [`RunReport`].
//!
//! Every run draws a fresh generation number from a monotonic counter.
//! Callers that run previews concurrently (one per keystroke in an
//! editor, say) compare a report's generation against
//! [`PipelineRunner::current_generation`] and drop stale reports instead
//! of racing to render them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::api::logs::{log_error, log_info, log_success, log_warning};
use crate::error::{ExecuteError, FormulaError};
use crate::executor::StepExecutor;
use crate::formula::FormulaRegistry;
use crate::models::{ProcessedStepResult, TableFragment, TabularDataset, WorkflowStep};

/// Default preview sample size when the caller does not specify one.
pub const DEFAULT_SAMPLE_SIZE: usize = 100;

/// A step rejected by pre-execution validation.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StepFailure {
    pub step_index: usize,
    pub step_id: String,
    #[serde(skip)]
    pub errors: Vec<FormulaError>,
}

impl StepFailure {
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }
}

/// Everything one pipeline run produced.
#[derive(Debug)]
pub struct RunReport {
    /// Generation number of this run.
    pub generation: u64,
    /// Results of steps that executed, in step order.
    pub results: Vec<ProcessedStepResult>,
    /// Steps skipped by validation.
    pub failures: Vec<StepFailure>,
    /// Set when execution stopped early on a precondition failure.
    pub aborted: Option<ExecuteError>,
}

impl RunReport {
    pub fn completed_steps(&self) -> usize {
        self.results.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.aborted.is_none()
    }
}

/// Runs step sequences against working-set datasets.
pub struct PipelineRunner {
    executor: StepExecutor,
    registry: Arc<FormulaRegistry>,
    generation: AtomicU64,
}

impl PipelineRunner {
    pub fn new(registry: Arc<FormulaRegistry>) -> Self {
        Self {
            executor: StepExecutor::new(),
            registry,
            generation: AtomicU64::new(0),
        }
    }

    /// Runner with a custom executor, for callers that register extra
    /// step handlers.
    pub fn with_executor(registry: Arc<FormulaRegistry>, executor: StepExecutor) -> Self {
        Self {
            executor,
            registry,
            generation: AtomicU64::new(0),
        }
    }

    /// The generation of the most recently started run.
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Whether a report from `generation` is still the latest run.
    pub fn is_current(&self, generation: u64) -> bool {
        self.current_generation() == generation
    }

    /// Execute the step sequence in order.
    ///
    /// A `function` step whose parameters fail the registry contract is
    /// recorded as a [`StepFailure`] and skipped; its successors see no
    /// chained output. A precondition failure ([`ExecuteError`]) aborts
    /// the remainder of the run.
    pub async fn run(
        &self,
        steps: &[WorkflowStep],
        datasets: &[TabularDataset],
        sample_limit: usize,
    ) -> RunReport {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        log_info(format!(
            "Pipeline run {} started: {} step(s), {} dataset(s), sample {}",
            generation,
            steps.len(),
            datasets.len(),
            sample_limit
        ));

        let mut report = RunReport {
            generation,
            results: Vec::new(),
            failures: Vec::new(),
            aborted: None,
        };
        let mut prev_output: Option<TableFragment> = None;

        for (index, step) in steps.iter().enumerate() {
            if let WorkflowStep::Function {
                source, parameters, ..
            } = step
            {
                let validation = self.registry.validate(source, parameters);
                if !validation.is_valid {
                    for message in validation.error_messages() {
                        log_warning(format!("Step {} skipped: {}", index, message));
                    }
                    report.failures.push(StepFailure {
                        step_index: index,
                        step_id: step.id().to_string(),
                        errors: validation.errors,
                    });
                    prev_output = None;
                    continue;
                }
            }

            // Function steps chain onto the previous step's output; all
            // other kinds read the original working set.
            let chained: Vec<TabularDataset>;
            let inputs: &[TabularDataset] = match (&prev_output, step) {
                (Some(fragment), WorkflowStep::Function { .. }) if !fragment.is_empty() => {
                    let name = format!("step_{}_output", index.saturating_sub(1));
                    chained = vec![TabularDataset::from_fragment(name, fragment.clone())];
                    &chained
                }
                _ => datasets,
            };

            let started = Instant::now();
            match self.executor.execute(step, inputs, sample_limit) {
                Ok(fragment) => {
                    let elapsed = started.elapsed().as_millis() as u64;
                    log_success(format!(
                        "Step {} ({}) produced {} row(s) in {}ms",
                        index,
                        step.id(),
                        fragment.rows.len(),
                        elapsed
                    ));
                    report.results.push(ProcessedStepResult::from_fragment(
                        &fragment,
                        index,
                        sample_limit,
                        elapsed,
                    ));
                    prev_output = Some(fragment);
                }
                Err(err) => {
                    log_error(format!("Step {} ({}) aborted run: {}", index, step.id(), err));
                    report.aborted = Some(err);
                    break;
                }
            }
        }

        if report.is_clean() {
            log_success(format!(
                "Pipeline run {} finished: {} step(s) completed",
                generation,
                report.completed_steps()
            ));
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Row;
    use serde_json::{json, Value};

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn people() -> Vec<TabularDataset> {
        vec![TabularDataset::new(
            "people.csv",
            vec!["Name".into()],
            vec![row(&[("Name", json!("ann"))]), row(&[("Name", json!("bob"))])],
        )]
    }

    fn runner() -> PipelineRunner {
        PipelineRunner::new(Arc::new(FormulaRegistry::builtin()))
    }

    #[tokio::test]
    async fn test_function_step_chains_onto_previous_output() {
        let runner = runner();
        let steps = vec![
            WorkflowStep::column("s1", "Name"),
            WorkflowStep::function("s2", "UPPER", vec!["Name".into()]),
        ];
        let report = runner.run(&steps, &people(), 10).await;

        assert!(report.is_clean());
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[1].data[0]["Output_Column"], json!("ANN"));
        assert_eq!(report.results[1].step_index, 1);
    }

    #[tokio::test]
    async fn test_invalid_function_step_is_skipped_not_fatal() {
        let runner = runner();
        let steps = vec![
            // ADD needs two parameters.
            WorkflowStep::function("s1", "ADD", vec!["Name".into()]),
            WorkflowStep::column("s2", "Name"),
        ];
        let report = runner.run(&steps, &people(), 10).await;

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].step_index, 0);
        assert!(matches!(
            report.failures[0].errors[0],
            FormulaError::TooFewParameters { required: 2, given: 1, .. }
        ));
        // The column step still ran.
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].step_index, 1);
        assert!(report.aborted.is_none());
    }

    #[tokio::test]
    async fn test_unregistered_formula_fails_validation() {
        let runner = runner();
        let steps = vec![WorkflowStep::function("s1", "NO_SUCH", vec!["Name".into()])];
        let report = runner.run(&steps, &people(), 10).await;

        assert!(report.results.is_empty());
        assert_eq!(
            report.failures[0].errors[0],
            FormulaError::UnknownFormula("NO_SUCH".into())
        );
    }

    #[tokio::test]
    async fn test_empty_working_set_aborts() {
        let runner = runner();
        let steps = vec![WorkflowStep::column("s1", "Name")];
        let report = runner.run(&steps, &[], 10).await;

        assert!(report.results.is_empty());
        assert!(matches!(report.aborted, Some(ExecuteError::EmptyInput)));
    }

    #[tokio::test]
    async fn test_generations_are_monotonic() {
        let runner = runner();
        let steps = vec![WorkflowStep::column("s1", "Name")];

        let first = runner.run(&steps, &people(), 10).await;
        let second = runner.run(&steps, &people(), 10).await;

        assert!(second.generation > first.generation);
        assert!(!runner.is_current(first.generation));
        assert!(runner.is_current(second.generation));
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let runner = runner();
        let steps = vec![
            WorkflowStep::column("s1", "Name"),
            WorkflowStep::function("s2", "UPPER", vec!["Name".into()]),
        ];
        let first = runner.run(&steps, &people(), 10).await;
        let second = runner.run(&steps, &people(), 10).await;

        let strip = |results: &[ProcessedStepResult]| {
            results
                .iter()
                .map(|r| (r.data.clone(), r.columns.clone(), r.row_count))
                .collect::<Vec<_>>()
        };
        assert_eq!(strip(&first.results), strip(&second.results));
    }

    #[tokio::test]
    async fn test_function_chains_onto_custom_output() {
        // A custom step's output is chainable input for a following
        // function step; the function operates on its columns.
        let runner = runner();
        let steps = vec![
            WorkflowStep::custom("s1", "hello"),
            WorkflowStep::function("s2", "UPPER", vec!["Custom_Value".into()]),
        ];
        let report = runner.run(&steps, &people(), 3).await;

        assert!(report.is_clean());
        assert_eq!(report.results[1].data[0]["Output_Column"], json!("HELLO"));
    }
}
