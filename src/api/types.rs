//! REST API types for editor integration.
//!
//! Request bodies mirror what the editor holds in memory (datasets,
//! steps, selected column paths); responses carry the materialized
//! preview results plus enough metadata for the client to decide
//! whether a response is stale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{ProcessedStepResult, TabularDataset, WorkflowStep};
use crate::pipeline::{RunReport, StepFailure, DEFAULT_SAMPLE_SIZE};

fn default_sample_size() -> usize {
    DEFAULT_SAMPLE_SIZE
}

/// Body of `POST /api/preview`: run a step sequence over a working set.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub datasets: Vec<TabularDataset>,
    pub steps: Vec<WorkflowStep>,
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

/// Body of `POST /api/columns`: merge selected columns side by side.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnsRequest {
    pub datasets: Vec<TabularDataset>,
    /// Display paths of the selected columns, in display order.
    pub paths: Vec<String>,
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

/// Body of `POST /api/formulas/validate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<String>,
}

/// A validation failure of one step, flattened for the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepFailureDto {
    pub step_index: usize,
    pub step_id: String,
    pub errors: Vec<String>,
}

impl From<&StepFailure> for StepFailureDto {
    fn from(failure: &StepFailure) -> Self {
        Self {
            step_index: failure.step_index,
            step_id: failure.step_id.clone(),
            errors: failure.error_messages(),
        }
    }
}

/// Metadata about a preview run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub total_steps: usize,
    pub completed_steps: usize,
    pub sample_size: usize,
    pub generated_at: DateTime<Utc>,
}

/// Response sent to the editor after a preview run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Status: "ready", "partial", "error"
    pub status: String,

    /// Generation number; the client drops responses older than the
    /// latest one it has seen.
    pub generation: u64,

    /// Per-step preview results, in step order
    pub results: Vec<ProcessedStepResult>,

    /// Steps skipped by validation
    pub failures: Vec<StepFailureDto>,

    /// Set when execution aborted early
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Metadata about the run
    pub metadata: ResponseMetadata,
}

impl PreviewResponse {
    /// Flatten a run report for the client.
    pub fn from_report(report: &RunReport, total_steps: usize, sample_size: usize) -> Self {
        let status = if report.aborted.is_some() {
            "error"
        } else if report.failures.is_empty() {
            "ready"
        } else {
            "partial"
        };
        Self {
            job_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            generation: report.generation,
            results: report.results.clone(),
            failures: report.failures.iter().map(StepFailureDto::from).collect(),
            error: report.aborted.as_ref().map(|e| e.to_string()),
            metadata: ResponseMetadata {
                total_steps,
                completed_steps: report.completed_steps(),
                sample_size,
                generated_at: Utc::now(),
            },
        }
    }
}

/// Response of `POST /api/formulas/validate`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "results": [],
        "failures": []
    })
}
