//! HTTP server for the preview engine.
//!
//! The editor frontend holds datasets and steps in memory and posts them
//! here; the server is stateless between requests apart from the shared
//! formula registry and the pipeline runner's generation counter.
//!
//! # API Endpoints
//!
//! | Method | Path                     | Description                        |
//! |--------|--------------------------|------------------------------------|
//! | GET    | `/health`                | Health check                       |
//! | GET    | `/api/formulas`          | Formula catalog, grouped           |
//! | POST   | `/api/formulas/validate` | Check a parameter list             |
//! | POST   | `/api/preview`           | Run a step sequence                |
//! | POST   | `/api/columns`           | Merge selected columns             |
//! | GET    | `/api/logs`              | SSE stream for real-time run logs  |

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{collections::HashMap, convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::LOG_BROADCASTER;
use super::types::{
    error_response, ColumnsRequest, PreviewRequest, PreviewResponse, ValidateRequest,
    ValidationResponse,
};
use crate::formula::FormulaRegistry;
use crate::pipeline::PipelineRunner;
use crate::preview::{merge_selected_columns, MergedPreview};
use crate::resolver;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<FormulaRegistry>,
    pub runner: Arc<PipelineRunner>,
}

impl AppState {
    pub fn new() -> Self {
        let registry = Arc::new(FormulaRegistry::builtin());
        let runner = Arc::new(PipelineRunner::new(registry.clone()));
        Self { registry, runner }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the router; split out of `start_server` so tests can drive it.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/formulas", get(list_formulas))
        .route("/api/formulas/validate", post(validate_formula))
        .route("/api/preview", post(run_preview))
        .route("/api/columns", post(merge_columns))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = app(AppState::new());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Preview server running on http://localhost:{}", port);
    println!("   GET  /api/formulas          - Formula catalog");
    println!("   POST /api/formulas/validate - Parameter check");
    println!("   POST /api/preview           - Run step sequence");
    println!("   POST /api/columns           - Merge selected columns");
    println!("   GET  /api/logs              - SSE log stream");
    println!("   GET  /health                - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "stepstudio",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Formula catalog, grouped by category
async fn list_formulas(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "count": state.registry.len(),
        "categories": state.registry.by_category(),
    }))
}

/// Check a parameter list against a formula's contract
async fn validate_formula(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> Json<ValidationResponse> {
    let report = state.registry.validate(&request.name, &request.parameters);
    Json(ValidationResponse {
        is_valid: report.is_valid,
        errors: report.error_messages(),
    })
}

/// Run a step sequence and return per-step previews
async fn run_preview(
    State(state): State<AppState>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, (StatusCode, Json<Value>)> {
    if request.sample_size == 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(error_response("sampleSize must be at least 1")),
        ));
    }

    let report = state
        .runner
        .run(&request.steps, &request.datasets, request.sample_size)
        .await;
    Ok(Json(PreviewResponse::from_report(
        &report,
        request.steps.len(),
        request.sample_size,
    )))
}

/// Merge selected columns into one index-aligned table
async fn merge_columns(
    State(_state): State<AppState>,
    Json(request): Json<ColumnsRequest>,
) -> Json<MergedPreview> {
    let references: Vec<_> = request
        .paths
        .iter()
        .map(|path| resolver::resolve(path, &request.datasets))
        .collect();
    let by_file: HashMap<_, _> = request
        .datasets
        .iter()
        .map(|d| (d.name.clone(), d.clone()))
        .collect();
    Json(merge_selected_columns(
        &references,
        &by_file,
        request.sample_size,
    ))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
