//! Stepstudio CLI - Preview step pipelines over tabular data
//!
//! # Main Commands
//!
//! ```bash
//! stepstudio serve                      # Start HTTP server (port 3210)
//! stepstudio run --datasets d.json --steps s.json   # Run a pipeline
//! stepstudio formulas                   # Show the formula catalog
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! stepstudio parse-formula "UPPER [Name]"   # Parse a formula string
//! stepstudio validate ADD Price Tax         # Check a parameter list
//! ```

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use stepstudio::{
    FormulaRegistry, PipelineRunner, PreviewResponse, TabularDataset, WorkflowStep,
    DEFAULT_SAMPLE_SIZE,
};

#[derive(Parser)]
#[command(name = "stepstudio")]
#[command(about = "Preview step pipelines over tabular data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a step sequence over datasets and output per-step previews
    Run {
        /// JSON file holding an array of datasets
        #[arg(short, long)]
        datasets: PathBuf,

        /// JSON file holding an array of steps
        #[arg(short, long)]
        steps: PathBuf,

        /// Preview sample size
        #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
        sample_size: usize,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the formula catalog, grouped by category
    Formulas,

    /// Parse a formula string like "TEXT_JOIN [\", \" -> TRUE -> City]"
    ParseFormula {
        /// Formula string to parse
        formula: String,
    },

    /// Check a parameter list against a formula's contract
    Validate {
        /// Formula name
        name: String,

        /// Parameters, in order
        parameters: Vec<String>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3210")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            datasets,
            steps,
            sample_size,
            output,
        } => cmd_run(&datasets, &steps, sample_size, output.as_deref()).await,

        Commands::Formulas => cmd_formulas(),

        Commands::ParseFormula { formula } => cmd_parse_formula(&formula),

        Commands::Validate { name, parameters } => cmd_validate(&name, &parameters),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_run(
    datasets_path: &Path,
    steps_path: &Path,
    sample_size: usize,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Datasets: {}", datasets_path.display());
    let datasets: Vec<TabularDataset> =
        serde_json::from_str(&fs::read_to_string(datasets_path)?)?;
    for dataset in &datasets {
        eprintln!(
            "   {} ({} rows, {} columns)",
            dataset.name,
            dataset.rows.len(),
            dataset.columns.len()
        );
    }

    eprintln!("📄 Steps: {}", steps_path.display());
    let steps: Vec<WorkflowStep> = serde_json::from_str(&fs::read_to_string(steps_path)?)?;
    eprintln!("   {} step(s), sample size {}", steps.len(), sample_size);

    let runner = PipelineRunner::new(Arc::new(FormulaRegistry::builtin()));
    let report = runner.run(&steps, &datasets, sample_size).await;

    if let Some(ref err) = report.aborted {
        eprintln!("❌ Run aborted: {}", err);
    }
    for failure in &report.failures {
        eprintln!("⚠️  Step {} skipped:", failure.step_index);
        for message in failure.error_messages() {
            eprintln!("   - {}", message);
        }
    }
    eprintln!(
        "✅ {} of {} step(s) completed",
        report.completed_steps(),
        steps.len()
    );

    let response = PreviewResponse::from_report(&report, steps.len(), sample_size);
    let json = serde_json::to_string_pretty(&response)?;
    write_output(&json, output)?;

    if report.aborted.is_some() || !report.failures.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_formulas() -> Result<(), Box<dyn std::error::Error>> {
    let registry = FormulaRegistry::builtin();
    for (category, definitions) in registry.by_category() {
        println!("📂 {}", category);
        for definition in definitions {
            println!("   {} - {}", definition.name, definition.description);
            println!("     Syntax: {}", definition.syntax);
            if !definition.aliases.is_empty() {
                println!("     Aliases: {}", definition.aliases.join(", "));
            }
        }
        println!();
    }
    Ok(())
}

fn cmd_parse_formula(formula: &str) -> Result<(), Box<dyn std::error::Error>> {
    match FormulaRegistry::parse(formula) {
        Some(parsed) => {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                "name": parsed.name,
                "parameters": parsed.parameters,
            }))?);
            Ok(())
        }
        None => Err(format!("Not a valid formula string: {}", formula).into()),
    }
}

fn cmd_validate(name: &str, parameters: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let registry = FormulaRegistry::builtin();
    let report = registry.validate(name, parameters);
    if report.is_valid {
        eprintln!("✅ {} accepts {} parameter(s)", name, parameters.len());
        Ok(())
    } else {
        for message in report.error_messages() {
            eprintln!("❌ {}", message);
        }
        std::process::exit(1);
    }
}

async fn cmd_serve(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    stepstudio::server::start_server(port).await
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
