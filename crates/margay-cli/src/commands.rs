//! Command implementations: formula parsing, worker-thread execution with a
//! deadline, and text/JSON report rendering.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use miette::{IntoDiagnostic, WrapErr};
use tracing::info;

use margay_dsl::FormulaRef;
use margay_engine::{EngineMode, RunOptions, RunReport};
use margay_ir::trace::GridBounds;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn parse_output_format(value: &str) -> miette::Result<OutputFormat> {
    match value {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        other => Err(miette::miette!("unknown output format '{other}' (expected text or json)")),
    }
}

/// Read one formula per non-empty line; `#` starts a comment line.
pub fn read_formula_lines(path: &std::path::Path) -> miette::Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading formulas from {}", path.display()))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

pub fn parse_engine_mode(value: &str) -> miette::Result<EngineMode> {
    match value {
        "pruned" => Ok(EngineMode::Pruned),
        "baseline" => Ok(EngineMode::Baseline),
        other => Err(miette::miette!("unknown engine '{other}' (expected pruned or baseline)")),
    }
}

pub struct CheckConfig {
    pub propositions: Vec<String>,
    pub agents: Vec<String>,
    pub assumptions: Vec<String>,
    pub conclusions: Vec<String>,
    pub bounds: GridBounds,
    pub max_trace_length: usize,
    pub engine: EngineMode,
    pub show_traces: bool,
    pub timeout_secs: u64,
    pub format: OutputFormat,
}

pub fn run_check(config: CheckConfig) -> miette::Result<()> {
    let assumptions = parse_formulas(&config.assumptions)?;
    let conclusions = parse_formulas(&config.conclusions)?;

    info!(
        propositions = config.propositions.len(),
        agents = config.agents.len(),
        assumptions = assumptions.len(),
        conclusions = conclusions.len(),
        grid = %config.bounds,
        max_trace_length = config.max_trace_length,
        "configured run"
    );

    let options = RunOptions {
        propositions: config.propositions,
        agents: config.agents,
        assumptions,
        conclusions,
        bounds: config.bounds,
        max_trace_length: config.max_trace_length,
        engine: config.engine,
        record_witnesses: config.show_traces,
    };

    let outcome = run_with_deadline(options, Duration::from_secs(config.timeout_secs))?;
    render(outcome, config.format)
}

fn parse_formulas(texts: &[String]) -> miette::Result<Vec<FormulaRef>> {
    texts
        .iter()
        .map(|text| margay_dsl::parse(text).map_err(miette::Report::new))
        .collect()
}

/// Run the evaluation on a worker thread and wait up to the deadline. On
/// expiry the worker is abandoned — it holds no state outside its own stack,
/// and the process exits right after reporting.
fn run_with_deadline(
    options: RunOptions,
    deadline: Duration,
) -> miette::Result<Option<RunReport>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("margay-worker".into())
        .spawn(move || {
            let _ = tx.send(margay_engine::run(&options));
        })
        .into_diagnostic()?;

    match rx.recv_timeout(deadline) {
        Ok(result) => result.map(Some).into_diagnostic(),
        Err(mpsc::RecvTimeoutError::Timeout) => Ok(None),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(miette::miette!("evaluation worker terminated unexpectedly"))
        }
    }
}

fn render(outcome: Option<RunReport>, format: OutputFormat) -> miette::Result<()> {
    match (outcome, format) {
        (Some(report), OutputFormat::Text) => {
            print!("{report}");
            Ok(())
        }
        (Some(report), OutputFormat::Json) => {
            let payload = serde_json::json!({
                "timed_out": false,
                "report": report,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).into_diagnostic()?
            );
            Ok(())
        }
        (None, OutputFormat::Text) => {
            println!("TIMED OUT");
            Ok(())
        }
        (None, OutputFormat::Json) => {
            println!("{}", serde_json::json!({ "timed_out": true }));
            Ok(())
        }
    }
}
