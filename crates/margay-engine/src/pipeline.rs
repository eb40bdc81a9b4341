//! Run orchestration: validation, assumption classification, trace
//! generation and evaluation of the combined formula.

use thiserror::Error;
use tracing::{debug, info};

use margay_dsl::ast::{Formula, FormulaRef};
use margay_ir::kinematics::{self, KinematicsError};
use margay_ir::lowering;
use margay_ir::trace::{GridBounds, Trace};

use crate::eval;
use crate::exhaustive;
use crate::result::{RunReport, Witness};
use crate::search::TraceSearch;

/// Which trace generator backs the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineMode {
    /// Kinematically pruned search (the default).
    #[default]
    Pruned,
    /// Full unpruned enumeration; the semantic reference, viable only for
    /// small configurations.
    Baseline,
}

/// Everything a single model-checking run needs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub propositions: Vec<String>,
    pub agents: Vec<String>,
    pub assumptions: Vec<FormulaRef>,
    pub conclusions: Vec<FormulaRef>,
    pub bounds: GridBounds,
    pub max_trace_length: usize,
    pub engine: EngineMode,
    /// Collect satisfying traces and their points into the report.
    pub record_witnesses: bool,
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// Nothing to check: rejected before any search starts.
    #[error("no conclusion formulas were provided")]
    NoConclusions,
    #[error("maximum trace length must be at least 1")]
    ZeroTraceLength,
    /// The assumptions are contradictory; no states exist at all. Kept
    /// distinct from a run that finds zero satisfying traces.
    #[error(transparent)]
    Kinematics(#[from] KinematicsError),
}

/// Execute one run and tally satisfying traces.
pub fn run(options: &RunOptions) -> Result<RunReport, EngineError> {
    if options.conclusions.is_empty() {
        return Err(EngineError::NoConclusions);
    }
    if options.max_trace_length == 0 {
        return Err(EngineError::ZeroTraceLength);
    }

    match options.engine {
        EngineMode::Baseline => {
            let formula = Formula::conjoin(
                options
                    .conclusions
                    .iter()
                    .chain(&options.assumptions)
                    .cloned(),
            )
            .expect("conclusions are non-empty");
            info!(
                engine = "baseline",
                grid = %options.bounds,
                max_len = options.max_trace_length,
                formula = %formula,
                "starting run"
            );
            let traces = exhaustive::generate_traces(
                &options.propositions,
                &options.agents,
                options.bounds,
                options.max_trace_length,
            );
            Ok(tally(&formula, traces, options))
        }
        EngineMode::Pruned => {
            let classes = lowering::classify(&options.assumptions);
            let components = kinematics::build_components(&classes.dependent)?;
            debug!(
                static_agents = classes.static_agents.len(),
                components = components.len(),
                fixed_movement = classes.fixed_movement.len(),
                state_only = classes.state_only.len(),
                temporal = classes.temporal.len(),
                "assumptions classified"
            );
            let formula = Formula::conjoin(
                options
                    .conclusions
                    .iter()
                    .chain(&classes.temporal)
                    .cloned(),
            )
            .expect("conclusions are non-empty");
            info!(
                engine = "pruned",
                grid = %options.bounds,
                max_len = options.max_trace_length,
                formula = %formula,
                "starting run"
            );
            let search = TraceSearch::new(
                options.bounds,
                options.propositions.clone(),
                options.agents.clone(),
                &classes,
                components,
                options.max_trace_length,
            );
            Ok(tally(&formula, search, options))
        }
    }
}

fn tally(
    formula: &FormulaRef,
    traces: impl Iterator<Item = Trace>,
    options: &RunOptions,
) -> RunReport {
    let mut generated = 0u64;
    let mut satisfying = 0u64;
    let mut witnesses = Vec::new();

    for trace in traces {
        generated += 1;
        let points = eval::satisfying_points(formula, &trace, options.bounds);
        if !points.is_empty() {
            satisfying += 1;
            if options.record_witnesses {
                witnesses.push(Witness { points, trace });
            }
        }
    }

    info!(generated, satisfying, "run finished");
    RunReport {
        traces_generated: generated,
        traces_satisfying: satisfying,
        witnesses,
    }
}
