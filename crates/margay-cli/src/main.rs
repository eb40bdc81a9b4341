#![doc = include_str!("../README.md")]

mod commands;
mod scenarios;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{parse_engine_mode, parse_output_format, CheckConfig};
use margay_ir::trace::GridBounds;

#[derive(Parser)]
#[command(name = "margay")]
#[command(about = "Bounded model checker for hybrid spatio-temporal logic on grid roads")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check conclusion formulas against assumptions over all bounded traces
    Check {
        /// Proposition name (repeatable)
        #[arg(long = "prop")]
        propositions: Vec<String>,

        /// Agent (nominal) name (repeatable)
        #[arg(long = "agent")]
        agents: Vec<String>,

        /// Assumption formula (repeatable)
        #[arg(long = "assume")]
        assumptions: Vec<String>,

        /// File with one assumption formula per line
        #[arg(long)]
        assume_file: Option<std::path::PathBuf>,

        /// Conclusion formula (repeatable)
        #[arg(long = "conclude")]
        conclusions: Vec<String>,

        /// File with one conclusion formula per line
        #[arg(long)]
        conclude_file: Option<std::path::PathBuf>,

        /// Grid rows
        #[arg(long, default_value_t = 3)]
        rows: i64,

        /// Grid columns
        #[arg(long, default_value_t = 3)]
        cols: i64,

        /// Maximum trace length
        #[arg(long, default_value_t = 3)]
        max_length: usize,

        /// Trace generator: pruned | baseline
        #[arg(long, default_value = "pruned")]
        engine: String,

        /// Print satisfying traces with their satisfying points
        #[arg(long, default_value_t = false)]
        show_traces: bool,

        /// Timeout in seconds for the whole evaluation
        #[arg(long, default_value_t = 600)]
        timeout: u64,

        /// Output format: text | json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Run a named road-safety scenario
    Scenario {
        /// Scenario name: left-right | same-name | one-lane-follow | hazard |
        /// safe-intersection | safe-passing | join-platoon
        name: String,

        /// Maximum trace length
        #[arg(long, default_value_t = 3)]
        duration: usize,

        /// Road length (square grid size for safe-intersection)
        #[arg(long, default_value_t = 3)]
        road_length: i64,

        /// Platoon size (join-platoon only)
        #[arg(long, default_value_t = 2)]
        platoon_size: usize,

        /// Trace generator: pruned | baseline
        #[arg(long, default_value = "pruned")]
        engine: String,

        /// Print satisfying traces with their satisfying points
        #[arg(long, default_value_t = false)]
        show_traces: bool,

        /// Timeout in seconds for the whole evaluation
        #[arg(long, default_value_t = 600)]
        timeout: u64,

        /// Output format: text | json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Parse a formula and print its canonical rendering
    Parse {
        /// Formula text
        formula: String,
    },
}

fn main() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Check {
            propositions,
            agents,
            mut assumptions,
            assume_file,
            mut conclusions,
            conclude_file,
            rows,
            cols,
            max_length,
            engine,
            show_traces,
            timeout,
            format,
        } => {
            if let Some(path) = assume_file {
                assumptions.extend(commands::read_formula_lines(&path)?);
            }
            if let Some(path) = conclude_file {
                conclusions.extend(commands::read_formula_lines(&path)?);
            }
            commands::run_check(CheckConfig {
                propositions,
                agents,
                assumptions,
                conclusions,
                bounds: GridBounds::new(rows, cols),
                max_trace_length: max_length,
                engine: parse_engine_mode(&engine)?,
                show_traces,
                timeout_secs: timeout,
                format: parse_output_format(&format)?,
            })
        }
        Commands::Scenario {
            name,
            duration,
            road_length,
            platoon_size,
            engine,
            show_traces,
            timeout,
            format,
        } => {
            let scenario = scenarios::build(&name, duration, road_length, platoon_size)
                .ok_or_else(|| {
                    miette::miette!(
                        "unknown scenario '{name}'; available: {}",
                        scenarios::SCENARIO_NAMES.join(", ")
                    )
                })?;
            commands::run_check(CheckConfig {
                propositions: scenario.propositions,
                agents: scenario.agents,
                assumptions: scenario.assumptions,
                conclusions: scenario.conclusions,
                bounds: scenario.bounds,
                max_trace_length: scenario.max_trace_length,
                engine: parse_engine_mode(&engine)?,
                show_traces,
                timeout_secs: timeout,
                format: parse_output_format(&format)?,
            })
        }
        Commands::Parse { formula } => {
            let parsed = margay_dsl::parse(&formula).map_err(miette::Report::new)?;
            println!("{parsed}");
            Ok(())
        }
    }
}
