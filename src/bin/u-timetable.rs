//! Command-line timetable generator.
//!
//! Reads a request JSON (`{ courses, faculty, classrooms }`), prints
//! `{ "timetable": {...} }` on stdout and logs on stderr. `--kpi` adds
//! `kpi` and `stats` next to the timetable. On failure prints
//! `{ "error": { kind, message, blockers } }` and exits non-zero.

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use u_timetable::scheduler::{TimetableKpi, TimetableRequest, TimetableScheduler};
use u_timetable::SolverConfig;

/// Generate a weekly university timetable
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Request JSON with courses, faculty and classrooms
    #[arg(long, short)]
    input: PathBuf,

    /// Solver configuration JSON
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Override the improvement seed
    #[arg(long)]
    seed: Option<u64>,

    /// Include workload and room KPIs in the output
    #[arg(long)]
    kpi: bool,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let raw = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading request '{}'", args.input.display()))?;
    let request: TimetableRequest = serde_json::from_str(&raw)
        .with_context(|| format!("parsing request '{}'", args.input.display()))?;

    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config '{}'", path.display()))?;
            SolverConfig::from_json_str(&raw)?
        }
        None => SolverConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let scheduler = TimetableScheduler::new(config);
    match scheduler.solve(&request, None) {
        Ok(solution) => {
            let mut output = json!({ "timetable": &solution.timetable });
            if args.kpi {
                let kpi = TimetableKpi::calculate(&solution.timetable, &request.faculty);
                output["kpi"] = serde_json::to_value(kpi)?;
                output["stats"] = serde_json::to_value(solution.stats)?;
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            let output = json!({
                "error": {
                    "kind": e.kind(),
                    "message": e.to_string(),
                    "blockers": e.blockers(),
                }
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::FAILURE)
        }
    }
}
