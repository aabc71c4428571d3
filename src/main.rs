//! Site Planner - command line entry point
//!
//! Reads a plan request (TOML), runs the planner and prints the report as
//! JSON on stdout. Logs go to stderr; set RUST_LOG to change verbosity.

use clap::Parser;
use serde::Serialize;
use site_planner::core::error::Result;
use site_planner::{plan, EnergyInput, PlanReport, PlanRequest, SetbackRules, Setbacks};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "site-planner")]
#[command(about = "Generate setback-aware, solar-oriented site layouts")]
struct Args {
    /// Plan request file (TOML)
    #[arg(long)]
    request: PathBuf,

    /// Jurisdiction rule file (TOML) replacing the request's setbacks
    #[arg(long)]
    jurisdiction: Option<PathBuf>,

    /// Number of layouts to return, overriding the request's config
    #[arg(long)]
    top: Option<usize>,

    /// Pretty-print the JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,

    /// Print only the best layout's energy inputs
    #[arg(long, default_value_t = false)]
    energy_only: bool,
}

/// Output for `--energy-only`
#[derive(Serialize)]
struct EnergyOutput {
    ordering: Option<String>,
    score: Option<f64>,
    placements: Vec<EnergyInput>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("site_planner=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<String> {
    let mut request = PlanRequest::load(&args.request)?;
    if let Some(path) = &args.jurisdiction {
        request.setbacks = Setbacks::Jurisdiction(SetbackRules::load(path)?);
    }
    if let Some(top) = args.top {
        request.config.top_n = top;
    }

    let report = plan(&request)?;
    if args.energy_only {
        energy_json(&report, args.pretty)
    } else {
        report.to_json(args.pretty)
    }
}

fn energy_json(report: &PlanReport, pretty: bool) -> Result<String> {
    let best = report.best();
    let output = EnergyOutput {
        ordering: best.map(|l| l.ordering.clone()),
        score: best.map(|l| l.score.total),
        placements: report.energy_inputs(),
    };
    Ok(if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    })
}
