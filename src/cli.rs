//! Command-line host for the engine.
//!
//! The CLI is a stand-in for the interactive front end: it enqueues jobs,
//! relays lifecycle events to stdout, and exits non-zero when any job
//! failed. All logic is in the library crates; this module only wires
//! arguments to the engine and formats events.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use rngrig_config::RigConfig;
use rngrig_engine::runners;
use rngrig_engine::{Engine, EngineEvent, JobRecord, JobSpec, JobStatus, TestSuite};

use crate::{doctor, logging};

#[derive(Parser)]
#[command(name = "rngrig", version, about = "Batch-run randomness test batteries")]
struct Cli {
    /// Verbose engine logging.
    #[arg(long, global = true)]
    verbose: bool,

    /// Emit machine-readable JSON instead of human lines.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enqueue jobs and stream their lifecycle events until all finish.
    Run {
        /// Job as `<suite>=<file>`, e.g. `--job "Small Crush=/data/s.bin"`.
        /// Repeatable; jobs run strictly in the given order.
        #[arg(long = "job", value_name = "SUITE=FILE", required = true)]
        jobs: Vec<String>,

        /// JSON file of prior job records to rehydrate at startup.
        #[arg(long, value_name = "FILE")]
        history: Option<PathBuf>,
    },
    /// Preflight checks: execution mode, tools root, per-tool paths.
    Doctor,
    /// List the supported suites and how each is invoked.
    Suites,
}

/// CLI entry point: parses arguments, dispatches, and returns the process
/// exit code. All output, including errors, is handled here.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose).map_err(|e| anyhow::anyhow!("tracing init: {e}"))?;

    match cli.command {
        Commands::Suites => {
            for suite in TestSuite::all() {
                if cli.json {
                    println!(
                        "{}",
                        serde_json::json!({
                            "suite": suite.as_str(),
                            "invocation": runners::invocation_summary(suite),
                        })
                    );
                } else {
                    println!("{:<12} {}", suite.as_str(), runners::invocation_summary(suite));
                }
            }
            Ok(0)
        }
        Commands::Doctor => {
            let output = doctor::run_checks(&RigConfig::from_env());
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                for check in &output.checks {
                    println!(
                        "{:<5} {:<24} {}",
                        check.status.as_str(),
                        check.name,
                        check.details
                    );
                }
            }
            Ok(i32::from(!output.ok))
        }
        Commands::Run { jobs, history } => run_jobs(&jobs, history.as_deref(), cli.json),
    }
}

/// Parse `<suite>=<file>` pairs into specs, preserving order.
fn parse_job_args(args: &[String]) -> Result<Vec<JobSpec>> {
    args.iter()
        .enumerate()
        .map(|(index, arg)| {
            let (suite, file) = arg
                .split_once('=')
                .with_context(|| format!("job {arg:?} is not of the form SUITE=FILE"))?;
            if suite.trim().is_empty() || file.trim().is_empty() {
                bail!("job {arg:?} is missing a suite or file");
            }
            Ok(JobSpec::new(
                format!("job-{}", index + 1),
                suite.trim(),
                file.trim(),
            ))
        })
        .collect()
}

fn load_history(path: &std::path::Path) -> Result<Vec<JobRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading history file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing history file {}", path.display()))
}

fn run_jobs(job_args: &[String], history: Option<&std::path::Path>, json: bool) -> Result<i32> {
    let specs = parse_job_args(job_args)?;
    let history = match history {
        Some(path) => load_history(path)?,
        None => Vec::new(),
    };

    let runtime = tokio::runtime::Runtime::new().context("starting runtime")?;
    runtime.block_on(async move {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let engine = Engine::new(RigConfig::from_env())
            .with_history(history)
            .spawn(event_tx);

        let submitted = specs.len();
        for spec in specs {
            engine.enqueue(spec);
        }

        let mut finished = 0usize;
        let mut any_failed = false;
        while finished < submitted {
            let Some(event) = event_rx.recv().await else {
                bail!("engine stopped before all jobs finished");
            };
            print_event(&event, json);
            if let EngineEvent::Finished { status, .. } = &event {
                finished += 1;
                if *status == JobStatus::Failed {
                    any_failed = true;
                }
            }
        }

        engine.shutdown();
        Ok(i32::from(any_failed))
    })
}

fn print_event(event: &EngineEvent, json: bool) {
    if json {
        if let Ok(line) = serde_json::to_string(event) {
            println!("{line}");
        }
        return;
    }
    match event {
        EngineEvent::Started { id } => println!("started  {id}"),
        EngineEvent::Finished {
            id,
            status,
            completed_at,
        } => println!("finished {id}  {status}  {completed_at}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_args_parse_in_order() {
        let specs = parse_job_args(&[
            "Small Crush=/data/a.bin".to_string(),
            "Ent=/data/b.bin".to_string(),
        ])
        .expect("parse");
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].id, "job-1");
        assert_eq!(specs[0].suite, "Small Crush");
        assert_eq!(specs[0].input_file, PathBuf::from("/data/a.bin"));
        assert_eq!(specs[1].id, "job-2");
        assert_eq!(specs[1].suite, "Ent");
    }

    #[test]
    fn malformed_job_args_are_rejected() {
        assert!(parse_job_args(&["no-separator".to_string()]).is_err());
        assert!(parse_job_args(&["=missing-suite".to_string()]).is_err());
        assert!(parse_job_args(&["Ent=".to_string()]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
