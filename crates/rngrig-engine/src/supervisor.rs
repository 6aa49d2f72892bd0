//! Per-job process supervision.
//!
//! One supervisor task runs per in-flight job. It resolves and validates
//! the tool, spawns it, streams stdout/stderr back to the queue actor as
//! chunk events, waits for exit, reads the report file when the plan names
//! one, and sends a single exit event. All judgment (analysis, early
//! abort, finalization) lives in the actor; the supervisor only moves
//! bytes and events.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use rngrig_resolver::{CommandSpec, Resolver, ResolverError, StdinMode};

use crate::runners::{Invocation, LaunchPlan};

/// Events a supervisor reports back to the queue actor.
#[derive(Debug)]
pub(crate) enum JobEvent {
    /// Resolution, validation, or spawn failed; no process is running.
    SetupFailed { id: String, error: ResolverError },
    /// The process is running.
    Launched { id: String, pid: Option<u32> },
    /// A chunk of stdout or stderr arrived.
    Chunk { id: String, text: String },
    /// The process exited naturally. `report` carries the report file's
    /// contents when the plan names one and it was readable.
    Exited {
        id: String,
        code: Option<i32>,
        report: Option<String>,
    },
}

/// Drive one job's process from launch to exit.
///
/// Every outcome is reported through `events`; this function never fails
/// outward.
pub(crate) async fn supervise(
    id: String,
    plan: LaunchPlan,
    input_file: PathBuf,
    resolver: Arc<Resolver>,
    events: UnboundedSender<JobEvent>,
) {
    let spec = match build_spec(&plan, &resolver) {
        Ok(spec) => spec,
        Err(error) => {
            let _ = events.send(JobEvent::SetupFailed { id, error });
            return;
        }
    };

    debug!(job = %id, command = %spec.display(), "launching");
    let mut child = match resolver.spawn(&spec, plan.stdin) {
        Ok(child) => child,
        Err(error) => {
            let _ = events.send(JobEvent::SetupFailed { id, error });
            return;
        }
    };

    let _ = events.send(JobEvent::Launched {
        id: id.clone(),
        pid: child.id(),
    });

    // Stream the input file into the child where the plan asks for it.
    if plan.stdin == StdinMode::Piped {
        if let Some(mut stdin) = child.stdin.take() {
            let job = id.clone();
            let path = input_file.clone();
            tokio::spawn(async move {
                match tokio::fs::File::open(&path).await {
                    Ok(mut file) => {
                        // The copy ends when the file is exhausted or the
                        // child stops reading; both are fine.
                        if let Err(err) = tokio::io::copy(&mut file, &mut stdin).await {
                            debug!(job = %job, error = %err, "stdin stream ended");
                        }
                    }
                    Err(err) => {
                        warn!(job = %job, path = %path.display(), error = %err, "input file open failed");
                    }
                }
            });
        }
    }

    // One pump per pipe; chunks from the two streams interleave in
    // delivery order, with no cross-stream guarantee.
    let stdout_pump = child
        .stdout
        .take()
        .map(|pipe| tokio::spawn(pump_pipe(id.clone(), pipe, events.clone())));
    let stderr_pump = child
        .stderr
        .take()
        .map(|pipe| tokio::spawn(pump_pipe(id.clone(), pipe, events.clone())));
    if let Some(pump) = stdout_pump {
        let _ = pump.await;
    }
    if let Some(pump) = stderr_pump {
        let _ = pump.await;
    }

    let code = match child.wait().await {
        Ok(status) => status.code(),
        Err(err) => {
            warn!(job = %id, error = %err, "wait failed");
            None
        }
    };

    let report = match plan.report {
        Some(segments) => read_report(&resolver, segments).await,
        None => None,
    };

    let _ = events.send(JobEvent::Exited { id, code, report });
}

/// Resolve and validate the plan's invocation into a concrete command.
fn build_spec(plan: &LaunchPlan, resolver: &Resolver) -> Result<CommandSpec, ResolverError> {
    match &plan.invocation {
        Invocation::Tool { tool, args } => {
            let resolved = resolver.resolve(*tool);
            if resolved.fallback_used {
                warn!(tool = %resolved.tool, path = %resolved.path,
                    "path conversion failed; using unconverted path");
            }
            resolver.validate(&resolved)?;
            let cwd = plan.cwd.map(|dir| resolver.tools_root().join(dir));
            Ok(resolver.command_for(&resolved, args, cwd))
        }
        Invocation::Container {
            image,
            volume,
            command,
        } => {
            let (host_dir, mount) = volume;
            let mut spec = CommandSpec::new("docker").args(["run", "--rm", "-v"]).arg(
                format!("{}:{}", host_dir.display(), mount),
            );
            spec = spec.arg(image);
            Ok(spec.args(command.iter().map(String::as_str)))
        }
    }
}

/// Forward one pipe to the actor, chunk by chunk, until EOF.
async fn pump_pipe(id: String, mut pipe: impl AsyncRead + Unpin, events: UnboundedSender<JobEvent>) {
    let mut buf = vec![0u8; 8192];
    loop {
        match pipe.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let _ = events.send(JobEvent::Chunk {
                    id: id.clone(),
                    text: String::from_utf8_lossy(&buf[..n]).into_owned(),
                });
            }
        }
    }
}

/// Read the generated report file, if present.
///
/// An unreadable report is logged and ignored; the exit-code verdict then
/// stands on its own.
async fn read_report(resolver: &Resolver, segments: &[&str]) -> Option<String> {
    let mut path = resolver.tools_root().to_path_buf();
    for segment in segments {
        path.push(segment);
    }
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => Some(content),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "report read failed");
            None
        }
    }
}
