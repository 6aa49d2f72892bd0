//! The single-flight FIFO job queue.
//!
//! One actor task owns the pending queue, the job store, and the running
//! slot. Callers talk to it through [`EngineHandle`]; supervisors report
//! back through internal job events. Because every mutation happens on the
//! actor's loop, the invariants — one job in progress, strictly FIFO
//! starts, exactly-once finalization — need no locking to hold.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use rngrig_analyzers::stream::{SequentialScan, StreamAnalyzer, WeakScan};
use rngrig_analyzers::{AnalysisVerdict, ent, exit_code, report, small_battery};
use rngrig_config::RigConfig;
use rngrig_resolver::{Resolver, platform};

use crate::events::EngineEvent;
use crate::job::{Job, JobRecord, JobSpec, JobStatus};
use crate::runners::{self, AnalysisMode, PlanContext};
use crate::supervisor::{self, JobEvent};

/// Engine builder: configuration plus optional rehydrated history.
pub struct Engine {
    config: RigConfig,
    history: Vec<JobRecord>,
}

impl Engine {
    #[must_use]
    pub fn new(config: RigConfig) -> Self {
        Self {
            config,
            history: Vec::new(),
        }
    }

    /// Seed the store with job summaries from external persistence.
    ///
    /// Rehydrated records never re-enter the queue. Records that were
    /// non-terminal when persisted (a session died mid-run) are coerced to
    /// `Failed`: their process is gone and cannot be resumed.
    #[must_use]
    pub fn with_history(mut self, records: Vec<JobRecord>) -> Self {
        self.history = records;
        self
    }

    /// Start the queue actor and hand back its handle.
    ///
    /// `events` is the sink lifecycle events are delivered to; it is
    /// injected so hosts and tests own delivery. Multiple engines can
    /// coexist, each with its own queue and sink.
    #[must_use]
    pub fn spawn(self, events: mpsc::UnboundedSender<EngineEvent>) -> EngineHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (job_tx, job_rx) = mpsc::unbounded_channel();

        let mut store = HashMap::new();
        for record in self.history {
            let mut job = Job {
                id: record.id.clone(),
                suite: record.suite.parse().ok(),
                suite_name: record.suite.clone(),
                input_file: record.input_file.clone(),
                status: record.status,
                queued_at: record.queued_at,
                started_at: record.started_at,
                completed_at: record.completed_at,
                raw_output: record.raw_output.clone(),
                parsed_result: record.parsed_result.clone(),
                pid: None,
            };
            if !job.status.is_terminal() {
                warn!(job = %job.id, status = %job.status, "rehydrated non-terminal job; marking Failed");
                job.status = JobStatus::Failed;
                job.completed_at = Some(Utc::now());
            }
            store.insert(record.id, job);
        }

        let actor = QueueActor {
            resolver: Arc::new(Resolver::new(self.config.clone())),
            config: self.config,
            store,
            pending: VecDeque::new(),
            running: None,
            events,
            job_tx,
        };
        tokio::spawn(actor.run(command_rx, job_rx));

        EngineHandle { command_tx }
    }
}

/// Cloneable façade over the queue actor.
///
/// All operations are messages; none of them block on a child process.
#[derive(Clone)]
pub struct EngineHandle {
    command_tx: mpsc::UnboundedSender<Command>,
}

impl EngineHandle {
    /// Submit a job. Malformed submissions are dropped without creating a
    /// job; valid ones join the FIFO and start immediately when the queue
    /// is idle.
    pub fn enqueue(&self, spec: JobSpec) {
        let _ = self.command_tx.send(Command::Enqueue(spec));
    }

    /// Cancel a job: terminate its process group if running, or pull it
    /// out of the pending queue. Either way the job finalizes `Failed`
    /// without waiting for process death.
    pub fn cancel(&self, id: impl Into<String>) {
        let _ = self.command_tx.send(Command::Cancel { id: id.into() });
    }

    /// Cancel (if live) and remove a job's record.
    pub fn delete_job(&self, id: impl Into<String>) {
        let _ = self.command_tx.send(Command::Delete { id: id.into() });
    }

    /// Snapshot one job record.
    pub async fn job_record(&self, id: impl Into<String>) -> Option<JobRecord> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(Command::Record {
                id: id.into(),
                reply,
            })
            .ok()?;
        rx.await.ok().flatten()
    }

    /// Snapshot all job records, newest submission first.
    pub async fn jobs(&self) -> Vec<JobRecord> {
        let (reply, rx) = oneshot::channel();
        if self.command_tx.send(Command::Jobs { reply }).is_err() {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }

    /// Stop the actor. Queued jobs never start; a running process keeps
    /// running unsupervised (hosts cancel first when that matters).
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(Command::Shutdown);
    }
}

enum Command {
    Enqueue(JobSpec),
    Cancel { id: String },
    Delete { id: String },
    Record {
        id: String,
        reply: oneshot::Sender<Option<JobRecord>>,
    },
    Jobs {
        reply: oneshot::Sender<Vec<JobRecord>>,
    },
    Shutdown,
}

/// State of the one in-flight job.
struct RunningJob {
    id: String,
    /// Streaming scanner for suites with early abort.
    scanner: Option<Box<dyn StreamAnalyzer>>,
}

struct QueueActor {
    config: RigConfig,
    resolver: Arc<Resolver>,
    store: HashMap<String, Job>,
    pending: VecDeque<String>,
    running: Option<RunningJob>,
    events: mpsc::UnboundedSender<EngineEvent>,
    job_tx: mpsc::UnboundedSender<JobEvent>,
}

impl QueueActor {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut job_events: mpsc::UnboundedReceiver<JobEvent>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Enqueue(spec)) => self.enqueue(spec),
                    Some(Command::Cancel { id }) => self.cancel(&id),
                    Some(Command::Delete { id }) => self.delete(&id),
                    Some(Command::Record { id, reply }) => {
                        let _ = reply.send(self.store.get(&id).map(Job::record));
                    }
                    Some(Command::Jobs { reply }) => {
                        let mut records: Vec<JobRecord> =
                            self.store.values().map(Job::record).collect();
                        records.sort_by(|a, b| b.queued_at.cmp(&a.queued_at));
                        let _ = reply.send(records);
                    }
                    Some(Command::Shutdown) | None => break,
                },
                event = job_events.recv() => match event {
                    Some(event) => self.handle_job_event(event),
                    // The actor holds a sender; this arm never yields None
                    // before shutdown.
                    None => break,
                },
            }
        }
    }

    fn enqueue(&mut self, spec: JobSpec) {
        if !spec.is_well_formed() {
            warn!(id = %spec.id, "enqueue ignored: missing id, suite, or input file");
            return;
        }
        if let Some(existing) = self.store.get(&spec.id) {
            if !existing.status.is_terminal() {
                warn!(id = %spec.id, "enqueue ignored: id already live");
                return;
            }
        }

        let job = Job::from_spec(&spec, Utc::now());
        debug!(id = %job.id, suite = %job.suite_name, file = %job.input_file.display(), "job queued");
        self.store.insert(job.id.clone(), job);
        self.pending.push_back(spec.id);
        self.start_next();
    }

    /// Admission check and dequeue. Called whenever the queue might be
    /// able to start a job; a no-op unless idle with work pending.
    fn start_next(&mut self) {
        if self.running.is_some() {
            return;
        }
        let Some(id) = self.pending.pop_front() else {
            return;
        };
        let Some(job) = self.store.get_mut(&id) else {
            return;
        };

        job.status = JobStatus::InProgress;
        job.started_at = Some(Utc::now());
        info!(id = %id, suite = %job.suite_name, "job started");
        let _ = self.events.send(EngineEvent::Started { id: id.clone() });

        let Some(suite) = job.suite else {
            // Unknown suite: no runner, no process. Finalize right away and
            // keep the queue moving.
            let name = job.suite_name.clone();
            warn!(id = %id, suite = %name, "no runner for suite");
            self.finalize(
                &id,
                JobStatus::Failed,
                Some(AnalysisVerdict::fail(format!("unknown test suite: {name}"))),
            );
            self.start_next();
            return;
        };

        let plan = runners::plan_for(
            suite,
            &job.input_file,
            &PlanContext {
                mode: self.resolver.mode(),
                container_image: &self.config.container_image,
            },
        );
        let scanner: Option<Box<dyn StreamAnalyzer>> = match plan.analysis {
            AnalysisMode::SequentialStream => Some(Box::new(SequentialScan::new())),
            AnalysisMode::WeakStream => Some(Box::new(WeakScan::new())),
            _ => None,
        };
        self.running = Some(RunningJob {
            id: id.clone(),
            scanner,
        });

        tokio::spawn(supervisor::supervise(
            id,
            plan,
            job.input_file.clone(),
            Arc::clone(&self.resolver),
            self.job_tx.clone(),
        ));
    }

    fn handle_job_event(&mut self, event: JobEvent) {
        match event {
            JobEvent::SetupFailed { id, error } => {
                let Some(job) = self.store.get(&id) else {
                    return;
                };
                if job.status.is_terminal() {
                    return;
                }
                warn!(id = %id, error = %error, "job setup failed");
                self.finalize(
                    &id,
                    JobStatus::Failed,
                    Some(AnalysisVerdict::fail(error.to_string())),
                );
            }
            JobEvent::Launched { id, pid } => {
                match self.store.get_mut(&id) {
                    Some(job) if !job.status.is_terminal() => job.pid = pid,
                    // Cancelled between start and launch: the signal could
                    // not be sent earlier for want of a pid, so stop the
                    // straggler now.
                    _ => {
                        if let Some(pid) = pid {
                            platform::terminate_group(pid);
                        }
                    }
                }
            }
            JobEvent::Chunk { id, text } => self.handle_chunk(&id, &text),
            JobEvent::Exited { id, code, report } => self.handle_exit(&id, code, report),
        }
    }

    fn handle_chunk(&mut self, id: &str, text: &str) {
        let Some(job) = self.store.get_mut(id) else {
            return;
        };
        // Output never grows after finalization (early abort included).
        if job.status != JobStatus::InProgress {
            return;
        }
        job.raw_output.push_str(text);

        let triggered = match &mut self.running {
            Some(running) if running.id == id => running
                .scanner
                .as_mut()
                .and_then(|scanner| scanner.feed(text)),
            _ => None,
        };

        if let Some(abort) = triggered {
            info!(id = %id, reason = %abort.reason, "early abort");
            if let Some(pid) = self.store.get(id).and_then(|job| job.pid) {
                platform::terminate_group(pid);
            }
            self.finalize(
                id,
                JobStatus::Failed,
                Some(AnalysisVerdict::fail(abort.reason)),
            );
        }
    }

    fn handle_exit(&mut self, id: &str, code: Option<i32>, report_content: Option<String>) {
        let Some(job) = self.store.get(id) else {
            return;
        };
        // Exit after early abort, cancellation, or any other finalization
        // is a no-op: status and completion time are set exactly once.
        if job.status.is_terminal() {
            return;
        }

        let mut verdict = match self.plan_analysis_for(job) {
            AnalysisMode::ExitCode => exit_code::analyze(code),
            AnalysisMode::SmallBattery => small_battery::analyze(&job.raw_output),
            AnalysisMode::Ent => ent::analyze(&job.raw_output),
            // Scanner did not trigger; the exit code decides.
            AnalysisMode::SequentialStream | AnalysisMode::WeakStream => exit_code::analyze(code),
        };

        // Fold the generated report in where one exists: a clean exit code
        // does not outrank stars in the report. A failing exit code keeps
        // its own verdict.
        if let Some(content) = report_content {
            let report_verdict = report::analyze_sts_report(&content);
            if !report_verdict.passed {
                info!(id = %id, reason = ?report_verdict.reason, "report analysis failed the run");
            }
            if verdict.passed {
                verdict = report_verdict;
            }
        }

        let status = if verdict.passed {
            JobStatus::Passed
        } else {
            JobStatus::Failed
        };
        self.finalize(id, status, Some(verdict));
    }

    /// Analysis mode for the running job, rebuilt from its suite.
    fn plan_analysis_for(&self, job: &Job) -> AnalysisMode {
        job.suite.map_or(AnalysisMode::ExitCode, |suite| {
            runners::plan_for(
                suite,
                &job.input_file,
                &PlanContext {
                    mode: self.resolver.mode(),
                    container_image: &self.config.container_image,
                },
            )
            .analysis
        })
    }

    fn cancel(&mut self, id: &str) {
        let (status, pid) = match self.store.get(id) {
            Some(job) => (job.status, job.pid),
            None => return,
        };

        match status {
            JobStatus::InProgress => {
                info!(id = %id, "cancelling running job");
                if let Some(pid) = pid {
                    platform::terminate_group(pid);
                }
                self.finalize(
                    id,
                    JobStatus::Failed,
                    Some(AnalysisVerdict::fail("cancelled")),
                );
            }
            JobStatus::Queued => {
                info!(id = %id, "cancelling queued job");
                self.pending.retain(|pending| pending != id);
                self.finalize(
                    id,
                    JobStatus::Failed,
                    Some(AnalysisVerdict::fail("cancelled")),
                );
            }
            JobStatus::Passed | JobStatus::Failed => {}
        }
    }

    fn delete(&mut self, id: &str) {
        self.cancel(id);
        self.pending.retain(|pending| pending != id);
        if self.store.remove(id).is_some() {
            debug!(id = %id, "job deleted");
        }
    }

    /// Set terminal status and completion time exactly once, emit the
    /// finished event, free the running slot, and advance the queue.
    fn finalize(&mut self, id: &str, status: JobStatus, verdict: Option<AnalysisVerdict>) {
        let Some(job) = self.store.get_mut(id) else {
            return;
        };
        if job.status.is_terminal() {
            return;
        }

        let completed_at = Utc::now();
        job.status = status;
        job.completed_at = Some(completed_at);
        job.pid = None;
        if let Some(verdict) = verdict {
            job.parsed_result = Some(verdict);
        }
        info!(id = %id, status = %status, "job finished");

        let _ = self.events.send(EngineEvent::Finished {
            id: id.to_string(),
            status,
            completed_at,
        });

        if self
            .running
            .as_ref()
            .is_some_and(|running| running.id == id)
        {
            self.running = None;
            self.start_next();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobSpec;
    use std::time::Duration;
    use tokio::time::timeout;

    fn test_engine() -> (EngineHandle, mpsc::UnboundedReceiver<EngineEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let config = RigConfig::from_vars([("RNGRIG_EXECUTION_MODE", "native")]);
        (Engine::new(config).spawn(event_tx), event_rx)
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<EngineEvent>) -> EngineEvent {
        timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event within timeout")
            .expect("engine alive")
    }

    #[tokio::test]
    async fn malformed_submissions_create_no_job() {
        let (engine, _events) = test_engine();
        engine.enqueue(JobSpec::new("", "Ent", "/data/f.bin"));
        engine.enqueue(JobSpec::new("j1", "   ", "/data/f.bin"));
        engine.enqueue(JobSpec::new("j2", "Ent", ""));
        assert!(engine.jobs().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_suite_fails_without_launching() {
        let (engine, mut events) = test_engine();
        engine.enqueue(JobSpec::new("j1", "Mystery Battery", "/data/f.bin"));

        assert_eq!(
            next_event(&mut events).await,
            EngineEvent::Started {
                id: "j1".to_string()
            }
        );
        match next_event(&mut events).await {
            EngineEvent::Finished { id, status, .. } => {
                assert_eq!(id, "j1");
                assert_eq!(status, JobStatus::Failed);
            }
            other => panic!("expected finished, got {other:?}"),
        }

        let record = engine.job_record("j1").await.expect("record");
        assert_eq!(record.status, JobStatus::Failed);
        assert!(record.completed_at.is_some());
        let verdict = record.parsed_result.expect("verdict");
        assert!(verdict.reason.unwrap().contains("unknown test suite"));
    }

    #[tokio::test]
    async fn unknown_suites_do_not_stall_the_queue() {
        let (engine, mut events) = test_engine();
        engine.enqueue(JobSpec::new("a", "Nope", "/data/f.bin"));
        engine.enqueue(JobSpec::new("b", "Also Nope", "/data/f.bin"));

        let mut started = Vec::new();
        for _ in 0..4 {
            if let EngineEvent::Started { id } = next_event(&mut events).await {
                started.push(id);
            }
        }
        assert_eq!(started, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn rehydrated_jobs_are_listed_and_never_requeued() {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let config = RigConfig::from_vars([("RNGRIG_EXECUTION_MODE", "native")]);

        let spec = JobSpec::new("old-1", "Ent", "/data/f.bin");
        let mut terminal = Job::from_spec(&spec, Utc::now()).record();
        terminal.status = JobStatus::Passed;
        terminal.completed_at = Some(Utc::now());

        let stale_spec = JobSpec::new("old-2", "Crush", "/data/f.bin");
        let mut stale = Job::from_spec(&stale_spec, Utc::now()).record();
        stale.status = JobStatus::InProgress;

        let engine = Engine::new(config)
            .with_history(vec![terminal, stale])
            .spawn(event_tx);

        let records = engine.jobs().await;
        assert_eq!(records.len(), 2);

        let old1 = engine.job_record("old-1").await.expect("old-1");
        assert_eq!(old1.status, JobStatus::Passed);

        // A session died mid-run; its process is unrecoverable.
        let old2 = engine.job_record("old-2").await.expect("old-2");
        assert_eq!(old2.status, JobStatus::Failed);
        assert!(old2.completed_at.is_some());

        // Nothing was started for rehydrated records.
        assert!(event_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let (engine, mut events) = test_engine();
        engine.enqueue(JobSpec::new("j1", "Mystery", "/data/f.bin"));
        let _ = next_event(&mut events).await;
        let _ = next_event(&mut events).await;

        engine.delete_job("j1");
        assert!(engine.job_record("j1").await.is_none());
    }

    #[tokio::test]
    async fn duplicate_terminal_id_can_be_resubmitted() {
        let (engine, mut events) = test_engine();
        engine.enqueue(JobSpec::new("j1", "Mystery", "/data/f.bin"));
        let _ = next_event(&mut events).await;
        let _ = next_event(&mut events).await;

        // Same id again after the first finalized: a fresh record.
        engine.enqueue(JobSpec::new("j1", "Still Mystery", "/data/f.bin"));
        assert_eq!(
            next_event(&mut events).await,
            EngineEvent::Started {
                id: "j1".to_string()
            }
        );
    }
}
