//! Batch execution engine for external randomness test batteries.
//!
//! The engine accepts jobs (test suite + input file), runs them strictly
//! one at a time in submission order, supervises the external process with
//! tool-specific early-abort analysis, and reports lifecycle events to an
//! injected sink. It never re-implements a statistical test; it launches
//! pre-built binaries and interprets their output.
//!
//! # Structure
//!
//! - [`job`] — job records, suite names, statuses, the per-job state
//!   machine's data.
//! - [`runners`] — the suite registry: how each battery is invoked and
//!   analyzed.
//! - [`supervisor`] — per-job task driving resolve → validate → spawn →
//!   stream → exit.
//! - [`queue`] — the single-flight FIFO actor and its [`EngineHandle`].
//!
//! # Concurrency model
//!
//! One tokio task owns all queue and job-store state; supervisors and
//! callers communicate with it exclusively through messages. At most one
//! child process is in flight at any instant, enforced by the admission
//! check rather than any lock.

pub mod job;
pub mod queue;
pub mod runners;

mod events;
mod supervisor;

pub use events::EngineEvent;
pub use job::{Job, JobRecord, JobSpec, JobStatus, TestSuite};
pub use queue::{Engine, EngineHandle};
pub use rngrig_analyzers::AnalysisVerdict;
