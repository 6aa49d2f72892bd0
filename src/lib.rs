//! rngrig — batch execution engine for statistical randomness test
//! batteries.
//!
//! The engine runs external test suites (a sequential bit-stream tester,
//! TestU01-style batteries, a NIST-style bit-sequence battery, an entropy
//! estimator, and a dieharder-style battery) against binary files, one job
//! at a time, and reports pass/fail verdicts to the embedding host.
//!
//! Library consumers embed [`Engine`] / [`EngineHandle`] directly and
//! receive [`EngineEvent`]s on a channel they own. The bundled CLI
//! ([`cli`]) is a thin host around the same API.

pub mod cli;
pub mod doctor;
pub mod logging;

pub use rngrig_analyzers::AnalysisVerdict;
pub use rngrig_config::{ExecutionMode, RigConfig};
pub use rngrig_engine::{
    Engine, EngineEvent, EngineHandle, JobRecord, JobSpec, JobStatus, TestSuite,
};
pub use rngrig_resolver::{ResolvedTool, Resolver, ToolId};
