//! Output analyzers for external randomness test batteries.
//!
//! Every analyzer in this crate is a pure function (or a small stateful
//! scanner) from tool output to an [`AnalysisVerdict`]. None of them touch
//! the filesystem or the process table; the engine owns all I/O and feeds
//! text in.
//!
//! Two shapes exist:
//!
//! - Buffered analyzers ([`small_battery`], [`ent`], [`report`],
//!   [`exit_code`]) run once over the complete output (or a generated
//!   report file's contents) after the process exits.
//! - Streaming scanners ([`stream`]) consume output chunk-by-chunk while
//!   the process runs, so the engine can abort a long-running battery as
//!   soon as a failure pattern is certain.

pub mod ent;
pub mod exit_code;
pub mod report;
pub mod small_battery;
pub mod stream;

mod verdict;

pub use verdict::AnalysisVerdict;
