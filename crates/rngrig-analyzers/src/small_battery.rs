//! Verdict for the small TestU01 battery, which prints a textual summary.
//!
//! The battery ends with either an all-passed line or a table of p-values
//! outside the acceptable range. Absence of the pass marker is treated as
//! failure too: a crashed or truncated run must not count as a pass.

use crate::AnalysisVerdict;

/// Literal printed when every test in the battery passed.
pub const PASS_MARKER: &str = "All tests were passed";

/// Literal heading the battery prints above its failed-test table.
pub const OUT_OF_RANGE_MARKER: &str =
    "The following tests gave p-values outside [0.001, 0.9990]:";

/// Analyze the battery's accumulated stdout/stderr.
#[must_use]
pub fn analyze(output: &str) -> AnalysisVerdict {
    if output.contains(PASS_MARKER) {
        return AnalysisVerdict::pass();
    }
    if output.contains(OUT_OF_RANGE_MARKER) {
        return AnalysisVerdict::fail("p-values outside acceptable range");
    }
    AnalysisVerdict::fail("summary pass marker not found")
}
