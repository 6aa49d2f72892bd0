//! Analyzer for the bit-sequence battery's generated report file.
//!
//! The battery writes a final analysis report in which failed proportions
//! are flagged with `*`. The verdict scans the report in two phases:
//!
//! 1. Locate the first line containing `Frequency`. That line and the next
//!    four form the frequency block; any `*` inside it fails immediately —
//!    a frequency failure invalidates the rest of the battery.
//! 2. Count `*` characters over the remaining lines; reaching the threshold
//!    fails the run.
//!
//! A report with no `Frequency` line at all is treated as a pass: the
//! battery did not get far enough to flag anything.

use crate::AnalysisVerdict;

/// Total stars in the post-frequency section that fail the run.
pub const STAR_FAIL_THRESHOLD: usize = 5;

/// Lines in the frequency block, counting the `Frequency` line itself.
const FREQUENCY_BLOCK_LINES: usize = 5;

/// Analyze the full contents of the generated report file.
#[must_use]
pub fn analyze_sts_report(content: &str) -> AnalysisVerdict {
    let lines: Vec<&str> = content.lines().collect();

    let Some(frequency_idx) = lines.iter().position(|line| line.contains("Frequency")) else {
        return AnalysisVerdict::pass();
    };

    let block_end = (frequency_idx + FREQUENCY_BLOCK_LINES).min(lines.len());
    if lines[frequency_idx..block_end]
        .iter()
        .any(|line| line.contains('*'))
    {
        return AnalysisVerdict::fail("star (*) in Frequency block");
    }

    let mut star_count = 0usize;
    for line in &lines[block_end..] {
        star_count += line.matches('*').count();
        if star_count >= STAR_FAIL_THRESHOLD {
            return AnalysisVerdict::fail(format!(
                "five or more stars (*) in report (count: {star_count})"
            ));
        }
    }

    AnalysisVerdict::pass()
}
