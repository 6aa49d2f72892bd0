//! Streaming scanners for long-running batteries.
//!
//! The sequential bit-stream tester and the dieharder-style battery can run
//! for hours, but their output makes some failures certain long before the
//! process exits. These scanners consume output chunk-by-chunk and tell the
//! engine the moment an abort is warranted.
//!
//! Matching is case-insensitive and purely substring-based, the same rules
//! the tools' own documentation uses for their severity labels. Counts
//! accumulate across chunks; a keyword split across a chunk boundary is not
//! matched, which mirrors how the tools emit whole lines per write.

/// Why a scanner wants the process stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbortReason {
    pub reason: String,
}

impl AbortReason {
    fn new(reason: String) -> Self {
        Self { reason }
    }
}

/// Chunk-by-chunk output scanner with early-abort detection.
///
/// `feed` returns `Some` exactly once, on the chunk that makes failure
/// certain; the engine then terminates the process and finalizes the job.
/// Chunks after a trigger are not fed (the engine stops on first abort).
pub trait StreamAnalyzer: Send {
    fn feed(&mut self, chunk: &str) -> Option<AbortReason>;
}

/// Scanner for the sequential bit-stream tester.
///
/// Fails instantly on "fail" (any case); otherwise fails once the combined
/// count of "unusual" and "suspicious" occurrences reaches the threshold.
#[derive(Debug, Default)]
pub struct SequentialScan {
    anomaly_count: usize,
}

impl SequentialScan {
    pub const ANOMALY_THRESHOLD: usize = 3;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StreamAnalyzer for SequentialScan {
    fn feed(&mut self, chunk: &str) -> Option<AbortReason> {
        let lower = chunk.to_lowercase();
        if lower.contains("fail") {
            return Some(AbortReason::new("\"fail\" occurred".to_string()));
        }
        self.anomaly_count +=
            lower.matches("unusual").count() + lower.matches("suspicious").count();
        if self.anomaly_count >= Self::ANOMALY_THRESHOLD {
            return Some(AbortReason::new(format!(
                "\"unusual\" + \"suspicious\" count reached {} (threshold {})",
                self.anomaly_count,
                Self::ANOMALY_THRESHOLD
            )));
        }
        None
    }
}

/// Scanner for the dieharder-style battery.
///
/// Fails instantly on "fail" (any case); otherwise fails once "weak" has
/// occurred at least the threshold number of times.
#[derive(Debug, Default)]
pub struct WeakScan {
    weak_count: usize,
}

impl WeakScan {
    pub const WEAK_THRESHOLD: usize = 3;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StreamAnalyzer for WeakScan {
    fn feed(&mut self, chunk: &str) -> Option<AbortReason> {
        let lower = chunk.to_lowercase();
        if lower.contains("fail") {
            return Some(AbortReason::new("\"fail\" occurred".to_string()));
        }
        self.weak_count += lower.matches("weak").count();
        if self.weak_count >= Self::WEAK_THRESHOLD {
            return Some(AbortReason::new(format!(
                "\"weak\" occurred {} times (threshold {})",
                self.weak_count,
                Self::WEAK_THRESHOLD
            )));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_aborts_on_fail_any_case() {
        let mut scan = SequentialScan::new();
        let abort = scan.feed("length= 256 megabytes  FAIL !!\n");
        assert!(abort.is_some());
        assert!(abort.unwrap().reason.contains("fail"));
    }

    #[test]
    fn sequential_counts_across_chunks() {
        let mut scan = SequentialScan::new();
        assert!(scan.feed("BCFN  unusual\n").is_none());
        assert!(scan.feed("DC6   unusual\n").is_none());
        // Third combined occurrence trips the threshold.
        let abort = scan.feed("Gap16 suspicious\n");
        assert!(abort.is_some());
        assert!(abort.unwrap().reason.contains("reached 3"));
    }

    #[test]
    fn sequential_counts_multiple_hits_in_one_chunk() {
        let mut scan = SequentialScan::new();
        assert!(
            scan.feed("unusual unusual UNUSUAL")
                .is_some_and(|a| a.reason.contains("reached 3"))
        );
    }

    #[test]
    fn sequential_below_threshold_is_quiet() {
        let mut scan = SequentialScan::new();
        assert!(scan.feed("unusual\n").is_none());
        assert!(scan.feed("suspicious\n").is_none());
        assert!(scan.feed("no anomalies here\n").is_none());
    }

    #[test]
    fn weak_aborts_on_fail() {
        let mut scan = WeakScan::new();
        assert!(scan.feed("diehard_birthdays ... FAILED\n").is_some());
    }

    #[test]
    fn weak_threshold_is_three() {
        let mut scan = WeakScan::new();
        assert!(scan.feed("diehard_craps ... WEAK\n").is_none());
        assert!(scan.feed("sts_monobit   ... WEAK\n").is_none());
        let abort = scan.feed("rgb_bitdist   ... WEAK\n");
        assert!(abort.is_some());
        assert!(abort.unwrap().reason.contains("3 times"));
    }

    #[test]
    fn weak_ignores_passed_lines() {
        let mut scan = WeakScan::new();
        assert!(scan.feed("diehard_birthdays ... PASSED\n").is_none());
    }
}
