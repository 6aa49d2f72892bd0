//! Exit-code-only verdict for the batteries that print no parseable summary.
//!
//! The standard, big, alpha, and pairwise battery variants are trusted on
//! their exit status alone: zero is a pass, anything else (including death
//! by signal, where no code exists) is a failure.

use crate::AnalysisVerdict;

/// Map a process exit code to a verdict.
#[must_use]
pub fn analyze(code: Option<i32>) -> AnalysisVerdict {
    match code {
        Some(0) => AnalysisVerdict::pass(),
        Some(code) => AnalysisVerdict::fail(format!("exit code {code}")),
        None => AnalysisVerdict::fail("terminated by signal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_passes() {
        assert!(analyze(Some(0)).passed);
    }

    #[test]
    fn nonzero_fails_with_code_in_reason() {
        let verdict = analyze(Some(2));
        assert!(!verdict.passed);
        assert_eq!(verdict.reason.as_deref(), Some("exit code 2"));
    }

    #[test]
    fn signal_death_fails() {
        assert!(!analyze(None).passed);
    }
}
