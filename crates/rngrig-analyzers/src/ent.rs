//! Analyzer for the entropy estimator's textual output.
//!
//! The estimator prints a handful of English sentences with embedded
//! numbers. Five fields are extracted with fixed patterns; all five must
//! parse for the run to be judged at all, and each has an independent
//! acceptance condition. The parsed fields are surfaced as metrics even
//! when the verdict is a failure, so the caller can display them.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::AnalysisVerdict;

/// Reference value the Monte-Carlo π estimate is compared against.
pub const PI_REF: f64 = 3.141_592_653_5;

/// Minimum acceptable entropy in bits per byte.
pub const MIN_ENTROPY: f64 = 7.9;

/// Maximum acceptable |serial correlation coefficient|.
pub const MAX_SERIAL_CORRELATION: f64 = 0.1;

static ENTROPY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Entropy = ([\d.]+) bits per byte").expect("static pattern"));
static FILE_BYTES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"of this (\d+) byte file").expect("static pattern"));
static MONTE_CARLO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Monte Carlo value for Pi is ([\d.]+)").expect("static pattern"));
static SERIAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Serial correlation coefficient is ([-\d.]+)").expect("static pattern")
});
static CHI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"would exceed this value ([\d.]+) percent").expect("static pattern"));

/// Fields extracted from the estimator's output.
///
/// Every field is optional: a pattern that does not match (or whose number
/// does not parse) leaves its field `None`, and any `None` fails the
/// verdict.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntMetrics {
    /// Entropy in bits per byte.
    pub entropy: Option<f64>,
    /// Size of the input file in bytes.
    pub file_bytes: Option<u64>,
    /// Monte-Carlo estimate of π.
    pub monte_carlo_pi: Option<f64>,
    /// Absolute value of the serial correlation coefficient.
    pub serial_correlation_abs: Option<f64>,
    /// Chi-square exceed probability, in percent.
    pub chi_probability_percent: Option<f64>,
}

/// Extract the five fixed fields from the estimator's stdout.
#[must_use]
pub fn parse(output: &str) -> EntMetrics {
    fn capture_f64(re: &Regex, output: &str) -> Option<f64> {
        re.captures(output)?.get(1)?.as_str().parse().ok()
    }

    EntMetrics {
        entropy: capture_f64(&ENTROPY_RE, output),
        file_bytes: FILE_BYTES_RE
            .captures(output)
            .and_then(|c| c.get(1)?.as_str().parse().ok()),
        monte_carlo_pi: capture_f64(&MONTE_CARLO_RE, output),
        serial_correlation_abs: capture_f64(&SERIAL_RE, output).map(f64::abs),
        chi_probability_percent: capture_f64(&CHI_RE, output),
    }
}

/// Judge parsed metrics against the acceptance conditions.
///
/// All conditions are independent; the first violated one names the
/// failure. The π tolerance scales with sample count: `1.23 / sqrt(bytes /
/// 2)`, the standard error of the estimator at that sample size.
#[must_use]
pub fn judge(metrics: &EntMetrics) -> AnalysisVerdict {
    let metrics_json = || serde_json::to_value(metrics).unwrap_or(serde_json::Value::Null);

    let (
        Some(entropy),
        Some(file_bytes),
        Some(monte_carlo_pi),
        Some(serial_correlation_abs),
        Some(chi_probability_percent),
    ) = (
        metrics.entropy,
        metrics.file_bytes,
        metrics.monte_carlo_pi,
        metrics.serial_correlation_abs,
        metrics.chi_probability_percent,
    )
    else {
        return AnalysisVerdict::fail("output did not contain all expected fields")
            .with_metrics(metrics_json());
    };

    let verdict = if entropy < MIN_ENTROPY {
        AnalysisVerdict::fail(format!("entropy {entropy} below {MIN_ENTROPY} bits per byte"))
    } else if !(1.0..=99.0).contains(&chi_probability_percent) {
        AnalysisVerdict::fail(format!(
            "chi-square exceed probability {chi_probability_percent}% outside [1, 99]"
        ))
    } else if serial_correlation_abs > MAX_SERIAL_CORRELATION {
        AnalysisVerdict::fail(format!(
            "serial correlation {serial_correlation_abs} above {MAX_SERIAL_CORRELATION}"
        ))
    } else {
        let tolerance = 1.23 / (file_bytes as f64 / 2.0).sqrt();
        if (monte_carlo_pi - PI_REF).abs() > tolerance {
            AnalysisVerdict::fail(format!(
                "Monte Carlo pi {monte_carlo_pi} deviates more than {tolerance} from {PI_REF}"
            ))
        } else {
            AnalysisVerdict::pass()
        }
    };

    verdict.with_metrics(metrics_json())
}

/// Parse and judge in one step.
#[must_use]
pub fn analyze(output: &str) -> AnalysisVerdict {
    judge(&parse(output))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_output(
        entropy: f64,
        bytes: u64,
        pi: f64,
        serial: f64,
        chi_percent: f64,
    ) -> String {
        format!(
            "Entropy = {entropy} bits per byte.\n\
             \n\
             Optimum compression would reduce the size\n\
             of this {bytes} byte file by 0 percent.\n\
             \n\
             Chi square distribution for {bytes} samples is 250.00, and randomly\n\
             would exceed this value {chi_percent} percent of the times.\n\
             \n\
             Arithmetic mean value of data bytes is 127.5 (127.5 = random).\n\
             Monte Carlo value for Pi is {pi} (error 0.01 percent).\n\
             Serial correlation coefficient is {serial} (totally uncorrelated = 0.0).\n"
        )
    }

    #[test]
    fn nominal_output_passes() {
        let verdict = analyze(&sample_output(7.999, 1_000_000, 3.1416, 0.01, 50.0));
        assert!(verdict.passed, "reason: {:?}", verdict.reason);
        assert!(verdict.metrics.is_some());
    }

    #[test]
    fn low_entropy_fails() {
        let verdict = analyze(&sample_output(7.5, 1_000_000, 3.1416, 0.01, 50.0));
        assert!(!verdict.passed);
        assert!(verdict.reason.unwrap().contains("entropy"));
    }

    #[test]
    fn chi_probability_bounds_are_inclusive() {
        assert!(analyze(&sample_output(7.99, 1_000_000, 3.1416, 0.01, 1.0)).passed);
        assert!(analyze(&sample_output(7.99, 1_000_000, 3.1416, 0.01, 99.0)).passed);
        assert!(!analyze(&sample_output(7.99, 1_000_000, 3.1416, 0.01, 0.5)).passed);
        assert!(!analyze(&sample_output(7.99, 1_000_000, 3.1416, 0.01, 99.5)).passed);
    }

    #[test]
    fn serial_correlation_sign_is_ignored() {
        let verdict = analyze(&sample_output(7.99, 1_000_000, 3.1416, -0.05, 50.0));
        assert!(verdict.passed);
        let verdict = analyze(&sample_output(7.99, 1_000_000, 3.1416, -0.2, 50.0));
        assert!(!verdict.passed);
    }

    #[test]
    fn pi_tolerance_scales_with_file_size() {
        // tolerance = 1.23 / sqrt(bytes / 2): 1000 bytes allow a deviation
        // of ~0.055, a million bytes only ~0.0017.
        assert!(analyze(&sample_output(7.99, 1_000, 3.19, 0.01, 50.0)).passed);
        assert!(!analyze(&sample_output(7.99, 1_000_000, 3.19, 0.01, 50.0)).passed);
    }

    #[test]
    fn missing_field_fails() {
        let mut output = sample_output(7.99, 1_000_000, 3.1416, 0.01, 50.0);
        output = output.replace("Monte Carlo value for Pi", "Monte Carlo value for tau");
        let verdict = analyze(&output);
        assert!(!verdict.passed);
        assert!(verdict.reason.unwrap().contains("expected fields"));
        // Metrics still carry whatever did parse.
        assert!(verdict.metrics.is_some());
    }

    #[test]
    fn empty_output_fails() {
        assert!(!analyze("").passed);
    }

    #[test]
    fn parse_extracts_all_fields() {
        let metrics = parse(&sample_output(7.999, 42, 3.14, -0.03, 25.0));
        assert_eq!(metrics.entropy, Some(7.999));
        assert_eq!(metrics.file_bytes, Some(42));
        assert_eq!(metrics.monte_carlo_pi, Some(3.14));
        assert_eq!(metrics.serial_correlation_abs, Some(0.03));
        assert_eq!(metrics.chi_probability_percent, Some(25.0));
    }
}
