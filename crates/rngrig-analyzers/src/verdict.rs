use serde::{Deserialize, Serialize};

/// Outcome of analyzing a tool's output.
///
/// Produced once per completed job and immutable afterwards. `reason` is
/// present on failures where the analyzer can name the trigger; `metrics`
/// carries analyzer-specific parsed values (currently only the entropy
/// estimator populates it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisVerdict {
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<serde_json::Value>,
}

impl AnalysisVerdict {
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            reason: None,
            metrics: None,
        }
    }

    #[must_use]
    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            reason: Some(reason.into()),
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: serde_json::Value) -> Self {
        self.metrics = Some(metrics);
        self
    }
}
