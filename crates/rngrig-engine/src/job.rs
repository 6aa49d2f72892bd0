//! Job model: suites, statuses, and per-job records.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rngrig_analyzers::AnalysisVerdict;

/// The nine supported test suites, by their wire names.
///
/// The host UI submits suite names as strings; parsing trims whitespace
/// and matches the exact display name. Anything else is an unknown suite,
/// which produces a job that finalizes `Failed` without launching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestSuite {
    #[serde(rename = "Pract Rand")]
    PractRand,
    #[serde(rename = "Small Crush")]
    SmallCrush,
    #[serde(rename = "Crush")]
    Crush,
    #[serde(rename = "Big Crush")]
    BigCrush,
    #[serde(rename = "Alpha")]
    Alpha,
    #[serde(rename = "Rabbit")]
    Rabbit,
    #[serde(rename = "NIST STS")]
    NistSts,
    #[serde(rename = "Die Harder")]
    DieHarder,
    #[serde(rename = "Ent")]
    Ent,
}

impl TestSuite {
    /// Display / wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PractRand => "Pract Rand",
            Self::SmallCrush => "Small Crush",
            Self::Crush => "Crush",
            Self::BigCrush => "Big Crush",
            Self::Alpha => "Alpha",
            Self::Rabbit => "Rabbit",
            Self::NistSts => "NIST STS",
            Self::DieHarder => "Die Harder",
            Self::Ent => "Ent",
        }
    }

    /// All suites, in the order the host UI lists them.
    #[must_use]
    pub const fn all() -> [Self; 9] {
        [
            Self::PractRand,
            Self::SmallCrush,
            Self::Crush,
            Self::BigCrush,
            Self::Alpha,
            Self::Rabbit,
            Self::NistSts,
            Self::DieHarder,
            Self::Ent,
        ]
    }
}

impl std::fmt::Display for TestSuite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestSuite {
    type Err = UnknownSuite;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::all()
            .into_iter()
            .find(|suite| suite.as_str() == name)
            .ok_or_else(|| UnknownSuite {
                name: name.to_string(),
            })
    }
}

/// Error for a suite name the engine does not recognize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSuite {
    pub name: String,
}

impl std::fmt::Display for UnknownSuite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown test suite: {:?}", self.name)
    }
}

impl std::error::Error for UnknownSuite {}

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    #[serde(rename = "Queued")]
    Queued,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Passed")]
    Passed,
    #[serde(rename = "Failed")]
    Failed,
}

impl JobStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "Queued",
            Self::InProgress => "In Progress",
            Self::Passed => "Passed",
            Self::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job submission from the caller.
///
/// The suite arrives as a string because submissions come from outside the
/// type system (the host UI); validation happens at enqueue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSpec {
    pub id: String,
    pub suite: String,
    pub input_file: PathBuf,
}

impl JobSpec {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        suite: impl Into<String>,
        input_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: id.into(),
            suite: suite.into(),
            input_file: input_file.into(),
        }
    }

    /// True when every required field is present and non-blank.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.id.trim().is_empty()
            && !self.suite.trim().is_empty()
            && !self.input_file.as_os_str().is_empty()
    }
}

/// Engine-internal job state.
///
/// Mutated only by the queue actor and the supervisor events it processes.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    /// Parsed suite; `None` when the submitted name was unrecognized.
    pub suite: Option<TestSuite>,
    /// Suite name as submitted, kept for records of unknown suites.
    pub suite_name: String,
    pub input_file: PathBuf,
    pub status: JobStatus,
    pub queued_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Accumulated process output; only grows while the job runs.
    pub raw_output: String,
    /// Analyzer verdict, once one has been produced.
    pub parsed_result: Option<AnalysisVerdict>,
    /// Child process id while the job is in progress.
    pub pid: Option<u32>,
}

impl Job {
    #[must_use]
    pub fn from_spec(spec: &JobSpec, queued_at: DateTime<Utc>) -> Self {
        let suite_name = spec.suite.trim().to_string();
        Self {
            id: spec.id.clone(),
            suite: suite_name.parse().ok(),
            suite_name,
            input_file: spec.input_file.clone(),
            status: JobStatus::Queued,
            queued_at,
            started_at: None,
            completed_at: None,
            raw_output: String::new(),
            parsed_result: None,
            pid: None,
        }
    }

    /// Serializable snapshot handed to callers.
    #[must_use]
    pub fn record(&self) -> JobRecord {
        JobRecord {
            id: self.id.clone(),
            suite: self.suite_name.clone(),
            input_file: self.input_file.clone(),
            status: self.status,
            queued_at: self.queued_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
            raw_output: self.raw_output.clone(),
            parsed_result: self.parsed_result.clone(),
        }
    }
}

/// Caller-visible snapshot of a job. Also the shape rehydrated from
/// external persistence at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: String,
    pub suite: String,
    pub input_file: PathBuf,
    pub status: JobStatus,
    pub queued_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub raw_output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_result: Option<AnalysisVerdict>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suite_names_round_trip() {
        for suite in TestSuite::all() {
            assert_eq!(suite.as_str().parse::<TestSuite>(), Ok(suite));
        }
    }

    #[test]
    fn suite_parse_trims_whitespace() {
        assert_eq!("  NIST STS ".parse::<TestSuite>(), Ok(TestSuite::NistSts));
    }

    #[test]
    fn suite_parse_is_exact() {
        assert!("nist sts".parse::<TestSuite>().is_err());
        assert!("Crushed".parse::<TestSuite>().is_err());
        assert!("".parse::<TestSuite>().is_err());
    }

    #[test]
    fn status_serializes_with_ui_names() {
        let json = serde_json::to_string(&JobStatus::InProgress).expect("serialize");
        assert_eq!(json, "\"In Progress\"");
    }

    #[test]
    fn malformed_specs_are_detected() {
        assert!(JobSpec::new("j1", "Ent", "/data/f.bin").is_well_formed());
        assert!(!JobSpec::new("", "Ent", "/data/f.bin").is_well_formed());
        assert!(!JobSpec::new("j1", "  ", "/data/f.bin").is_well_formed());
        assert!(!JobSpec::new("j1", "Ent", "").is_well_formed());
    }

    #[test]
    fn unknown_suite_is_kept_on_the_job() {
        let spec = JobSpec::new("j1", "Mystery Battery", "/data/f.bin");
        let job = Job::from_spec(&spec, Utc::now());
        assert_eq!(job.suite, None);
        assert_eq!(job.suite_name, "Mystery Battery");
        assert_eq!(job.status, JobStatus::Queued);
    }

    #[test]
    fn record_snapshot_matches_job() {
        let spec = JobSpec::new("j1", "Ent", "/data/f.bin");
        let job = Job::from_spec(&spec, Utc::now());
        let record = job.record();
        assert_eq!(record.id, "j1");
        assert_eq!(record.suite, "Ent");
        assert_eq!(record.status, JobStatus::Queued);
        assert!(record.completed_at.is_none());
    }
}
