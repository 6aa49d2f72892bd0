use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::job::JobStatus;

/// Lifecycle events delivered to the host UI layer.
///
/// Every failure path — tool missing, launch failure, analyzer abort,
/// statistical failure, cancellation — converges on the same `Finished`
/// shape; distinguishing them requires inspecting the job record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum EngineEvent {
    Started {
        id: String,
    },
    #[serde(rename_all = "camelCase")]
    Finished {
        id: String,
        status: JobStatus,
        completed_at: DateTime<Utc>,
    },
}
