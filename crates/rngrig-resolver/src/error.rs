use thiserror::Error;

use crate::tool::ToolId;

/// Errors surfaced while locating, validating, or launching a tool.
///
/// Each is fatal for the job that triggered it and never retried; the
/// engine maps all of them onto the same "Failed" finalization so callers
/// see one uniform failure shape.
#[derive(Error, Debug, Clone)]
pub enum ResolverError {
    #[error("resolved path for {tool} does not exist: {path}")]
    ToolPathInvalid { tool: ToolId, path: String },

    #[error("failed to launch {program}: {reason}")]
    LaunchFailure { program: String, reason: String },
}
