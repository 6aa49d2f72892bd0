//! Environment preflight checks.
//!
//! Answers "will a job actually be able to run here" before anything is
//! enqueued: execution mode, tools root, and every tool's resolution and
//! validation status. Bare commands are additionally looked up on `PATH`,
//! as a warning only — by contract they are resolved at launch time.

use chrono::{DateTime, Utc};
use serde::Serialize;

use rngrig_config::RigConfig;
use rngrig_resolver::{PathKind, Resolver, ToolId};

/// Status of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl CheckStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Warn => "warn",
            Self::Fail => "fail",
        }
    }
}

/// One preflight check result.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorCheck {
    pub name: String,
    pub status: CheckStatus,
    pub details: String,
}

/// Full preflight output.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorOutput {
    pub emitted_at: DateTime<Utc>,
    /// False when any check failed outright.
    pub ok: bool,
    pub checks: Vec<DoctorCheck>,
}

/// Run all preflight checks against the given configuration.
#[must_use]
pub fn run_checks(config: &RigConfig) -> DoctorOutput {
    let resolver = Resolver::new(config.clone());
    let mut checks = Vec::new();

    checks.push(DoctorCheck {
        name: "execution-mode".to_string(),
        status: CheckStatus::Pass,
        details: resolver.mode().to_string(),
    });

    let tools_root = resolver.tools_root();
    checks.push(DoctorCheck {
        name: "tools-root".to_string(),
        status: if tools_root.is_dir() {
            CheckStatus::Pass
        } else {
            CheckStatus::Warn
        },
        details: tools_root.display().to_string(),
    });

    for tool in ToolId::all() {
        let resolved = resolver.resolve(tool);
        let name = format!("tool:{tool}");
        let check = match resolved.kind {
            PathKind::BareCommand => match which::which(&resolved.path) {
                Ok(found) => DoctorCheck {
                    name,
                    status: CheckStatus::Pass,
                    details: found.display().to_string(),
                },
                Err(_) => DoctorCheck {
                    name,
                    status: CheckStatus::Warn,
                    details: format!("{} not found on PATH", resolved.path),
                },
            },
            PathKind::Bundled => match resolver.validate(&resolved) {
                Ok(()) => DoctorCheck {
                    name,
                    status: CheckStatus::Pass,
                    details: resolved.path,
                },
                Err(err) => DoctorCheck {
                    name,
                    status: CheckStatus::Fail,
                    details: err.to_string(),
                },
            },
        };
        checks.push(check);
    }

    let ok = !checks
        .iter()
        .any(|check| check.status == CheckStatus::Fail);
    DoctorOutput {
        emitted_at: Utc::now(),
        ok,
        checks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config_with_tools(dir: &Path) -> RigConfig {
        RigConfig::from_vars([
            ("RNGRIG_EXECUTION_MODE", "native".to_string()),
            ("RNGRIG_TOOLS_DIR", dir.to_string_lossy().into_owned()),
        ])
    }

    #[test]
    fn missing_bundled_tools_fail() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = run_checks(&config_with_tools(dir.path()));
        assert!(!output.ok);
        let nist = output
            .checks
            .iter()
            .find(|c| c.name == "tool:NIST")
            .expect("NIST check");
        assert_eq!(nist.status, CheckStatus::Fail);
    }

    #[cfg(unix)]
    #[test]
    fn present_bundled_tools_pass() {
        let dir = tempfile::tempdir().expect("tempdir");
        for (sub, name) in [
            ("sts", "nist"),
            ("practrand", "RNG_test"),
            ("crushing", "crush"),
            ("crushing", "Bcrush"),
            ("crushing", "rabbit"),
            ("crushing", "scrush"),
            ("crushing", "alpha"),
        ] {
            let sub = dir.path().join(sub);
            std::fs::create_dir_all(&sub).expect("mkdir");
            std::fs::write(sub.join(name), b"#!/bin/sh\n").expect("write");
        }
        let output = run_checks(&config_with_tools(dir.path()));
        // Bundled tools all pass; bare commands may only warn.
        assert!(output.ok);
        assert!(
            output
                .checks
                .iter()
                .filter(|c| c.name.starts_with("tool:") && !c.name.contains("ENT")
                    && !c.name.contains("DIEHARDER"))
                .all(|c| c.status == CheckStatus::Pass)
        );
    }

    #[test]
    fn mode_check_reports_the_effective_mode() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = run_checks(&config_with_tools(dir.path()));
        let mode = output
            .checks
            .iter()
            .find(|c| c.name == "execution-mode")
            .expect("mode check");
        assert_eq!(mode.details, "native");
    }
}
