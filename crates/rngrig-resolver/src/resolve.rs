//! Tool path resolution and validation.

use std::path::{Path, PathBuf};

use rngrig_config::{ExecutionMode, OverrideFlavor, RigConfig};
use tracing::debug;

use crate::error::ResolverError;
use crate::paths;
use crate::tool::{ToolId, ToolLocation};
use crate::wsl;

/// How a resolved tool path is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Concrete file path (bundled tool or explicit override).
    Bundled,
    /// Bare command name, resolved via `PATH` at launch time.
    BareCommand,
}

/// A tool path valid for the current host and execution mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTool {
    pub tool: ToolId,
    /// Path or command, already in the dispatch target's syntax.
    pub path: String,
    pub kind: PathKind,
    /// True when WSL path conversion failed and the unconverted path was
    /// kept.
    pub fallback_used: bool,
}

/// Maps symbolic tool identifiers to launchable paths for one host
/// configuration.
///
/// A resolver derives its execution mode and tools root once at
/// construction; resolution itself is cheap and performed per job.
#[derive(Debug)]
pub struct Resolver {
    config: RigConfig,
    mode: ExecutionMode,
    tools_root: PathBuf,
}

impl Resolver {
    /// Build a resolver for the given configuration.
    #[must_use]
    pub fn new(config: RigConfig) -> Self {
        let mode = config.execution_mode();
        let tools_root = paths::tools_root(&config);
        Self {
            config,
            mode,
            tools_root,
        }
    }

    /// Effective execution mode.
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Root of the bundled tools tree.
    #[must_use]
    pub fn tools_root(&self) -> &Path {
        &self.tools_root
    }

    /// Container image for containerized dispatch.
    #[must_use]
    pub fn container_image(&self) -> &str {
        &self.config.container_image
    }

    /// Resolve a tool to a launchable path or command.
    ///
    /// An explicit override wins (the WSL flavor when dispatching through
    /// the layer, the host flavor otherwise). Without one, bundled tools
    /// get their default path under the tools root — converted to the
    /// layer's syntax in WSL mode, keeping the unconverted path with
    /// `fallback_used` set when conversion fails — and host-installed
    /// tools stay bare commands.
    #[must_use]
    pub fn resolve(&self, tool: ToolId) -> ResolvedTool {
        let flavor = match self.mode {
            ExecutionMode::Wsl => OverrideFlavor::Wsl,
            ExecutionMode::Native | ExecutionMode::Container => OverrideFlavor::Host,
        };
        if let Some(path) = self.config.tool_override(tool.env_key(), flavor) {
            debug!(%tool, path, "using configured tool path");
            return ResolvedTool {
                tool,
                path: path.to_string(),
                kind: PathKind::Bundled,
                fallback_used: false,
            };
        }

        match tool.default_location(&self.tools_root) {
            ToolLocation::HostCommand(command) => ResolvedTool {
                tool,
                path: command.to_string(),
                kind: PathKind::BareCommand,
                fallback_used: false,
            },
            ToolLocation::Bundled(path) => {
                let path = path.to_string_lossy().into_owned();
                if self.mode == ExecutionMode::Wsl {
                    let converted = wsl::convert_or_fallback(&path);
                    ResolvedTool {
                        tool,
                        path: converted.path,
                        kind: PathKind::Bundled,
                        fallback_used: converted.fallback_used,
                    }
                } else {
                    ResolvedTool {
                        tool,
                        path,
                        kind: PathKind::Bundled,
                        fallback_used: false,
                    }
                }
            }
        }
    }

    /// Confirm the resolved path exists where the dispatch target will
    /// look for it.
    ///
    /// Bare commands are assumed resolvable via `PATH` at launch time. In
    /// WSL mode the probe runs inside the layer's filesystem; otherwise it
    /// is a host filesystem check.
    pub fn validate(&self, resolved: &ResolvedTool) -> Result<(), ResolverError> {
        if resolved.kind == PathKind::BareCommand {
            return Ok(());
        }
        let exists = match self.mode {
            ExecutionMode::Wsl => wsl::wsl_path_exists(&resolved.path),
            ExecutionMode::Native | ExecutionMode::Container => {
                Path::new(&resolved.path).exists()
            }
        };
        if exists {
            Ok(())
        } else {
            Err(ResolverError::ToolPathInvalid {
                tool: resolved.tool,
                path: resolved.path.clone(),
            })
        }
    }

    /// Working directory for a tool, under the tools root.
    #[must_use]
    pub fn bundle_cwd(&self, tool: ToolId) -> Option<PathBuf> {
        tool.bundle_dir().map(|dir| self.tools_root.join(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver_with(vars: Vec<(&str, String)>, tools_dir: &Path) -> Resolver {
        let mut vars = vars;
        vars.push((
            "RNGRIG_TOOLS_DIR",
            tools_dir.to_string_lossy().into_owned(),
        ));
        Resolver::new(RigConfig::from_vars(vars))
    }

    #[test]
    fn bundled_default_resolves_under_tools_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let resolver = resolver_with(vec![], dir.path());
        let resolved = resolver.resolve(ToolId::Testu01Scrush);
        assert_eq!(resolved.kind, PathKind::Bundled);
        assert!(resolved.path.ends_with("scrush"));
        assert!(resolved.path.contains("crushing"));
        assert!(!resolved.fallback_used);
    }

    #[test]
    fn override_beats_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let resolver = resolver_with(
            vec![("RNGRIG_PRACTRAND_PATH", "/custom/RNG_test".to_string())],
            dir.path(),
        );
        let resolved = resolver.resolve(ToolId::PractRand);
        assert_eq!(resolved.path, "/custom/RNG_test");
        assert_eq!(resolved.kind, PathKind::Bundled);
    }

    #[test]
    fn host_tools_resolve_to_bare_commands() {
        let dir = tempfile::tempdir().expect("tempdir");
        let resolver = resolver_with(vec![], dir.path());
        let resolved = resolver.resolve(ToolId::Ent);
        assert_eq!(resolved.kind, PathKind::BareCommand);
        assert_eq!(resolved.path, "ent");
    }

    #[test]
    fn bare_commands_validate_without_a_probe() {
        let dir = tempfile::tempdir().expect("tempdir");
        let resolver = resolver_with(vec![], dir.path());
        let resolved = resolver.resolve(ToolId::Dieharder);
        assert!(resolver.validate(&resolved).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn missing_bundled_path_fails_validation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let resolver = resolver_with(vec![], dir.path());
        let resolved = resolver.resolve(ToolId::NistSts);
        let err = resolver.validate(&resolved).unwrap_err();
        assert!(matches!(err, ResolverError::ToolPathInvalid { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn existing_bundled_path_validates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let sts = dir.path().join("sts");
        std::fs::create_dir_all(&sts).expect("mkdir");
        std::fs::write(sts.join("nist"), b"#!/bin/sh\n").expect("write");
        let resolver = resolver_with(vec![], dir.path());
        let resolved = resolver.resolve(ToolId::NistSts);
        assert!(resolver.validate(&resolved).is_ok());
    }

    #[test]
    fn bundle_cwd_points_into_tools_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let resolver = resolver_with(vec![], dir.path());
        assert_eq!(
            resolver.bundle_cwd(ToolId::Testu01Alpha),
            Some(dir.path().join("crushing"))
        );
        assert_eq!(resolver.bundle_cwd(ToolId::Dieharder), None);
    }
}
