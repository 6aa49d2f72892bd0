//! Environment-derived configuration for the rngrig engine.
//!
//! Everything the engine can be steered with from the outside lives here:
//! the execution-mode override, the container image used for containerized
//! dispatch, the bundled-tools directory, and per-tool path overrides.
//! Configuration is read once at startup; nothing in this crate touches the
//! environment after [`RigConfig::from_env`] returns.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default container image for containerized test dispatch.
pub const DEFAULT_CONTAINER_IMAGE: &str = "rngrig-tools";

/// Environment variable selecting the execution mode.
pub const EXECUTION_MODE_VAR: &str = "RNGRIG_EXECUTION_MODE";

/// Environment variable overriding the container image.
pub const CONTAINER_IMAGE_VAR: &str = "RNGRIG_CONTAINER_IMAGE";

/// Environment variable overriding the bundled-tools directory.
pub const TOOLS_DIR_VAR: &str = "RNGRIG_TOOLS_DIR";

/// How external test binaries are dispatched on this host.
///
/// The mode is process-wide: it is derived once from the host platform and
/// an optional override, and every launch goes through the same dispatch
/// strategy afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Spawn the tool binary directly on the host.
    Native,
    /// Wrap every invocation in `wsl <path> <args...>` (Windows hosts).
    Wsl,
    /// Dispatch inside a container for the suites that support it.
    Container,
}

impl ExecutionMode {
    /// Parse an override value from the environment.
    ///
    /// Accepts the canonical names plus the spellings the host UI has
    /// historically used (`linux` for native, `docker` for container).
    /// Returns `None` for anything unrecognized.
    #[must_use]
    pub fn parse_override(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "native" | "linux" => Some(Self::Native),
            "wsl" => Some(Self::Wsl),
            "container" | "docker" => Some(Self::Container),
            _ => None,
        }
    }

    /// Derive the effective mode from an optional override and the platform.
    ///
    /// An override always wins. Without one, Windows hosts dispatch through
    /// WSL and every other platform runs tools natively.
    #[must_use]
    pub fn detect(override_mode: Option<Self>) -> Self {
        if let Some(mode) = override_mode {
            return mode;
        }
        if cfg!(target_os = "windows") {
            Self::Wsl
        } else {
            Self::Native
        }
    }

    /// Stable lowercase name for logs and status output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Wsl => "wsl",
            Self::Container => "container",
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which flavor of a per-tool override to read.
///
/// Host overrides (`RNGRIG_<TOOL>_PATH`) are host-filesystem paths or bare
/// commands; WSL overrides (`RNGRIG_<TOOL>_WSL_PATH`) are Linux-side paths
/// used when dispatching through the compatibility layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideFlavor {
    Host,
    Wsl,
}

/// Per-tool path override pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOverride {
    pub host: Option<String>,
    pub wsl: Option<String>,
}

/// Engine configuration, resolved from environment variables.
///
/// Construction goes through [`RigConfig::from_vars`], which takes any
/// iterator of key/value pairs so tests never have to mutate the process
/// environment ([`RigConfig::from_env`] is the thin production entry).
#[derive(Debug, Clone)]
pub struct RigConfig {
    /// Explicit execution-mode override, if the environment carried one.
    pub execution_mode_override: Option<ExecutionMode>,
    /// Image used for containerized dispatch.
    pub container_image: String,
    /// Explicit bundled-tools directory, if the environment carried one.
    pub tools_dir: Option<PathBuf>,
    pub overrides: HashMap<String, ToolOverride>,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            execution_mode_override: None,
            container_image: DEFAULT_CONTAINER_IMAGE.to_string(),
            tools_dir: None,
            overrides: HashMap::new(),
        }
    }
}

impl RigConfig {
    /// Read configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Build configuration from an explicit set of key/value pairs.
    ///
    /// Unrecognized `RNGRIG_*` keys are ignored; a malformed execution-mode
    /// value is ignored with a warning rather than failing startup.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut config = Self::default();

        for (key, value) in vars {
            let key = key.as_ref();
            let value: String = value.into();
            if value.is_empty() {
                continue;
            }

            match key {
                EXECUTION_MODE_VAR => match ExecutionMode::parse_override(&value) {
                    Some(mode) => config.execution_mode_override = Some(mode),
                    None => {
                        warn!("ignoring unrecognized {EXECUTION_MODE_VAR} value: {value}");
                    }
                },
                CONTAINER_IMAGE_VAR => config.container_image = value,
                TOOLS_DIR_VAR => config.tools_dir = Some(PathBuf::from(value)),
                _ => {
                    if let Some((tool, flavor)) = parse_override_key(key) {
                        let entry = config.overrides.entry(tool).or_default();
                        match flavor {
                            OverrideFlavor::Host => entry.host = Some(value),
                            OverrideFlavor::Wsl => entry.wsl = Some(value),
                        }
                    }
                }
            }
        }

        config
    }

    /// Effective execution mode for this host.
    #[must_use]
    pub fn execution_mode(&self) -> ExecutionMode {
        ExecutionMode::detect(self.execution_mode_override)
    }

    /// Look up a per-tool path override.
    ///
    /// `tool_key` is the tool's environment key, e.g. `TESTU01_SCRUSH` for
    /// `RNGRIG_TESTU01_SCRUSH_PATH` / `RNGRIG_TESTU01_SCRUSH_WSL_PATH`.
    #[must_use]
    pub fn tool_override(&self, tool_key: &str, flavor: OverrideFlavor) -> Option<&str> {
        let entry = self.overrides.get(tool_key)?;
        match flavor {
            OverrideFlavor::Host => entry.host.as_deref(),
            OverrideFlavor::Wsl => entry.wsl.as_deref(),
        }
    }
}

/// Split `RNGRIG_<TOOL>_PATH` / `RNGRIG_<TOOL>_WSL_PATH` into the tool key
/// and the flavor. Returns `None` for keys that are not tool overrides.
fn parse_override_key(key: &str) -> Option<(String, OverrideFlavor)> {
    let rest = key.strip_prefix("RNGRIG_")?;
    if let Some(tool) = rest.strip_suffix("_WSL_PATH") {
        if tool.is_empty() {
            return None;
        }
        return Some((tool.to_string(), OverrideFlavor::Wsl));
    }
    let tool = rest.strip_suffix("_PATH")?;
    if tool.is_empty() {
        return None;
    }
    Some((tool.to_string(), OverrideFlavor::Host))
}
