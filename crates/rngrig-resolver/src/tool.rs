use std::path::{Path, PathBuf};

/// Symbolic identifier for every external test binary the engine can run.
///
/// Derived from a job's test suite at resolution time; never persisted.
/// Bundled tools live under the tools root at a fixed relative path;
/// host-installed tools are bare commands resolved via `PATH` at launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolId {
    NistSts,
    PractRand,
    Testu01Crush,
    Testu01Bcrush,
    Testu01Rabbit,
    Testu01Scrush,
    Testu01Alpha,
    Ent,
    Dieharder,
}

/// Default location of a tool when no override is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolLocation {
    /// Relative path under the bundled tools root.
    Bundled(PathBuf),
    /// Bare command expected on the host `PATH`.
    HostCommand(&'static str),
}

impl ToolId {
    /// Key used in override environment variables
    /// (`RNGRIG_<KEY>_PATH` / `RNGRIG_<KEY>_WSL_PATH`).
    #[must_use]
    pub const fn env_key(self) -> &'static str {
        match self {
            Self::NistSts => "NIST",
            Self::PractRand => "PRACTRAND",
            Self::Testu01Crush => "TESTU01_CRUSH",
            Self::Testu01Bcrush => "TESTU01_BCRUSH",
            Self::Testu01Rabbit => "TESTU01_RABBIT",
            Self::Testu01Scrush => "TESTU01_SCRUSH",
            Self::Testu01Alpha => "TESTU01_ALPHA",
            Self::Ent => "ENT",
            Self::Dieharder => "DIEHARDER",
        }
    }

    /// Default location relative to the given tools root.
    #[must_use]
    pub fn default_location(self, tools_root: &Path) -> ToolLocation {
        match self {
            Self::NistSts => ToolLocation::Bundled(tools_root.join("sts").join("nist")),
            Self::PractRand => {
                ToolLocation::Bundled(tools_root.join("practrand").join("RNG_test"))
            }
            Self::Testu01Crush => {
                ToolLocation::Bundled(tools_root.join("crushing").join("crush"))
            }
            Self::Testu01Bcrush => {
                ToolLocation::Bundled(tools_root.join("crushing").join("Bcrush"))
            }
            Self::Testu01Rabbit => {
                ToolLocation::Bundled(tools_root.join("crushing").join("rabbit"))
            }
            Self::Testu01Scrush => {
                ToolLocation::Bundled(tools_root.join("crushing").join("scrush"))
            }
            Self::Testu01Alpha => {
                ToolLocation::Bundled(tools_root.join("crushing").join("alpha"))
            }
            // System-installed utilities are plain executable names; they are
            // not part of the bundled tools tree.
            Self::Ent => ToolLocation::HostCommand("ent"),
            Self::Dieharder => ToolLocation::HostCommand("dieharder"),
        }
    }

    /// Subdirectory of the tools root a tool expects as its working
    /// directory, if it has one.
    #[must_use]
    pub const fn bundle_dir(self) -> Option<&'static str> {
        match self {
            Self::NistSts => Some("sts"),
            Self::PractRand => Some("practrand"),
            Self::Testu01Crush
            | Self::Testu01Bcrush
            | Self::Testu01Rabbit
            | Self::Testu01Scrush
            | Self::Testu01Alpha => Some("crushing"),
            Self::Ent => Some("ent"),
            Self::Dieharder => None,
        }
    }

    /// All tool identifiers, for preflight checks.
    #[must_use]
    pub const fn all() -> [Self; 9] {
        [
            Self::NistSts,
            Self::PractRand,
            Self::Testu01Crush,
            Self::Testu01Bcrush,
            Self::Testu01Rabbit,
            Self::Testu01Scrush,
            Self::Testu01Alpha,
            Self::Ent,
            Self::Dieharder,
        ]
    }
}

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.env_key())
    }
}
