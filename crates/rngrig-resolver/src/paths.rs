//! Discovery of the bundled tools root.
//!
//! The bundled test binaries ship in an `rngtools/` tree. Where that tree
//! sits depends on how the host application is packaged, so discovery
//! scans a fixed candidate list and takes the first directory that exists.

use std::path::PathBuf;

use rngrig_config::RigConfig;
use tracing::{debug, warn};

/// Directory name of the bundled tools tree.
pub const TOOLS_DIR_NAME: &str = "rngtools";

/// Locate the bundled tools root.
///
/// Candidates, in order: the configured directory, `rngtools/` under the
/// current working directory, `rngtools/` next to the executable, and the
/// per-user data directory. When none exists the cwd candidate is returned
/// anyway so that per-tool validation produces the actual error.
#[must_use]
pub fn tools_root(config: &RigConfig) -> PathBuf {
    let mut candidates: Vec<PathBuf> = Vec::with_capacity(4);

    if let Some(dir) = &config.tools_dir {
        candidates.push(dir.clone());
    }
    let cwd_default = std::env::current_dir()
        .map(|cwd| cwd.join(TOOLS_DIR_NAME))
        .unwrap_or_else(|_| PathBuf::from(TOOLS_DIR_NAME));
    candidates.push(cwd_default.clone());
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            candidates.push(dir.join(TOOLS_DIR_NAME));
        }
    }
    if let Some(data) = dirs::data_dir() {
        candidates.push(data.join("rngrig").join(TOOLS_DIR_NAME));
    }

    for candidate in &candidates {
        if candidate.is_dir() {
            debug!(path = %candidate.display(), "using tools root");
            return candidate.clone();
        }
    }

    warn!(
        tried = ?candidates,
        fallback = %cwd_default.display(),
        "tools root not found; falling back"
    );
    cwd_default
}
