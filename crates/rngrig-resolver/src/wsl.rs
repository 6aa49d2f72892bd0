//! WSL path conversion and existence probes.
//!
//! When dispatch goes through the compatibility layer, bundled-tool paths
//! and Windows-style file arguments must be rewritten into the layer's
//! `/mnt/<drive>/...` syntax before they reach the Linux side. Conversion
//! shells out to `wslpath`; it can fail when WSL is absent or the distro
//! is not running, so callers always get an explicit fallback signal
//! rather than a silently unconverted path.

use crate::command_spec::CommandSpec;

/// Result of a conversion attempt: the path to use plus whether the
/// unconverted original had to be kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Converted {
    pub path: String,
    pub fallback_used: bool,
}

/// True for `C:\...`-style absolute Windows paths.
pub(crate) fn looks_like_windows_path(arg: &str) -> bool {
    let bytes = arg.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && bytes[2] == b'\\'
}

/// Convert a Windows path to the layer's syntax via `wsl wslpath -a -u`.
///
/// Returns `None` when the helper cannot run or reports failure.
pub(crate) fn convert_windows_path(path: &str) -> Option<String> {
    let output = CommandSpec::new("wsl")
        .args(["wslpath", "-a", "-u"])
        .arg(path)
        .to_command()
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let converted = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if converted.is_empty() {
        None
    } else {
        Some(converted)
    }
}

/// Convert with explicit fallback: keep the original path when conversion
/// is impossible, and say so.
pub(crate) fn convert_or_fallback(path: &str) -> Converted {
    match convert_windows_path(path) {
        Some(converted) => Converted {
            path: converted,
            fallback_used: false,
        },
        None => Converted {
            path: path.to_string(),
            fallback_used: true,
        },
    }
}

/// Check that a path exists inside the layer's filesystem (`wsl test -e`).
pub(crate) fn wsl_path_exists(path: &str) -> bool {
    CommandSpec::new("wsl")
        .args(["test", "-e"])
        .arg(path)
        .to_command()
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
