//! Uniform process launch across execution modes.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;

use rngrig_config::ExecutionMode;
use tokio::process::Child;
use tracing::debug;

use crate::command_spec::CommandSpec;
use crate::error::ResolverError;
use crate::resolve::{ResolvedTool, Resolver};
use crate::wsl;

/// What the child's standard input is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdinMode {
    /// No input; the tool reads its file argument itself.
    Null,
    /// A pipe the supervisor streams the input file into.
    Piped,
}

impl Resolver {
    /// Build the dispatchable invocation for a resolved tool.
    ///
    /// Native and container modes run the tool directly. In WSL mode the
    /// invocation is wrapped as `wsl <path> <args...>`, with Windows-style
    /// absolute path arguments pre-converted to the layer's syntax
    /// (conversion failures keep the original argument; the tool then
    /// reports the missing file itself).
    #[must_use]
    pub fn command_for(
        &self,
        resolved: &ResolvedTool,
        args: &[String],
        cwd: Option<PathBuf>,
    ) -> CommandSpec {
        let mut spec = match self.mode() {
            ExecutionMode::Wsl => CommandSpec::new("wsl").arg(&resolved.path).args(
                args.iter()
                    .map(|arg| {
                        if wsl::looks_like_windows_path(arg) {
                            wsl::convert_or_fallback(arg).path
                        } else {
                            arg.clone()
                        }
                    })
                    .map(OsString::from),
            ),
            ExecutionMode::Native | ExecutionMode::Container => {
                CommandSpec::new(&resolved.path).args(args.iter().map(OsString::from))
            }
        };
        if let Some(cwd) = cwd {
            spec = spec.cwd(cwd);
        }
        spec
    }

    /// Spawn a command, reporting failure as a value instead of raising.
    ///
    /// The child's stdout and stderr are piped for supervision; stdin is
    /// wired per `stdin`. On Unix the child is put in its own process
    /// group so a later termination signal reaches everything the tool
    /// spawned underneath itself.
    pub fn spawn(&self, spec: &CommandSpec, stdin: StdinMode) -> Result<Child, ResolverError> {
        debug!(command = %spec.display(), "spawning");
        let mut command = spec.to_tokio_command();
        command
            .stdin(match stdin {
                StdinMode::Null => Stdio::null(),
                StdinMode::Piped => Stdio::piped(),
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        command.process_group(0);

        command.spawn().map_err(|e| ResolverError::LaunchFailure {
            program: spec.program.to_string_lossy().into_owned(),
            reason: e.to_string(),
        })
    }
}
