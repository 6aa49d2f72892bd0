use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;
use tokio::process::Command as TokioCommand;

/// Specification for a command to execute.
///
/// All process execution goes through this type to ensure argv-style
/// invocation: the program and every argument are discrete `OsString`
/// elements, and no shell string evaluation (`sh -c`, `cmd /C`) ever
/// happens on the way to `spawn`.
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    /// The program to execute.
    pub program: OsString,
    /// Arguments as discrete elements (NOT shell strings).
    pub args: Vec<OsString>,
    /// Optional working directory.
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    /// Create a new `CommandSpec` for the given program.
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory.
    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Build a `std::process::Command` from this spec.
    ///
    /// Used for the short synchronous helper invocations (path conversion,
    /// existence probes); job processes go through
    /// [`to_tokio_command`](Self::to_tokio_command).
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }

    /// Build a `tokio::process::Command` from this spec.
    #[must_use]
    pub fn to_tokio_command(&self) -> TokioCommand {
        let mut cmd = TokioCommand::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }

    /// Render the invocation for logs. Lossy; never fed back to a shell.
    #[must_use]
    pub fn display(&self) -> String {
        let mut out = self.program.to_string_lossy().into_owned();
        for arg in &self.args {
            out.push(' ');
            out.push_str(&arg.to_string_lossy());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_discrete_args() {
        let cmd = CommandSpec::new("dieharder")
            .arg("-a")
            .args(["-g", "201"])
            .cwd("/work");
        assert_eq!(cmd.program, OsString::from("dieharder"));
        assert_eq!(cmd.args.len(), 3);
        assert_eq!(cmd.cwd, Some(PathBuf::from("/work")));
    }

    #[test]
    fn shell_metacharacters_are_preserved_literally() {
        let cmd = CommandSpec::new("echo")
            .arg("$(whoami)")
            .arg("a b")
            .arg("x;y");
        assert_eq!(cmd.args[0], OsString::from("$(whoami)"));
        assert_eq!(cmd.args[1], OsString::from("a b"));
        assert_eq!(cmd.args[2], OsString::from("x;y"));
    }

    #[test]
    fn display_joins_for_logging() {
        let cmd = CommandSpec::new("nist").args(["-fast", "-fileoutput"]);
        assert_eq!(cmd.display(), "nist -fast -fileoutput");
    }
}
