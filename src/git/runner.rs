use crate::error::{ReportError, Result};
use crate::util::command_line;
use log::debug;
use std::path::Path;
use std::process::Command;

/// Runs one external command and hands back its full stdout.
pub trait ProcessRunner: Send + Sync {
    fn run(&self, args: &[&str], cwd: &Path) -> Result<String>;
}

/// `ProcessRunner` backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl GitCli {
    pub fn new() -> Self {
        Self::with_program("git")
    }

    pub fn with_program<S: Into<String>>(program: S) -> Self {
        Self { program: program.into() }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner for GitCli {
    fn run(&self, args: &[&str], cwd: &Path) -> Result<String> {
        let command = command_line(&self.program, args);
        debug!("Running `{}` in {}", command, cwd.display());

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(cwd)
            .output()?;

        if !output.status.success() {
            return Err(ReportError::CommandFailed {
                command,
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Succeeds only inside a git working tree.
pub fn probe_repository(runner: &dyn ProcessRunner, path: &Path) -> Result<()> {
    runner
        .run(&["rev-parse", "--git-dir"], path)
        .map(|_| ())
        .map_err(|e| {
            debug!("Repository probe failed for {}: {e}", path.display());
            ReportError::NotARepository { path: path.to_path_buf() }
        })
}
