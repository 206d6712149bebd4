//! External command execution with dry-run suppression.
//!
//! Every subprocess invocation in the crate goes through [`CommandRunner`]
//! so commands are testable without spawning processes and so `--dry-run`
//! can suppress all side effects in one place.

use std::path::Path;
use std::process::Command;

use thiserror::Error;

use crate::output::OutputContext;

/// Exit code conventionally reported for an unresolvable program.
pub const NOT_FOUND_EXIT_CODE: i32 = 127;

/// Uniform shape of every external invocation, including synthesized
/// results when execution is suppressed.
#[derive(Debug, Clone, Default)]
pub struct ExecutionResult {
    /// Process exit code; `-1` when terminated by a signal.
    pub exit_code: i32,
    /// Captured standard output, lossily decoded.
    pub stdout: String,
    /// Captured standard error, lossily decoded.
    pub stderr: String,
}

impl ExecutionResult {
    /// Whether the process exited zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Synthetic success returned when execution is suppressed.
    #[must_use]
    pub fn suppressed() -> Self {
        Self::default()
    }
}

/// Error kinds for external-call wrappers.
///
/// Callers branch on kind: an unresolvable program is not the same failure
/// as a spawned program exiting non-zero, and neither is an HTTP failure.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The program could not be resolved at all.
    #[error("command not found: {program}")]
    NotFound {
        /// Program name as given.
        program: String,
    },
    /// The program resolved but could not be spawned or waited on.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program name as given.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A strict call site observed a non-zero exit.
    #[error("{program} exited with code {}", .result.exit_code)]
    NonZeroExit {
        /// Program name as given.
        program: String,
        /// Captured result, for diagnostics.
        result: ExecutionResult,
    },
    /// An HTTP request failed before yielding a response body.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ExecError {
    /// Exit code equivalent for availability-style checks.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => NOT_FOUND_EXIT_CODE,
            Self::NonZeroExit { result, .. } => result.exit_code,
            Self::Spawn { .. } | Self::Transport(_) => 1,
        }
    }
}

/// Abstraction over external command execution, enabling test doubles.
pub trait CommandRunner {
    /// Run a command in an optional working directory, capturing both
    /// streams. Non-zero exit is NOT an error; callers inspect the code.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::NotFound`] when the program does not resolve
    /// and [`ExecError::Spawn`] for any other spawn-level failure.
    fn run_in(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<ExecutionResult, ExecError>;

    /// Run a command in the current directory.
    ///
    /// # Errors
    ///
    /// Same as [`CommandRunner::run_in`].
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecutionResult, ExecError> {
        self.run_in(program, args, None)
    }

    /// Strict variant: escalates non-zero exit to [`ExecError::NonZeroExit`].
    ///
    /// # Errors
    ///
    /// Everything [`CommandRunner::run`] returns, plus `NonZeroExit`.
    fn run_checked(&self, program: &str, args: &[&str]) -> Result<ExecutionResult, ExecError> {
        let result = self.run(program, args)?;
        if result.success() {
            Ok(result)
        } else {
            Err(ExecError::NonZeroExit {
                program: program.to_string(),
                result,
            })
        }
    }
}

/// Production runner — blocking `std::process` execution.
#[derive(Clone)]
pub struct ProcessRunner {
    dry_run: bool,
    ctx: OutputContext,
}

impl ProcessRunner {
    #[must_use]
    pub fn new(dry_run: bool, ctx: OutputContext) -> Self {
        Self { dry_run, ctx }
    }
}

impl CommandRunner for ProcessRunner {
    fn run_in(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<ExecutionResult, ExecError> {
        let rendered = render_command(program, args);

        if self.dry_run {
            self.ctx.info(&format!("[dry-run] would execute: {rendered}"));
            return Ok(ExecutionResult::suppressed());
        }

        self.ctx.debug(&format!("executing: {rendered}"));
        if let Some(dir) = cwd {
            self.ctx.debug(&format!("working directory: {}", dir.display()));
        }

        let mut command = Command::new(program);
        command.args(args);
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ExecError::NotFound {
                    program: program.to_string(),
                }
            } else {
                ExecError::Spawn {
                    program: program.to_string(),
                    source,
                }
            }
        })?;

        let result = ExecutionResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.success() {
            self.ctx.warn(&format!(
                "command returned non-zero exit code {}: {rendered}",
                result.exit_code
            ));
        }

        Ok(result)
    }
}

fn render_command(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{program} {}", args.join(" "))
    }
}
