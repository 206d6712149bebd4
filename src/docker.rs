//! Container engine CLI abstraction — enables test doubles for all
//! `docker` commands the registry controller needs.

use crate::runner::{CommandRunner, ExecError, ExecutionResult};

/// Image used for the local registry container.
pub const REGISTRY_IMAGE: &str = "registry:2";

/// Port the registry image listens on inside the container.
pub const REGISTRY_INTERNAL_PORT: u16 = 5000;

/// Abstraction over the container engine CLI.
///
/// The production implementation delegates to the `docker` binary through
/// a [`CommandRunner`], so dry-run suppression applies uniformly.
pub trait ContainerEngine {
    /// Run `docker info` — exit zero means the daemon is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned.
    fn engine_info(&self) -> Result<ExecutionResult, ExecError>;

    /// Names of currently running containers (`docker ps`).
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned.
    fn running_names(&self) -> Result<Vec<String>, ExecError>;

    /// IDs of containers (running or not) publishing `port`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned.
    fn containers_publishing_port(&self, port: u16) -> Result<Vec<String>, ExecError>;

    /// Launch a detached registry container publishing `port` to the
    /// image's internal port.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned.
    fn run_registry(&self, port: u16, name: &str) -> Result<ExecutionResult, ExecError>;

    /// Run `docker rm -f <name-or-id>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned.
    fn remove_force(&self, name_or_id: &str) -> Result<ExecutionResult, ExecError>;

    /// Run `docker stop <name>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned.
    fn stop(&self, name: &str) -> Result<ExecutionResult, ExecError>;

    /// Run `docker rm <name>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned.
    fn remove(&self, name: &str) -> Result<ExecutionResult, ExecError>;
}

/// Production engine — shells out to the `docker` binary.
pub struct DockerCli<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> DockerCli<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> ContainerEngine for DockerCli<R> {
    fn engine_info(&self) -> Result<ExecutionResult, ExecError> {
        self.runner.run("docker", &["info"])
    }

    fn running_names(&self) -> Result<Vec<String>, ExecError> {
        let result = self
            .runner
            .run("docker", &["ps", "--format", "{{.Names}}"])?;
        if result.success() {
            Ok(non_empty_lines(&result.stdout))
        } else {
            Ok(Vec::new())
        }
    }

    fn containers_publishing_port(&self, port: u16) -> Result<Vec<String>, ExecError> {
        let filter = format!("publish={port}");
        let result = self.runner.run(
            "docker",
            &["ps", "-a", "--filter", &filter, "--format", "{{.ID}}"],
        )?;
        if result.success() {
            Ok(non_empty_lines(&result.stdout))
        } else {
            Ok(Vec::new())
        }
    }

    fn run_registry(&self, port: u16, name: &str) -> Result<ExecutionResult, ExecError> {
        let publish = format!("{port}:{REGISTRY_INTERNAL_PORT}");
        self.runner.run(
            "docker",
            &["run", "-d", "-p", &publish, "--name", name, REGISTRY_IMAGE],
        )
    }

    fn remove_force(&self, name_or_id: &str) -> Result<ExecutionResult, ExecError> {
        self.runner.run("docker", &["rm", "-f", name_or_id])
    }

    fn stop(&self, name: &str) -> Result<ExecutionResult, ExecError> {
        self.runner.run("docker", &["stop", name])
    }

    fn remove(&self, name: &str) -> Result<ExecutionResult, ExecError> {
        self.runner.run("docker", &["rm", name])
    }
}

/// Split CLI list output into trimmed, non-empty lines.
fn non_empty_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
