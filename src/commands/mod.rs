//! Command implementations behind the CLI subcommands.
//!
//! Each command wires the production components together, runs, and
//! reports success as a `bool`; the dispatcher maps that to an exit code.

pub mod cleanup;
pub mod demo;
pub mod list;
pub mod setup;
pub mod status;

use crate::config::Config;
use crate::docker::DockerCli;
use crate::environment::{EnvironmentManager, EnvironmentStatus};
use crate::install::GithubReleaseSource;
use crate::output::OutputContext;
use crate::probe::PathProbe;
use crate::registry::HttpHealthProbe;
use crate::runner::ProcessRunner;

/// Production component set shared by every command.
pub(crate) struct Toolbox {
    runner: ProcessRunner,
    probe: PathProbe,
    engine: DockerCli<ProcessRunner>,
    source: GithubReleaseSource,
    health: HttpHealthProbe,
    dry_run: bool,
}

impl Toolbox {
    pub(crate) fn new(ctx: &OutputContext, dry_run: bool) -> Self {
        let runner = ProcessRunner::new(dry_run, ctx.clone());
        Self {
            engine: DockerCli::new(runner.clone()),
            runner,
            probe: PathProbe,
            source: GithubReleaseSource,
            health: HttpHealthProbe,
            dry_run,
        }
    }

    pub(crate) fn runner(&self) -> &ProcessRunner {
        &self.runner
    }

    pub(crate) fn environment<'a>(
        &'a self,
        config: &'a Config,
        ctx: &'a OutputContext,
    ) -> EnvironmentManager<
        'a,
        PathProbe,
        DockerCli<ProcessRunner>,
        ProcessRunner,
        GithubReleaseSource,
        HttpHealthProbe,
    > {
        EnvironmentManager::new(
            &self.probe,
            &self.engine,
            &self.runner,
            &self.source,
            &self.health,
            config,
            ctx,
            self.dry_run,
        )
    }
}

/// Gate for commands that need a working environment. Prints what is
/// missing and how to fix it when the environment is not ready.
pub(crate) fn require_ready(status: &EnvironmentStatus, ctx: &OutputContext) -> bool {
    if status.ready {
        return true;
    }

    ctx.error("Environment is not ready");
    for tool in &status.prerequisites {
        if !tool.available {
            ctx.warn(&format!("missing prerequisite: {}", tool.name));
        }
    }
    if !status.registry.running {
        ctx.warn("local registry is not running");
    }
    ctx.info("Run 'ocm-demo setup' to prepare the environment");
    false
}
