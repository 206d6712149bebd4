//! Environment reconciliation: prerequisite checks, setup, status, and
//! teardown for the demo environment.

use crate::config::Config;
use crate::docker::ContainerEngine;
use crate::install::{OcmInstaller, ReleaseSource};
use crate::ocm::OcmClient;
use crate::output::OutputContext;
use crate::probe::ToolProbe;
use crate::registry::{HealthProbe, PollPolicy, RegistryController, RegistryStatus};
use crate::runner::CommandRunner;

/// Tools required by the demo environment, in report order.
pub const REQUIRED_TOOLS: [&str; 6] = ["docker", "ocm", "curl", "kubectl", "kind", "git"];

/// Availability of one required tool.
#[derive(Debug, Clone)]
pub struct ToolStatus {
    pub name: &'static str,
    pub available: bool,
}

/// Point-in-time snapshot of the whole environment, recomputed per call.
#[derive(Debug, Clone)]
pub struct EnvironmentStatus {
    /// One entry per tool in [`REQUIRED_TOOLS`], same order.
    pub prerequisites: Vec<ToolStatus>,
    pub registry: RegistryStatus,
    pub ocm_version: Option<String>,
    /// All prerequisites available and the registry running.
    pub ready: bool,
}

/// Readiness predicate: every prerequisite present and the registry up.
#[must_use]
pub fn is_ready(prerequisites: &[ToolStatus], registry_running: bool) -> bool {
    prerequisites.iter().all(|t| t.available) && registry_running
}

/// Installation guidance printed for tools that are not auto-installed.
#[must_use]
pub fn install_hint(tool: &str) -> &'static str {
    match tool {
        "docker" => "Install Docker from https://docs.docker.com/get-docker/",
        "ocm" => "Install the OCM CLI from https://ocm.software/ or run 'ocm-demo setup'",
        "curl" => "Install curl via your system package manager",
        "kubectl" => "Install kubectl from https://kubernetes.io/docs/tasks/tools/",
        "kind" => "Install kind from https://kind.sigs.k8s.io/docs/user/quick-start/",
        "git" => "Install git from https://git-scm.com/downloads",
        _ => "Install the tool and ensure it is on your PATH",
    }
}

/// Reconciles the local environment against the demo prerequisites.
pub struct EnvironmentManager<'a, P, E, R, S, H>
where
    P: ToolProbe,
    E: ContainerEngine,
    R: CommandRunner,
    S: ReleaseSource,
    H: HealthProbe,
{
    probe: &'a P,
    engine: &'a E,
    runner: &'a R,
    release_source: &'a S,
    health: &'a H,
    config: &'a Config,
    ctx: &'a OutputContext,
    policy: PollPolicy,
    dry_run: bool,
}

impl<'a, P, E, R, S, H> EnvironmentManager<'a, P, E, R, S, H>
where
    P: ToolProbe,
    E: ContainerEngine,
    R: CommandRunner,
    S: ReleaseSource,
    H: HealthProbe,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        probe: &'a P,
        engine: &'a E,
        runner: &'a R,
        release_source: &'a S,
        health: &'a H,
        config: &'a Config,
        ctx: &'a OutputContext,
        dry_run: bool,
    ) -> Self {
        Self {
            probe,
            engine,
            runner,
            release_source,
            health,
            config,
            ctx,
            policy: PollPolicy::default(),
            dry_run,
        }
    }

    /// Override the registry health poll policy.
    #[must_use]
    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn registry(&self) -> RegistryController<'a, E, H> {
        RegistryController::new(self.engine, self.health, self.config, self.ctx, self.dry_run)
            .with_policy(self.policy)
    }

    /// Whether one tool is usable, with the depth of checking varying per
    /// tool: `docker` must also have a reachable daemon, `ocm` must answer
    /// `ocm version`, everything else only needs to resolve on PATH.
    fn tool_available(&self, tool: &str) -> bool {
        if !self.probe.exists(tool) {
            return false;
        }
        match tool {
            "docker" => matches!(self.engine.engine_info(), Ok(r) if r.success()),
            "ocm" => matches!(self.runner.run("ocm", &["version"]), Ok(r) if r.success()),
            _ => true,
        }
    }

    /// Probe every required tool, logging one success/warn line each.
    pub fn check(&self) -> Vec<ToolStatus> {
        REQUIRED_TOOLS
            .iter()
            .map(|&tool| {
                let available = self.tool_available(tool);
                if available {
                    self.ctx.success(&format!("{tool} is available"));
                } else {
                    self.ctx.warn(&format!("{tool} is not available"));
                }
                ToolStatus { name: tool, available }
            })
            .collect()
    }

    /// Reconcile the environment: install what is managed here (the OCM
    /// CLI, when `install_missing` allows), print guidance for everything
    /// else, and start the registry when docker is usable.
    ///
    /// Missing tools that only get a hint never fail setup; failure is
    /// reserved for steps that were attempted and errored (the installer,
    /// the registry start).
    pub fn setup(&self, install_missing: bool) -> bool {
        self.ctx.header("Setting up demo environment");

        let mut ok = true;
        let tools = self.check();
        let docker_usable = tools.iter().any(|t| t.name == "docker" && t.available);

        for tool in tools.iter().filter(|t| !t.available) {
            if tool.name == "ocm" && install_missing {
                let installer =
                    OcmInstaller::new(self.probe, self.release_source, self.ctx, self.dry_run);
                if !installer.ensure_installed() {
                    ok = false;
                }
            } else {
                self.ctx.info(&format!("  {}", install_hint(tool.name)));
            }
        }

        if docker_usable {
            if !self.registry().start() {
                ok = false;
            }
        } else {
            self.ctx.warn("Skipping registry start - docker is not usable");
        }

        if ok {
            self.ctx.success("Environment setup complete");
        } else {
            self.ctx.error("Environment setup finished with errors");
        }
        ok
    }

    /// Recompute the full environment snapshot. Nothing is cached.
    pub fn status(&self) -> EnvironmentStatus {
        let prerequisites: Vec<ToolStatus> = REQUIRED_TOOLS
            .iter()
            .map(|&tool| ToolStatus {
                name: tool,
                available: self.tool_available(tool),
            })
            .collect();

        let engine_available = prerequisites
            .iter()
            .any(|t| t.name == "docker" && t.available);
        let registry = self.registry().status(engine_available);

        let ocm_version = if prerequisites.iter().any(|t| t.name == "ocm" && t.available) {
            OcmClient::new(self.runner, self.ctx).version()
        } else {
            None
        };

        let ready = is_ready(&prerequisites, registry.running);
        EnvironmentStatus {
            prerequisites,
            registry,
            ocm_version,
            ready,
        }
    }

    /// Tear down everything setup created: currently the registry.
    pub fn cleanup(&self) -> bool {
        self.ctx.header("Cleaning up demo environment");
        self.registry().stop()
    }

    /// Repository names stored in the local registry.
    pub fn registry_images(&self) -> Vec<String> {
        self.registry().list_images()
    }
}
