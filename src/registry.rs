//! Registry lifecycle controller: start, health-poll, stop, and status for
//! the single named local registry container.

use std::time::Duration;

use crate::config::Config;
use crate::docker::ContainerEngine;
use crate::output::OutputContext;

/// Default number of health probe attempts before `start` gives up.
pub const DEFAULT_HEALTH_ATTEMPTS: u32 = 30;

/// Default pause between health probe attempts.
pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(1);

/// Bounded, fixed-interval retry policy for the startup health poll.
///
/// This is the only retry policy in the system — linear, not exponential.
/// Tests override the bound and interval.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// Maximum number of probe attempts.
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_HEALTH_ATTEMPTS,
            interval: DEFAULT_HEALTH_INTERVAL,
        }
    }
}

/// Point-in-time registry state, recomputed on every call.
#[derive(Debug, Clone)]
pub struct RegistryStatus {
    /// Container name.
    pub name: String,
    /// Published host port.
    pub port: u16,
    /// `host:port` address.
    pub url: String,
    /// Whether the named container is in the engine's running list.
    pub running: bool,
    /// Whether the version probe endpoint responds.
    pub healthy: bool,
    /// Whether the container engine itself is usable.
    pub engine_available: bool,
}

/// Abstraction over the registry health endpoint, enabling test doubles.
pub trait HealthProbe {
    /// Whether `http://<registry_url>/v2/` answers successfully.
    fn is_healthy(&self, registry_url: &str) -> bool;
}

/// Production probe — blocking HTTP GET against the version endpoint.
pub struct HttpHealthProbe;

impl HealthProbe for HttpHealthProbe {
    fn is_healthy(&self, registry_url: &str) -> bool {
        ureq::get(&format!("http://{registry_url}/v2/"))
            .timeout(Duration::from_secs(3))
            .call()
            .is_ok()
    }
}

/// Controls the lifecycle of one named registry container.
pub struct RegistryController<'a, E: ContainerEngine, H: HealthProbe> {
    engine: &'a E,
    health: &'a H,
    config: &'a Config,
    ctx: &'a OutputContext,
    policy: PollPolicy,
    dry_run: bool,
}

impl<'a, E: ContainerEngine, H: HealthProbe> RegistryController<'a, E, H> {
    pub fn new(
        engine: &'a E,
        health: &'a H,
        config: &'a Config,
        ctx: &'a OutputContext,
        dry_run: bool,
    ) -> Self {
        Self {
            engine,
            health,
            config,
            ctx,
            policy: PollPolicy::default(),
            dry_run,
        }
    }

    /// Override the health poll policy.
    #[must_use]
    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Whether the named container is currently in the running list.
    pub fn is_running(&self) -> bool {
        match self.engine.running_names() {
            Ok(names) => names.iter().any(|n| n == &self.config.registry_name),
            Err(e) => {
                self.ctx.debug(&format!("container list failed: {e}"));
                false
            }
        }
    }

    /// Start the registry, reconciling port conflicts first.
    ///
    /// Idempotent: a container already running under the configured name is
    /// treated as success without any destructive engine call.
    pub fn start(&self) -> bool {
        let port = self.config.registry_port;
        let name = &self.config.registry_name;

        self.ctx.info(&format!("Starting registry on port {port}..."));

        if self.is_running() {
            self.ctx.success("Registry already running");
            return true;
        }

        self.release_port(port);

        // A stale stopped container with the same name blocks `docker run`.
        if let Err(e) = self.engine.remove_force(name) {
            self.ctx.debug(&format!("stale container removal failed: {e}"));
        }

        let launched = match self.engine.run_registry(port, name) {
            Ok(result) if result.success() => true,
            Ok(result) => {
                self.ctx.error(&format!(
                    "Failed to start registry container: {}",
                    result.stderr.trim()
                ));
                false
            }
            Err(e) => {
                self.ctx.error(&format!("Failed to start registry: {e}"));
                false
            }
        };
        if !launched {
            return false;
        }

        if self.dry_run {
            self.ctx.info("[dry-run] skipping registry health poll");
            return true;
        }

        self.ctx.info("Waiting for registry to be ready...");
        if self.poll_until_healthy() {
            self.ctx
                .success(&format!("Registry started successfully on port {port}"));
            true
        } else {
            self.ctx.error(&format!(
                "Registry failed to become healthy within {} attempts",
                self.policy.max_attempts
            ));
            false
        }
    }

    /// Stop and remove the named container, best effort.
    ///
    /// Engine-level refusals (already stopped, already absent) are
    /// non-fatal; only a spawn failure makes this report failure.
    pub fn stop(&self) -> bool {
        let name = &self.config.registry_name;
        self.ctx.info(&format!("Stopping registry '{name}'..."));

        let mut ok = true;
        if let Err(e) = self.engine.stop(name) {
            self.ctx.error(&format!("Failed to stop registry: {e}"));
            ok = false;
        }
        if let Err(e) = self.engine.remove(name) {
            self.ctx.error(&format!("Failed to remove registry: {e}"));
            ok = false;
        }
        if ok {
            self.ctx.success("Registry stopped");
        }
        ok
    }

    /// Recompute the full registry status. Nothing is cached.
    pub fn status(&self, engine_available: bool) -> RegistryStatus {
        let url = self.config.registry_url();
        RegistryStatus {
            name: self.config.registry_name.clone(),
            port: self.config.registry_port,
            running: self.is_running(),
            healthy: self.health.is_healthy(&url),
            engine_available,
            url,
        }
    }

    /// Repository names currently stored in the registry.
    ///
    /// Failures (registry down, malformed payload) yield an empty list.
    pub fn list_images(&self) -> Vec<String> {
        let url = format!("http://{}/v2/_catalog", self.config.registry_url());
        let body = match ureq::get(&url).timeout(Duration::from_secs(3)).call() {
            Ok(response) => match response.into_string() {
                Ok(body) => body,
                Err(e) => {
                    self.ctx.debug(&format!("catalog read failed: {e}"));
                    return Vec::new();
                }
            },
            Err(e) => {
                self.ctx.debug(&format!("catalog request failed: {e}"));
                return Vec::new();
            }
        };
        parse_catalog(&body)
    }

    /// Force-remove any container already publishing the target port.
    fn release_port(&self, port: u16) {
        let ids = match self.engine.containers_publishing_port(port) {
            Ok(ids) => ids,
            Err(e) => {
                self.ctx.debug(&format!("port conflict lookup failed: {e}"));
                return;
            }
        };
        for id in ids {
            self.ctx
                .info(&format!("Removing container {id} using port {port}"));
            if let Err(e) = self.engine.remove_force(&id) {
                self.ctx.debug(&format!("removal of {id} failed: {e}"));
            }
        }
    }

    /// Probe the health endpoint up to `max_attempts` times, pausing
    /// `interval` between attempts. Returns on the first healthy response.
    fn poll_until_healthy(&self) -> bool {
        let url = self.config.registry_url();
        let spinner = self.spinner();
        for attempt in 1..=self.policy.max_attempts {
            if let Some(s) = &spinner {
                s.set_message(format!(
                    "waiting for registry ({attempt}/{})",
                    self.policy.max_attempts
                ));
            }
            if self.health.is_healthy(&url) {
                if let Some(s) = &spinner {
                    s.finish_and_clear();
                }
                return true;
            }
            if attempt < self.policy.max_attempts {
                std::thread::sleep(self.policy.interval);
            }
        }
        if let Some(s) = &spinner {
            s.finish_and_clear();
        }
        false
    }

    fn spinner(&self) -> Option<indicatif::ProgressBar> {
        if !self.ctx.show_progress() {
            return None;
        }
        let bar = indicatif::ProgressBar::new_spinner();
        bar.enable_steady_tick(Duration::from_millis(120));
        Some(bar)
    }
}

/// Parse the `/v2/_catalog` payload into repository names.
#[must_use]
pub fn parse_catalog(body: &str) -> Vec<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return Vec::new();
    };
    value
        .get("repositories")
        .and_then(|r| r.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::runner::{ExecError, ExecutionResult};
    use std::cell::{Cell, RefCell};

    /// Scripted engine recording every destructive call.
    struct ScriptedEngine {
        running: Vec<String>,
        port_conflicts: Vec<String>,
        destructive_calls: RefCell<Vec<String>>,
    }

    impl ScriptedEngine {
        fn with_running(names: &[&str]) -> Self {
            Self {
                running: names.iter().map(|n| (*n).to_string()).collect(),
                port_conflicts: Vec::new(),
                destructive_calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl ContainerEngine for ScriptedEngine {
        fn engine_info(&self) -> Result<ExecutionResult, ExecError> {
            Ok(ExecutionResult::suppressed())
        }

        fn running_names(&self) -> Result<Vec<String>, ExecError> {
            Ok(self.running.clone())
        }

        fn containers_publishing_port(&self, _port: u16) -> Result<Vec<String>, ExecError> {
            Ok(self.port_conflicts.clone())
        }

        fn run_registry(&self, port: u16, name: &str) -> Result<ExecutionResult, ExecError> {
            self.destructive_calls
                .borrow_mut()
                .push(format!("run {name}:{port}"));
            Ok(ExecutionResult::suppressed())
        }

        fn remove_force(&self, name_or_id: &str) -> Result<ExecutionResult, ExecError> {
            self.destructive_calls
                .borrow_mut()
                .push(format!("rm -f {name_or_id}"));
            Ok(ExecutionResult::suppressed())
        }

        fn stop(&self, name: &str) -> Result<ExecutionResult, ExecError> {
            self.destructive_calls
                .borrow_mut()
                .push(format!("stop {name}"));
            Ok(ExecutionResult::suppressed())
        }

        fn remove(&self, name: &str) -> Result<ExecutionResult, ExecError> {
            self.destructive_calls
                .borrow_mut()
                .push(format!("rm {name}"));
            Ok(ExecutionResult::suppressed())
        }
    }

    /// Health stub counting probe attempts.
    struct CountingHealth {
        healthy: bool,
        probes: Cell<u32>,
    }

    impl CountingHealth {
        fn never_healthy() -> Self {
            Self {
                healthy: false,
                probes: Cell::new(0),
            }
        }

        fn always_healthy() -> Self {
            Self {
                healthy: true,
                probes: Cell::new(0),
            }
        }
    }

    impl HealthProbe for CountingHealth {
        fn is_healthy(&self, _registry_url: &str) -> bool {
            self.probes.set(self.probes.get() + 1);
            self.healthy
        }
    }

    fn fast_policy() -> PollPolicy {
        PollPolicy {
            max_attempts: 30,
            interval: Duration::ZERO,
        }
    }

    #[test]
    fn test_start_when_already_running_is_idempotent() {
        let config = Config::default();
        let ctx = OutputContext::silent();
        let engine = ScriptedEngine::with_running(&["local-registry"]);
        let health = CountingHealth::always_healthy();
        let controller =
            RegistryController::new(&engine, &health, &config, &ctx, false).with_policy(fast_policy());

        assert!(controller.start());
        assert!(
            engine.destructive_calls.borrow().is_empty(),
            "idempotent start must not touch the engine, got: {:?}",
            engine.destructive_calls.borrow()
        );
    }

    #[test]
    fn test_start_launches_after_clearing_port_and_stale_name() {
        let config = Config::default();
        let ctx = OutputContext::silent();
        let mut engine = ScriptedEngine::with_running(&[]);
        engine.port_conflicts = vec!["abc123".to_string()];
        let health = CountingHealth::always_healthy();
        let controller =
            RegistryController::new(&engine, &health, &config, &ctx, false).with_policy(fast_policy());

        assert!(controller.start());
        let calls = engine.destructive_calls.borrow();
        assert_eq!(
            calls.as_slice(),
            [
                "rm -f abc123",
                "rm -f local-registry",
                "run local-registry:5001"
            ]
        );
    }

    #[test]
    fn test_start_never_healthy_fails_after_exactly_max_attempts() {
        let config = Config::default();
        let ctx = OutputContext::silent();
        let engine = ScriptedEngine::with_running(&[]);
        let health = CountingHealth::never_healthy();
        let controller =
            RegistryController::new(&engine, &health, &config, &ctx, false).with_policy(fast_policy());

        assert!(!controller.start());
        assert_eq!(health.probes.get(), 30);
    }

    #[test]
    fn test_start_dry_run_skips_health_poll() {
        let config = Config::default();
        let ctx = OutputContext::silent();
        let engine = ScriptedEngine::with_running(&[]);
        let health = CountingHealth::never_healthy();
        let controller =
            RegistryController::new(&engine, &health, &config, &ctx, true).with_policy(fast_policy());

        assert!(controller.start());
        assert_eq!(health.probes.get(), 0);
    }

    #[test]
    fn test_stop_issues_stop_then_remove() {
        let config = Config::default();
        let ctx = OutputContext::silent();
        let engine = ScriptedEngine::with_running(&["local-registry"]);
        let health = CountingHealth::always_healthy();
        let controller = RegistryController::new(&engine, &health, &config, &ctx, false);

        assert!(controller.stop());
        let calls = engine.destructive_calls.borrow();
        assert_eq!(calls.as_slice(), ["stop local-registry", "rm local-registry"]);
    }

    #[test]
    fn test_status_recomputes_running_and_url() {
        let config = Config::default();
        let ctx = OutputContext::silent();
        let engine = ScriptedEngine::with_running(&["local-registry"]);
        let health = CountingHealth::always_healthy();
        let controller = RegistryController::new(&engine, &health, &config, &ctx, false);

        let status = controller.status(true);
        assert!(status.running);
        assert!(status.healthy);
        assert!(status.engine_available);
        assert_eq!(status.url, "localhost:5001");
        assert_eq!(status.name, "local-registry");
        assert_eq!(status.port, 5001);
    }

    #[test]
    fn test_parse_catalog_extracts_repositories() {
        let body = r#"{"repositories":["demo/app","demo/lib"]}"#;
        assert_eq!(parse_catalog(body), vec!["demo/app", "demo/lib"]);
    }

    #[test]
    fn test_parse_catalog_malformed_yields_empty() {
        assert!(parse_catalog("not json").is_empty());
        assert!(parse_catalog("{}").is_empty());
        assert!(parse_catalog(r#"{"repositories":"oops"}"#).is_empty());
    }
}
