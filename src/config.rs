//! Demo configuration: defaults plus `OCM_DEMO_*` environment overrides.
//!
//! Loaded once by the dispatcher and passed by reference into every
//! component — there is no process-wide singleton.

use std::path::PathBuf;

/// Default registry port.
pub const DEFAULT_REGISTRY_PORT: u16 = 5001;
/// Default registry container name.
pub const DEFAULT_REGISTRY_NAME: &str = "local-registry";
/// Default registry host.
pub const DEFAULT_REGISTRY_HOST: &str = "localhost";
/// Default kind cluster name.
pub const DEFAULT_CLUSTER_NAME: &str = "ocm-demo";
/// Default Kubernetes namespace.
pub const DEFAULT_NAMESPACE: &str = "ocm-demos";
/// Default demo duration in seconds.
pub const DEFAULT_DEMO_DURATION_SECS: u64 = 300;

/// Immutable-once-loaded demo configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Local registry port.
    pub registry_port: u16,
    /// Local registry container name.
    pub registry_name: String,
    /// Local registry host.
    pub registry_host: String,
    /// kind cluster name.
    pub cluster_name: String,
    /// Kubernetes namespace used by the deployment examples.
    pub namespace: String,
    /// Quick-demo duration in seconds.
    pub demo_duration_secs: u64,
    /// Project root override; the examples directory lives beneath it.
    pub project_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry_port: DEFAULT_REGISTRY_PORT,
            registry_name: DEFAULT_REGISTRY_NAME.to_string(),
            registry_host: DEFAULT_REGISTRY_HOST.to_string(),
            cluster_name: DEFAULT_CLUSTER_NAME.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            demo_duration_secs: DEFAULT_DEMO_DURATION_SECS,
            project_root: None,
        }
    }
}

impl Config {
    /// Build the configuration from environment variables.
    ///
    /// Each `OCM_DEMO_*` variable overrides one field; unset or unparsable
    /// variables fall back to the documented default.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            registry_port: env_parsed("OCM_DEMO_REGISTRY_PORT", DEFAULT_REGISTRY_PORT),
            registry_name: env_string("OCM_DEMO_REGISTRY_NAME", DEFAULT_REGISTRY_NAME),
            registry_host: env_string("OCM_DEMO_REGISTRY_HOST", DEFAULT_REGISTRY_HOST),
            cluster_name: env_string("OCM_DEMO_CLUSTER_NAME", DEFAULT_CLUSTER_NAME),
            namespace: env_string("OCM_DEMO_NAMESPACE", DEFAULT_NAMESPACE),
            demo_duration_secs: env_parsed("OCM_DEMO_DURATION", DEFAULT_DEMO_DURATION_SECS),
            project_root: std::env::var("OCM_DEMO_PROJECT_ROOT").ok().map(PathBuf::from),
        }
    }

    /// Registry address as `host:port`.
    #[must_use]
    pub fn registry_url(&self) -> String {
        format!("{}:{}", self.registry_host, self.registry_port)
    }

    /// Directory holding the numbered example script trees.
    ///
    /// `project_root` when set, otherwise the current directory, joined
    /// with `examples`.
    #[must_use]
    pub fn examples_dir(&self) -> PathBuf {
        self.project_root
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
            .join("examples")
    }
}

fn env_string(var: &str, default: &str) -> String {
    std::env::var(var).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, unsafe_code)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_demo_env() {
        for var in [
            "OCM_DEMO_REGISTRY_PORT",
            "OCM_DEMO_REGISTRY_NAME",
            "OCM_DEMO_REGISTRY_HOST",
            "OCM_DEMO_CLUSTER_NAME",
            "OCM_DEMO_NAMESPACE",
            "OCM_DEMO_DURATION",
            "OCM_DEMO_PROJECT_ROOT",
        ] {
            // SAFETY: env-mutating tests are serialized via #[serial]
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn test_from_env_without_overrides_uses_defaults() {
        clear_demo_env();
        let config = Config::from_env();
        assert_eq!(config, Config::default());
        assert_eq!(config.registry_port, 5001);
        assert_eq!(config.registry_name, "local-registry");
        assert_eq!(config.registry_host, "localhost");
        assert_eq!(config.cluster_name, "ocm-demo");
        assert_eq!(config.namespace, "ocm-demos");
        assert_eq!(config.demo_duration_secs, 300);
        assert!(config.project_root.is_none());
    }

    #[test]
    #[serial]
    fn test_from_env_applies_overrides_exactly() {
        clear_demo_env();
        // SAFETY: protected by #[serial]
        unsafe {
            std::env::set_var("OCM_DEMO_REGISTRY_PORT", "5555");
            std::env::set_var("OCM_DEMO_CLUSTER_NAME", "test-cluster");
        }
        let config = Config::from_env();
        assert_eq!(config.registry_port, 5555);
        assert_eq!(config.cluster_name, "test-cluster");
        // Unset fields keep documented defaults.
        assert_eq!(config.registry_name, DEFAULT_REGISTRY_NAME);
        assert_eq!(config.registry_host, DEFAULT_REGISTRY_HOST);
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
        clear_demo_env();
    }

    #[test]
    #[serial]
    fn test_from_env_unparsable_port_falls_back_to_default() {
        clear_demo_env();
        // SAFETY: protected by #[serial]
        unsafe { std::env::set_var("OCM_DEMO_REGISTRY_PORT", "not-a-port") };
        let config = Config::from_env();
        assert_eq!(config.registry_port, DEFAULT_REGISTRY_PORT);
        clear_demo_env();
    }

    #[test]
    fn test_registry_url_joins_host_and_port() {
        let config = Config {
            registry_host: "example.com".to_string(),
            registry_port: 8080,
            ..Config::default()
        };
        assert_eq!(config.registry_url(), "example.com:8080");
    }

    #[test]
    fn test_examples_dir_uses_project_root_override() {
        let config = Config {
            project_root: Some(PathBuf::from("/tmp/demo-root")),
            ..Config::default()
        };
        assert_eq!(config.examples_dir(), PathBuf::from("/tmp/demo-root/examples"));
    }
}
