//! OCM CLI client — thin wrapper over the `ocm` binary for component
//! creation, transfer, signing, verification, and inspection.

use std::path::{Path, PathBuf};

use crate::output::OutputContext;
use crate::runner::CommandRunner;

/// Client for the `ocm` command-line tool.
pub struct OcmClient<'a, R: CommandRunner> {
    runner: &'a R,
    ctx: &'a OutputContext,
}

impl<'a, R: CommandRunner> OcmClient<'a, R> {
    pub fn new(runner: &'a R, ctx: &'a OutputContext) -> Self {
        Self { runner, ctx }
    }

    /// Whether the CLI responds to `ocm version`.
    pub fn available(&self) -> bool {
        match self.runner.run("ocm", &["version"]) {
            Ok(result) if result.success() => {
                self.ctx
                    .success(&format!("OCM CLI is available: {}", result.stdout.trim()));
                true
            }
            Ok(_) => {
                self.ctx.error("OCM CLI found but not responding");
                false
            }
            Err(e) => {
                self.ctx.debug(&format!("ocm version failed: {e}"));
                false
            }
        }
    }

    /// Version string reported by the CLI, or `None` when unavailable.
    pub fn version(&self) -> Option<String> {
        self.runner
            .run_checked("ocm", &["version"])
            .ok()
            .map(|r| r.stdout.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Create a component version from a constructor document.
    ///
    /// The document is written as YAML next to the output archive, handed
    /// to `ocm create componentversion`, and removed afterwards.
    pub fn create_component_version(
        &self,
        component_spec: &serde_json::Value,
        output_dir: &Path,
    ) -> bool {
        let spec_file = output_dir.join("component.yaml");

        let rendered = match serde_yaml::to_string(component_spec) {
            Ok(rendered) => rendered,
            Err(e) => {
                self.ctx
                    .error(&format!("Failed to serialize component spec: {e}"));
                return false;
            }
        };
        if let Err(e) = std::fs::write(&spec_file, rendered) {
            self.ctx.error(&format!(
                "Failed to write {}: {e}",
                spec_file.display()
            ));
            return false;
        }

        self.ctx.info(&format!(
            "Creating component version from {}",
            spec_file.display()
        ));

        let spec_arg = spec_file.display().to_string();
        let out_arg = output_dir.display().to_string();
        let created = self.run_reported(
            &[
                "create",
                "componentversion",
                "--file",
                &spec_arg,
                "--output",
                &out_arg,
            ],
            "Component version created successfully",
            "Failed to create component version",
        );

        let _ = std::fs::remove_file(&spec_file);
        created
    }

    /// Transfer a component between repositories.
    pub fn transfer_component(
        &self,
        source: &str,
        target: &str,
        component_ref: Option<&str>,
    ) -> bool {
        self.ctx
            .info(&format!("Transferring component from {source} to {target}"));

        let mut args = vec!["transfer", "component"];
        if let Some(reference) = component_ref {
            args.push(reference);
        }
        args.push(source);
        args.push(target);

        self.run_reported(
            &args,
            "Component transferred successfully",
            "Failed to transfer component",
        )
    }

    /// Register a repository alias in the OCM configuration.
    pub fn add_repository(&self, name: &str, url: &str, repo_type: &str) -> bool {
        self.ctx.info(&format!("Adding repository '{name}' -> {url}"));
        self.run_reported(
            &["add", "repository", name, url, "--type", repo_type],
            &format!("Repository '{name}' added successfully"),
            &format!("Failed to add repository '{name}'"),
        )
    }

    /// List components in a repository as parsed JSON records.
    ///
    /// Failures (command error, malformed payload) yield an empty list.
    pub fn list_components(&self, repository: Option<&str>) -> Vec<serde_json::Value> {
        let mut args = vec!["get", "components"];
        if let Some(repo) = repository {
            args.push(repo);
        }
        args.extend(["--output", "json"]);

        let result = match self.runner.run("ocm", &args) {
            Ok(result) if result.success() => result,
            Ok(_) => {
                self.ctx.warn("Failed to list components");
                return Vec::new();
            }
            Err(e) => {
                self.ctx.error(&format!("Failed to list components: {e}"));
                return Vec::new();
            }
        };

        match serde_json::from_str::<serde_json::Value>(&result.stdout) {
            Ok(serde_json::Value::Array(items)) => items,
            Ok(other) => vec![other],
            Err(e) => {
                self.ctx
                    .error(&format!("Failed to parse component list JSON: {e}"));
                Vec::new()
            }
        }
    }

    /// Fetch the descriptor for one component reference.
    pub fn get_component_descriptor(&self, component_ref: &str) -> Option<serde_json::Value> {
        let result = match self
            .runner
            .run("ocm", &["get", "component", component_ref, "--output", "json"])
        {
            Ok(result) if result.success() => result,
            Ok(_) => {
                self.ctx.warn(&format!("Component not found: {component_ref}"));
                return None;
            }
            Err(e) => {
                self.ctx
                    .error(&format!("Failed to get component descriptor: {e}"));
                return None;
            }
        };

        match serde_json::from_str(&result.stdout) {
            Ok(value) => Some(value),
            Err(e) => {
                self.ctx
                    .error(&format!("Failed to parse component descriptor JSON: {e}"));
                None
            }
        }
    }

    /// Sign a component with a private key.
    pub fn sign_component(
        &self,
        component_ref: &str,
        private_key_file: &str,
        signature_name: Option<&str>,
    ) -> bool {
        self.ctx.info(&format!("Signing component {component_ref}"));

        let mut args = vec![
            "sign",
            "component",
            component_ref,
            "--private-key",
            private_key_file,
        ];
        if let Some(name) = signature_name {
            args.push("--signature");
            args.push(name);
        }

        self.run_reported(
            &args,
            "Component signed successfully",
            "Failed to sign component",
        )
    }

    /// Verify a component signature.
    pub fn verify_component(&self, component_ref: &str, public_key_file: Option<&str>) -> bool {
        self.ctx.info(&format!("Verifying component {component_ref}"));

        let mut args = vec!["verify", "component", component_ref];
        if let Some(key) = public_key_file {
            args.push("--public-key");
            args.push(key);
        }

        self.run_reported(
            &args,
            "Component verification successful",
            "Component verification failed",
        )
    }

    /// Download a named resource from a component into `output_dir`.
    ///
    /// Returns the path of the downloaded file.
    pub fn download_resource(
        &self,
        component_ref: &str,
        resource_name: &str,
        output_dir: &Path,
    ) -> Option<PathBuf> {
        if let Err(e) = std::fs::create_dir_all(output_dir) {
            self.ctx.error(&format!(
                "Failed to create {}: {e}",
                output_dir.display()
            ));
            return None;
        }

        self.ctx.info(&format!(
            "Downloading resource '{resource_name}' from {component_ref}"
        ));

        let out_arg = output_dir.display().to_string();
        let downloaded = self.run_reported(
            &[
                "download",
                "resource",
                component_ref,
                resource_name,
                "--output-dir",
                &out_arg,
            ],
            "Resource downloaded",
            "Failed to download resource",
        );
        if !downloaded {
            return None;
        }

        match first_file_in(output_dir) {
            Some(path) => {
                self.ctx
                    .success(&format!("Resource downloaded to: {}", path.display()));
                Some(path)
            }
            None => {
                self.ctx.warn("Resource downloaded but file not found");
                None
            }
        }
    }

    /// Run an `ocm` subcommand, logging one line per outcome.
    fn run_reported(&self, args: &[&str], ok_msg: &str, err_msg: &str) -> bool {
        match self.runner.run("ocm", args) {
            Ok(result) if result.success() => {
                self.ctx.success(ok_msg);
                true
            }
            Ok(result) => {
                self.ctx
                    .error(&format!("{err_msg}: {}", result.stderr.trim()));
                false
            }
            Err(e) => {
                self.ctx.error(&format!("{err_msg}: {e}"));
                false
            }
        }
    }
}

fn first_file_in(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() {
            return Some(path);
        }
    }
    None
}
