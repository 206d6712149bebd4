//! Demo orchestration: the guided walkthrough, example test runs, and
//! example discovery over the numbered script trees.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::output::OutputContext;
use crate::runner::CommandRunner;

/// One step of the guided demo: a title plus the scripts it executes,
/// relative to the examples directory.
struct DemoStep {
    title: &'static str,
    scripts: &'static [&'static str],
}

const DEMO_STEPS: [DemoStep; 5] = [
    DemoStep {
        title: "Basic component creation",
        scripts: &["01-basic/hello-world/create-component.sh"],
    },
    DemoStep {
        title: "Component transport",
        scripts: &["02-transport/local-to-oci/transport-example.sh"],
    },
    DemoStep {
        title: "Component signing",
        scripts: &["03-signing/basic-signing/sign-component.sh"],
    },
    DemoStep {
        title: "Kubernetes deployment",
        scripts: &[
            "04-k8s-deployment/setup-cluster.sh",
            "04-k8s-deployment/ocm-k8s-toolkit/deploy-example.sh",
        ],
    },
    DemoStep {
        title: "Advanced features",
        scripts: &[
            "05-advanced/component-references/create-reference-example.sh",
            "05-advanced/localization/create-localization-example.sh",
        ],
    },
];

/// Keep directory names that qualify as listable examples: non-hidden,
/// returned sorted.
#[must_use]
pub fn filter_examples(mut names: Vec<String>) -> Vec<String> {
    names.retain(|n| !n.starts_with('.') && !n.is_empty());
    names.sort();
    names
}

/// Runs demo walkthroughs and example scripts.
pub struct DemoRunner<'a, R: CommandRunner> {
    runner: &'a R,
    config: &'a Config,
    ctx: &'a OutputContext,
    interactive: bool,
}

impl<'a, R: CommandRunner> DemoRunner<'a, R> {
    pub fn new(runner: &'a R, config: &'a Config, ctx: &'a OutputContext, interactive: bool) -> Self {
        Self {
            runner,
            config,
            ctx,
            interactive,
        }
    }

    /// Run the full guided walkthrough, one step at a time.
    ///
    /// A missing step script is a step failure, as is a script that runs
    /// and exits non-zero; either stops the walkthrough.
    pub fn run_full_demo(&self) -> bool {
        self.ctx.header("OCM Demo Walkthrough");
        self.ctx
            .kv("registry", &self.config.registry_url());

        let total = DEMO_STEPS.len();
        for (index, step) in DEMO_STEPS.iter().enumerate() {
            self.ctx
                .step(&format!("Step {}/{total}: {}", index + 1, step.title));

            for script in step.scripts {
                let path = self.config.examples_dir().join(script);
                if !path.exists() {
                    self.ctx.error(&format!("Script not found: {script}"));
                    self.ctx.error(&format!("Demo step failed: {}", step.title));
                    return false;
                }
                if !self.run_script(&path) {
                    self.ctx.error(&format!("Demo step failed: {}", step.title));
                    return false;
                }
            }

            if index + 1 < total && !self.pause_between_steps() {
                self.ctx.info("Demo stopped");
                return true;
            }
        }

        self.ctx.success("Demo completed");
        true
    }

    /// Run every example, or the one named in `example`.
    ///
    /// Each numbered directory is driven by its `run-examples.sh` when
    /// present, otherwise by every script one level below it.
    pub fn run_tests(&self, example: Option<&str>) -> bool {
        let examples_dir = self.config.examples_dir();
        let names = match example {
            Some(name) => {
                if !examples_dir.join(name).is_dir() {
                    self.ctx.error(&format!("Example not found: {name}"));
                    return false;
                }
                vec![name.to_string()]
            }
            None => self.list_available_examples(),
        };

        if names.is_empty() {
            self.ctx.warn("No examples found to test");
            return false;
        }

        let total = names.len();
        let mut passed = 0;
        for name in names {
            self.ctx.step(&format!("Testing {name}"));
            if self.run_example_dir(&examples_dir.join(&name)) {
                self.ctx.success(&format!("{name} passed"));
                passed += 1;
            } else {
                self.ctx.error(&format!("{name} failed"));
            }
        }
        self.ctx.info(&format!("Test results: {passed}/{total} examples passed"));
        passed == total
    }

    /// Example directory names, hidden entries excluded, sorted.
    pub fn list_available_examples(&self) -> Vec<String> {
        let dir = self.config.examples_dir();
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                self.ctx
                    .debug(&format!("cannot read {}: {e}", dir.display()));
                return Vec::new();
            }
        };
        let names = entries
            .flatten()
            .filter(|e| e.path().is_dir())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        filter_examples(names)
    }

    fn run_example_dir(&self, dir: &Path) -> bool {
        let entry_point = dir.join("run-examples.sh");
        if entry_point.exists() {
            return self.run_script(&entry_point);
        }

        let scripts = scripts_one_level_down(dir);
        if scripts.is_empty() {
            self.ctx
                .warn(&format!("No runnable scripts in {}", dir.display()));
            return true;
        }
        scripts.iter().all(|s| self.run_script(s))
    }

    /// Execute one shell script from its own directory.
    fn run_script(&self, script: &Path) -> bool {
        let display = script.display().to_string();
        self.ctx.info(&format!("Running {display}"));

        // Checked-out scripts sometimes lose the executable bit; we invoke
        // through bash, so a chmod failure is non-fatal.
        if let Err(e) = self.runner.run("chmod", &["+x", &display]) {
            self.ctx.debug(&format!("chmod failed: {e}"));
        }

        let cwd = script.parent();
        match self.runner.run_in("bash", &[&display], cwd) {
            Ok(result) if result.success() => true,
            Ok(result) => {
                self.ctx.error(&format!(
                    "Script failed with exit code {}: {display}",
                    result.exit_code
                ));
                if !result.stderr.trim().is_empty() {
                    self.ctx.debug(result.stderr.trim());
                }
                false
            }
            Err(e) => {
                self.ctx.error(&format!("Failed to run {display}: {e}"));
                false
            }
        }
    }

    /// Ask to continue between steps. Returns `false` to stop the demo.
    fn pause_between_steps(&self) -> bool {
        if !self.interactive || !self.ctx.is_tty {
            return true;
        }
        dialoguer::Confirm::new()
            .with_prompt("Continue to the next step?")
            .default(true)
            .interact()
            .unwrap_or(false)
    }
}

/// Shell scripts directly inside the immediate subdirectories of `dir`,
/// sorted for deterministic execution order.
fn scripts_one_level_down(dir: &Path) -> Vec<PathBuf> {
    let mut scripts = Vec::new();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return scripts;
    };
    for entry in entries.flatten() {
        let sub = entry.path();
        if !sub.is_dir() {
            continue;
        }
        let Ok(children) = std::fs::read_dir(&sub) else {
            continue;
        };
        for child in children.flatten() {
            let path = child.path();
            if path.is_file() && path.extension().is_some_and(|e| e == "sh") {
                scripts.push(path);
            }
        }
    }
    scripts.sort();
    scripts
}
