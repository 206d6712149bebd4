//! `status` — report the current environment state.
//!
//! A pure report: it always exits zero, even when the environment is not
//! ready. Scripted readiness checks belong to `setup --check-only`.

use anyhow::Result;

use super::Toolbox;
use crate::config::Config;
use crate::demo::DemoRunner;
use crate::output::OutputContext;

pub fn run(config: &Config, ctx: &OutputContext, dry_run: bool, verbose: bool) -> Result<bool> {
    let toolbox = Toolbox::new(ctx, dry_run);
    let manager = toolbox.environment(config, ctx);
    let status = manager.status();

    ctx.header("Environment status");
    for tool in &status.prerequisites {
        if tool.available {
            ctx.success(&format!("{} is available", tool.name));
        } else {
            ctx.warn(&format!("{} is not available", tool.name));
        }
    }

    ctx.header("Registry");
    ctx.kv("name", &status.registry.name);
    ctx.kv("url", &status.registry.url);
    ctx.kv("running", if status.registry.running { "yes" } else { "no" });
    ctx.kv("healthy", if status.registry.healthy { "yes" } else { "no" });

    if let Some(version) = &status.ocm_version {
        ctx.kv("ocm version", version);
    }

    if verbose {
        let demo = DemoRunner::new(toolbox.runner(), config, ctx, false);
        ctx.header("Examples");
        for name in demo.list_available_examples() {
            ctx.kv("example", &name);
        }

        if status.registry.running {
            ctx.header("Registry contents");
            let images = manager.registry_images();
            if images.is_empty() {
                ctx.info("registry is empty");
            }
            for image in images {
                ctx.kv("repository", &image);
            }
        }
    }

    if status.ready {
        ctx.success("Environment is ready");
    } else {
        ctx.warn("Environment is not ready - run 'ocm-demo setup'");
    }
    Ok(true)
}
