//! `demo` — the guided walkthrough, or one example on request.

use anyhow::Result;

use super::{require_ready, Toolbox};
use crate::config::Config;
use crate::demo::DemoRunner;
use crate::output::OutputContext;

pub fn run(
    config: &Config,
    ctx: &OutputContext,
    dry_run: bool,
    example: Option<&str>,
    non_interactive: bool,
) -> Result<bool> {
    let toolbox = Toolbox::new(ctx, dry_run);
    let manager = toolbox.environment(config, ctx);

    if !require_ready(&manager.status(), ctx) {
        return Ok(false);
    }

    let demo = DemoRunner::new(toolbox.runner(), config, ctx, !non_interactive);
    match example {
        Some(name) => Ok(demo.run_tests(Some(name))),
        None => Ok(demo.run_full_demo()),
    }
}
